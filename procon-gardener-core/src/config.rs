use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

use crate::archive::is_safe_component;

pub const DEFAULT_BASE_URL: &str = "https://atcoder.jp";

/// On-disk configuration file. A blank one is written by `init`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub atcoder: AtCoderService,
}

/// Settings for archiving from AtCoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtCoderService {
    /// Root of the archive tree, normally a git working tree.
    #[serde(default)]
    pub repository_path: PathBuf,
    /// AtCoder handle; also the commit author name.
    #[serde(default)]
    pub user_id: String,
    /// Commit author email.
    #[serde(default)]
    pub user_email: String,
    /// Contest ids to scan, e.g. `abc040`.
    #[serde(default)]
    pub contests: Vec<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for AtCoderService {
    fn default() -> Self {
        Self {
            repository_path: PathBuf::new(),
            user_id: String::new(),
            user_email: String::new(),
            contests: Vec::new(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("atcoder.repository_path is not set")]
    MissingRepositoryPath,
    #[error("atcoder.user_id is not set")]
    MissingUserId,
    #[error("contest id {0:?} cannot be used as a directory name")]
    InvalidContest(String),
}

impl Config {
    pub fn trace_loaded(&self) {
        info!(
            repository_path = %self.atcoder.repository_path.display(),
            user_id = %self.atcoder.user_id,
            contests_count = self.atcoder.contests.len(),
            "Loaded Config"
        );
        debug!(?self, "Config loaded (full debug)");
    }

    /// Checks the fields archiving cannot run without, and that every contest
    /// id stays a single directory under the archive root.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.atcoder.repository_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRepositoryPath);
        }
        if self.atcoder.user_id.trim().is_empty() {
            return Err(ConfigError::MissingUserId);
        }
        if let Some(contest) = self
            .atcoder
            .contests
            .iter()
            .find(|c| !is_safe_component(c))
        {
            return Err(ConfigError::InvalidContest(contest.clone()));
        }
        Ok(())
    }
}
