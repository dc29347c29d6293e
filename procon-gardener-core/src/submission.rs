//! Submission records and the key used to decide whether one is already archived.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict string the judge uses for an accepted submission.
pub const ACCEPTED: &str = "AC";

/// One accepted submission as scraped from a listing row.
///
/// Serialized as-is into the `submission.json` sidecar of its archive entry
/// and read back on later runs only to rebuild the [`ArchiveKey`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: u64,
    pub epoch_second: i64,
    pub problem_id: String,
    pub contest_id: String,
    pub user_id: String,
    pub language: String,
    #[serde(default)]
    pub point: f64,
    #[serde(default)]
    pub length: u64,
    pub result: String,
    #[serde(default)]
    pub execution_time: u64,
}

impl Submission {
    pub fn archive_key(&self) -> ArchiveKey {
        ArchiveKey {
            contest_id: self.contest_id.clone(),
            problem_id: self.problem_id.clone(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.result == ACCEPTED
    }
}

/// Identifies an archive entry: one problem within one contest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArchiveKey {
    pub contest_id: String,
    pub problem_id: String,
}

impl ArchiveKey {
    pub fn new(contest_id: impl Into<String>, problem_id: impl Into<String>) -> Self {
        Self {
            contest_id: contest_id.into(),
            problem_id: problem_id.into(),
        }
    }
}

impl fmt::Display for ArchiveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.contest_id, self.problem_id)
    }
}
