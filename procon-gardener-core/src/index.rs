//! Archive state index: what is already in the archive tree.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::archive::SIDECAR_FILE_NAME;
use crate::submission::{ArchiveKey, Submission};

/// Set of archive keys found on disk. Built once per run, then read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveIndex {
    keys: HashSet<ArchiveKey>,
}

impl ArchiveIndex {
    pub fn contains(&self, key: &ArchiveKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ArchiveKey> {
        self.keys.iter()
    }
}

impl FromIterator<ArchiveKey> for ArchiveIndex {
    fn from_iter<I: IntoIterator<Item = ArchiveKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

fn read_sidecar(path: &Path) -> Result<Submission, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&content).map_err(|e| e.to_string())
}

/// Walks `root` and collects the key of every parsable sidecar.
///
/// Broken or unreadable sidecars are logged and left out, so the next run
/// archives those entries again.
pub fn scan_archive(root: &Path) -> ArchiveIndex {
    if !root.exists() {
        info!(root = %root.display(), "[INDEX] Archive root does not exist yet, starting empty");
        return ArchiveIndex::default();
    }

    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git");

    let mut keys = HashSet::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "[INDEX] Skipping unreadable path");
                continue;
            }
        };
        if !entry.file_type().is_file() || entry.file_name() != SIDECAR_FILE_NAME {
            continue;
        }
        match read_sidecar(entry.path()) {
            Ok(submission) => {
                debug!(
                    path = %entry.path().display(),
                    key = %submission.archive_key(),
                    "[INDEX] Found archived submission"
                );
                keys.insert(submission.archive_key());
            }
            Err(e) => {
                warn!(
                    path = %entry.path().display(),
                    error = %e,
                    "[INDEX] Ignoring broken sidecar"
                );
            }
        }
    }

    info!(root = %root.display(), archived = keys.len(), "[INDEX] Archive scanned");
    ArchiveIndex { keys }
}
