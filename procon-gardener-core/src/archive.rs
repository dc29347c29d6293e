//! Archiver: writes one submission's source and sidecar into the archive tree.
//!
//! Layout: `{root}/atcoder.jp/{contest}/{problem}/{Main.<ext>, submission.json}`.
//! Existing archives depend on this layout; do not change it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::language::SOURCE_FILE_PREFIX;
use crate::submission::Submission;

/// Directory under the archive root that holds all AtCoder entries.
pub const JUDGE_HOST: &str = "atcoder.jp";
pub const SIDECAR_FILE_NAME: &str = "submission.json";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to list {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize submission sidecar: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Whether `segment` can be used as a single directory name in the archive.
pub fn is_safe_component(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\'])
}

/// Paths of a freshly written entry, relative to the archive root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedEntry {
    pub dir: PathBuf,
    pub source_file: PathBuf,
    pub sidecar_file: PathBuf,
    /// Source files of an earlier submission in another language, deleted
    /// so the entry holds exactly one source.
    pub removed: Vec<PathBuf>,
}

impl ArchivedEntry {
    pub fn files(&self) -> [PathBuf; 2] {
        [self.source_file.clone(), self.sidecar_file.clone()]
    }
}

/// Entry directory relative to the archive root.
pub fn entry_dir(submission: &Submission) -> PathBuf {
    Path::new(JUDGE_HOST)
        .join(&submission.contest_id)
        .join(&submission.problem_id)
}

/// Serializes a submission the way sidecars are stored: pretty JSON, tab indented.
pub fn sidecar_json(submission: &Submission) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    submission.serialize(&mut serializer)?;
    Ok(buf)
}

fn write_file(path: &Path, content: &[u8]) -> Result<(), ArchiveError> {
    fs::write(path, content).map_err(|source| ArchiveError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Other `Main.*` files in `dir`, left by a submission in another language.
fn stale_sources(dir: &Path, keep: &str) -> Result<Vec<String>, ArchiveError> {
    let entries = fs::read_dir(dir).map_err(|source| ArchiveError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut stale: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with(SOURCE_FILE_PREFIX) && name != keep)
        .collect();
    stale.sort();
    Ok(stale)
}

/// Writes `code` to `{dir}/{file_name}` and the sidecar to `{dir}/submission.json`,
/// creating `dir` as needed and overwriting both files. Any other source
/// file in `dir` is deleted afterwards; the names of those are returned.
///
/// The writes are not atomic together. The source goes first, so an
/// interrupted write leaves an entry without a valid sidecar, which the
/// index does not count as archived.
pub fn write_entry(
    dir: &Path,
    file_name: &str,
    code: &str,
    submission: &Submission,
) -> Result<Vec<String>, ArchiveError> {
    fs::create_dir_all(dir).map_err(|source| ArchiveError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    write_file(&dir.join(file_name), code.as_bytes())?;
    let sidecar = sidecar_json(submission)?;
    write_file(&dir.join(SIDECAR_FILE_NAME), &sidecar)?;

    let stale = stale_sources(dir, file_name)?;
    for name in &stale {
        let path = dir.join(name);
        fs::remove_file(&path).map_err(|source| ArchiveError::Remove {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "[ARCHIVE] Removed source of a replaced submission");
    }
    Ok(stale)
}

/// Archives one submission under `root` and reports what was written.
pub fn archive_submission(
    root: &Path,
    submission: &Submission,
    file_name: &str,
    code: &str,
) -> Result<ArchivedEntry, ArchiveError> {
    let relative_dir = entry_dir(submission);
    let removed = write_entry(&root.join(&relative_dir), file_name, code, submission)?;
    let entry = ArchivedEntry {
        source_file: relative_dir.join(file_name),
        sidecar_file: relative_dir.join(SIDECAR_FILE_NAME),
        removed: removed.iter().map(|name| relative_dir.join(name)).collect(),
        dir: relative_dir,
    };
    info!(path = %root.join(&entry.source_file).display(), "[ARCHIVE] Archived");
    Ok(entry)
}
