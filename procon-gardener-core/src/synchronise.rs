//! High-level pipeline: mirrors newly accepted submissions into the archive tree.
//!
//! One run:
//!   - scans the archive tree for submissions already archived ([`crate::index`])
//!   - walks the judge's submission listings for the configured contests ([`crate::discovery`])
//!   - drops everything already archived ([`crate::dedup`])
//!   - for each remaining submission, strictly one after another: fetches the
//!     source ([`crate::fetch`]), writes the entry ([`crate::archive`]) and
//!     commits it ([`crate::commit`])
//!
//! # Error Handling
//! Nothing here returns an error. A failure affecting one submission is
//! logged and counted in the [`ArchiveReport`], and the run moves on to the
//! next submission.
//!
//! # Pacing
//! Remote calls are spaced by [`Pacing`]; there is no parallelism. Every
//! detail request waits `fetch_delay`, the first one included, since
//! discovery has just made a listing request.

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::archive::archive_submission;
use crate::contract::{pause, CommitOutcome, Committer, JudgeClient, Pacing};
use crate::dedup::filter_unarchived;
use crate::discovery::discover;
use crate::fetch::fetch_code;
use crate::index::scan_archive;
use crate::language::file_name_for;
use crate::submission::{ArchiveKey, Submission};

/// Inputs of one archive run.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    pub repository_path: PathBuf,
    pub user_id: String,
    pub contests: Vec<String>,
    pub pacing: Pacing,
}

/// What a run did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ArchiveReport {
    /// Accepted submissions found in the listings.
    pub discovered: usize,
    /// Of those, how many were skipped because their key was already archived.
    pub already_archived: usize,
    /// Keys written this run, in order.
    pub archived: Vec<ArchiveKey>,
    pub committed: usize,
    /// Submissions that could not be fetched, written or committed.
    pub failed: usize,
}

enum Step {
    Archived { committed: bool },
    /// Written to disk, but the commit failed.
    Uncommitted,
    Failed,
}

pub async fn synchronise<J, C>(config: &ArchiveConfig, judge: &J, committer: &C) -> ArchiveReport
where
    J: JudgeClient + ?Sized,
    C: Committer + ?Sized,
{
    info!(
        root = %config.repository_path.display(),
        user = %config.user_id,
        contests = ?config.contests,
        "[ARCHIVE] Starting archive run"
    );
    if config.contests.is_empty() {
        warn!("[ARCHIVE] No contests configured, nothing to discover");
    }

    let index = scan_archive(&config.repository_path);
    let discovered = discover(judge, &config.user_id, &config.contests, config.pacing).await;
    let discovered_count = discovered.len();
    let pending = filter_unarchived(discovered, &index);

    let mut report = ArchiveReport {
        discovered: discovered_count,
        already_archived: discovered_count - pending.len(),
        ..ArchiveReport::default()
    };
    info!(count = pending.len(), "[ARCHIVE] Archiving {} code...", pending.len());

    for submission in &pending {
        pause(config.pacing.fetch_delay).await;
        match archive_one(config, judge, committer, submission).await {
            Step::Archived { committed } => {
                report.archived.push(submission.archive_key());
                if committed {
                    report.committed += 1;
                }
            }
            Step::Uncommitted => {
                report.archived.push(submission.archive_key());
                report.failed += 1;
            }
            Step::Failed => report.failed += 1,
        }
    }

    report
}

async fn archive_one<J, C>(
    config: &ArchiveConfig,
    judge: &J,
    committer: &C,
    submission: &Submission,
) -> Step
where
    J: JudgeClient + ?Sized,
    C: Committer + ?Sized,
{
    let key = submission.archive_key();

    let code = match fetch_code(judge, submission).await {
        Ok(code) => code,
        Err(e) => {
            error!(
                key = %key,
                id = submission.id,
                error = %e,
                "[ARCHIVE][ERROR] Fetch failed, skipping"
            );
            return Step::Failed;
        }
    };

    let file_name = file_name_for(&submission.language);
    let entry = match archive_submission(&config.repository_path, submission, file_name, &code) {
        Ok(entry) => entry,
        Err(e) => {
            error!(key = %key, error = %e, "[ARCHIVE][ERROR] Failed to archive code");
            return Step::Failed;
        }
    };

    match committer.commit(&entry, submission) {
        Ok(CommitOutcome::Committed) => Step::Archived { committed: true },
        Ok(CommitOutcome::NotARepository) => Step::Archived { committed: false },
        Err(e) => {
            // The files stay on disk for a later manual commit.
            error!(key = %key, error = %e, "[ARCHIVE][ERROR] Commit failed");
            Step::Uncommitted
        }
    }
}
