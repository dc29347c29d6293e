use std::path::PathBuf;
use std::process::{Command, Output};

use tracing::{debug, info};

use crate::archive::ArchivedEntry;
use crate::contract::{CommitError, CommitOutcome, Committer};
use crate::submission::Submission;

/// Commit message for an archived submission.
pub fn commit_message(submission: &Submission) -> String {
    format!("[AC] {} {}", submission.contest_id, submission.problem_id)
}

/// Git date string pinned to the submission time.
fn git_date(epoch_second: i64) -> String {
    format!("@{epoch_second} +0000")
}

/// [`Committer`] backed by the `git` executable.
///
/// Every call checks for `{repo_root}/.git` and runs fresh `git` processes;
/// nothing is held open between submissions.
pub struct GitCommitter {
    repo_root: PathBuf,
    author_email: String,
}

impl GitCommitter {
    pub fn new(repo_root: impl Into<PathBuf>, author_email: impl Into<String>) -> Self {
        Self {
            repo_root: repo_root.into(),
            author_email: author_email.into(),
        }
    }

    pub fn is_repository(&self) -> bool {
        self.repo_root.join(".git").is_dir()
    }

    fn git(&self) -> Command {
        let mut command = Command::new("git");
        command.arg("-C").arg(&self.repo_root);
        command
    }

    fn check(command: &'static str, output: Output) -> Result<(), CommitError> {
        if output.status.success() {
            debug!(command, "[COMMIT] git succeeded");
            return Ok(());
        }
        Err(CommitError::Git {
            command,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl Committer for GitCommitter {
    fn commit(
        &self,
        entry: &ArchivedEntry,
        submission: &Submission,
    ) -> Result<CommitOutcome, CommitError> {
        if !self.is_repository() {
            debug!(
                root = %self.repo_root.display(),
                "[COMMIT] Not a git repository, skipping commit"
            );
            return Ok(CommitOutcome::NotARepository);
        }

        // `-A` on the entry directory also stages removed sources.
        let add = self
            .git()
            .args(["add", "-A", "--"])
            .arg(&entry.dir)
            .output()?;
        Self::check("add", add)?;

        let date = git_date(submission.epoch_second);
        let message = commit_message(submission);
        // Pathspec limits the commit to this entry even if others are staged.
        let commit = self
            .git()
            .args(["commit", "--no-verify", "--no-gpg-sign", "-m"])
            .arg(&message)
            .arg("--")
            .arg(&entry.dir)
            .env("GIT_AUTHOR_NAME", &submission.user_id)
            .env("GIT_AUTHOR_EMAIL", &self.author_email)
            .env("GIT_AUTHOR_DATE", &date)
            .env("GIT_COMMITTER_NAME", &submission.user_id)
            .env("GIT_COMMITTER_EMAIL", &self.author_email)
            .env("GIT_COMMITTER_DATE", &date)
            .output()?;
        Self::check("commit", commit)?;

        info!(message = %message, root = %self.repo_root.display(), "[COMMIT] Committed");
        Ok(CommitOutcome::Committed)
    }
}
