#![allow(unused)]

//! # contract: seams between the pipeline and the outside world
//!
//! The archival pipeline touches two external systems: the judge (paged
//! submission listings and per-submission detail pages) and the version
//! control working tree. Each is reached only through a trait defined here,
//! so the orchestration in [`crate::synchronise`] can be exercised against
//! fakes without network access or a real repository.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`; the generated `MockJudgeClient`
//!   and `MockCommitter` are exported under the `test-export-mocks` feature.
//!
//! ## Implementations
//! - [`JudgeClient`]: [`crate::atcoder::AtCoderClient`] (reqwest).
//! - [`Committer`]: [`crate::commit::GitCommitter`] (the `git` executable).

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use mockall::{automock, predicate::*};

use crate::archive::ArchivedEntry;
use crate::submission::Submission;

/// Failure talking to the judge.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("{0}")]
    Other(String),
}

/// Source of raw judge pages.
///
/// Implementations return the HTML body; parsing belongs to
/// [`crate::discovery`] and [`crate::fetch`].
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait JudgeClient: Send + Sync {
    /// One page (1-based) of `user_id`'s submissions to `contest_id`.
    async fn listing_page(
        &self,
        contest_id: &str,
        user_id: &str,
        page: u32,
    ) -> Result<String, JudgeError>;

    /// The detail page of a single submission.
    async fn submission_page(
        &self,
        contest_id: &str,
        submission_id: u64,
    ) -> Result<String, JudgeError>;
}

/// Result of a successful [`Committer::commit`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// The archive root is not a repository; nothing was done.
    NotARepository,
}

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("failed to launch git: {0}")]
    Launch(#[from] std::io::Error),
    #[error("git {command} exited with {status}: {stderr}")]
    Git {
        command: &'static str,
        status: String,
        stderr: String,
    },
}

/// Records freshly archived files in version control.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait Committer: Send + Sync {
    /// Stage the entry's directory (written and removed files alike) and
    /// commit it as authored by the submission's user at the submission's
    /// time.
    fn commit(
        &self,
        entry: &ArchivedEntry,
        submission: &Submission,
    ) -> Result<CommitOutcome, CommitError>;
}

/// Minimum delays between remote calls. The judge throttles clients that
/// ignore these, so production code always uses [`Pacing::default`].
///
/// `listing_delay` precedes every listing request but the first of a run,
/// including the first page of each further contest. `fetch_delay` precedes
/// every detail request, the first one included, since a listing request
/// always comes before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub listing_delay: Duration,
    pub fetch_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            listing_delay: Duration::from_millis(500),
            fetch_delay: Duration::from_millis(1500),
        }
    }
}

impl Pacing {
    /// No delays at all; for tests against fakes.
    pub const fn none() -> Self {
        Self {
            listing_delay: Duration::ZERO,
            fetch_delay: Duration::ZERO,
        }
    }
}

pub(crate) async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Spaces successive calls by a fixed delay. Only the first call goes out
/// without waiting.
#[derive(Debug)]
pub(crate) struct Throttle {
    delay: Duration,
    primed: bool,
}

impl Throttle {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            primed: false,
        }
    }

    /// Waits out the delay unless this is the first call.
    pub(crate) async fn ready(&mut self) {
        if self.primed {
            pause(self.delay).await;
        }
        self.primed = true;
    }
}
