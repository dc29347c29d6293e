#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use procon_gardener_core::archive::ArchivedEntry;
use procon_gardener_core::contract::{
    CommitError, CommitOutcome, Committer, JudgeClient, JudgeError,
};
use procon_gardener_core::submission::Submission;
use tokio::time::Instant;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{Layer, Registry};

pub const USER: &str = "gardener";

/// One row of a fake AtCoder submissions table.
#[derive(Debug, Clone)]
pub struct Row {
    pub id: u64,
    pub contest: String,
    pub problem: String,
    pub language: String,
    pub verdict: String,
    pub time: String,
}

pub fn row(id: u64, contest: &str, problem: &str, language: &str, verdict: &str) -> Row {
    Row {
        id,
        contest: contest.into(),
        problem: problem.into(),
        language: language.into(),
        verdict: verdict.into(),
        time: "2020-05-09 13:53:20+0900".into(),
    }
}

pub fn accepted(id: u64, contest: &str, problem: &str) -> Row {
    row(id, contest, problem, "C++14 (GCC 5.4.1)", "AC")
}

fn render_row(row: &Row) -> String {
    format!(
        r#"<tr>
<td class="no-break"><time class="fixed-time">{time}</time></td>
<td><a href="/contests/{contest}/tasks/{problem}">A - Task</a></td>
<td><a href="/users/{user}">{user}</a></td>
<td><a href="/contests/{contest}/submissions?f.Language=4003">{language}</a></td>
<td class="text-right submission-score">100</td>
<td class="text-right">512 Byte</td>
<td class="text-center"><span class="label label-success">{verdict}</span></td>
<td class="text-right">2 ms</td>
<td class="text-right">3456 KB</td>
<td class="text-center">
<a href="/contests/{contest}/submissions/{id}" class="submission-details-link">Detail</a></td>
</tr>"#,
        time = row.time,
        contest = row.contest,
        problem = row.problem,
        user = USER,
        language = row.language,
        verdict = row.verdict,
        id = row.id,
    )
}

pub fn listing_page(rows: &[Row]) -> String {
    let body: String = rows.iter().map(render_row).collect();
    format!(
        r#"<html><body><div class="table-responsive">
<table class="table table-bordered table-striped small th-center">
<thead><tr><th>Submission Time</th><th>Task</th><th>User</th><th>Language</th><th>Score</th>
<th>Code Size</th><th>Status</th><th>Exec Time</th><th>Memory</th><th></th></tr></thead>
<tbody>{body}</tbody>
</table></div></body></html>"#
    )
}

pub fn listing_page_raw_rows(rows_html: &str) -> String {
    format!("<html><body><table><tbody>{rows_html}</tbody></table></body></html>")
}

pub fn empty_listing_page() -> String {
    "<html><body><p>No Submissions</p></body></html>".to_string()
}

fn escape(code: &str) -> String {
    code.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn submission_page(code: &str) -> String {
    format!(
        r#"<html><body><div class="col-sm-12">
<pre id="submission-code" class="prettyprint linenums">{}</pre>
</div></body></html>"#,
        escape(code)
    )
}

pub fn code_for(id: u64) -> String {
    format!("// submission {id}\nint main() {{ return 0; }}\n")
}

/// In-memory judge: listing pages per contest and detail pages per id, with a
/// log of every request made.
#[derive(Default)]
pub struct FakeJudge {
    listings: HashMap<String, Vec<String>>,
    details: HashMap<u64, Result<String, String>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeJudge {
    /// Registers the accepted/rejected rows of one contest, split into pages
    /// of `per_page`. The page after the last one is empty.
    pub fn with_contest(mut self, contest: &str, rows: &[Row], per_page: usize) -> Self {
        let pages = rows
            .chunks(per_page.max(1))
            .map(listing_page)
            .collect();
        for row in rows {
            self.details
                .entry(row.id)
                .or_insert_with(|| Ok(submission_page(&code_for(row.id))));
        }
        self.listings.insert(contest.to_string(), pages);
        self
    }

    pub fn with_detail(mut self, id: u64, page: Result<String, String>) -> Self {
        self.details.insert(id, page);
        self
    }

    pub fn detail_requests(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with("detail"))
            .cloned()
            .collect()
    }

    pub fn listing_requests(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with("listing"))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl JudgeClient for FakeJudge {
    async fn listing_page(
        &self,
        contest_id: &str,
        user_id: &str,
        page: u32,
    ) -> Result<String, JudgeError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("listing {contest_id} {user_id} {page}"));
        let pages = self
            .listings
            .get(contest_id)
            .ok_or_else(|| JudgeError::Other(format!("unknown contest {contest_id}")))?;
        Ok(pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_else(empty_listing_page))
    }

    async fn submission_page(
        &self,
        contest_id: &str,
        submission_id: u64,
    ) -> Result<String, JudgeError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("detail {contest_id} {submission_id}"));
        match self.details.get(&submission_id) {
            Some(Ok(html)) => Ok(html.clone()),
            Some(Err(reason)) => Err(JudgeError::Other(reason.clone())),
            None => Err(JudgeError::Status {
                url: format!("/contests/{contest_id}/submissions/{submission_id}"),
                status: 404,
            }),
        }
    }
}

/// Committer that only records what it was asked to commit.
#[derive(Default)]
pub struct RecordingCommitter {
    pub commits: Mutex<Vec<(ArchivedEntry, Submission)>>,
}

impl RecordingCommitter {
    pub fn committed_ids(&self) -> Vec<u64> {
        self.commits.lock().unwrap().iter().map(|(_, s)| s.id).collect()
    }
}

impl Committer for RecordingCommitter {
    fn commit(
        &self,
        entry: &ArchivedEntry,
        submission: &Submission,
    ) -> Result<CommitOutcome, CommitError> {
        self.commits
            .lock()
            .unwrap()
            .push((entry.clone(), submission.clone()));
        Ok(CommitOutcome::Committed)
    }
}

/// Every file under `root` (outside `.git`) with its content.
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn visit(dir: &Path, root: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.file_name().and_then(|n| n.to_str()) == Some(".git") {
                continue;
            }
            if path.is_dir() {
                visit(&path, root, out);
            } else {
                let rel = path.strip_prefix(root).unwrap().to_path_buf();
                out.insert(rel, std::fs::read(&path).unwrap());
            }
        }
    }
    let mut out = BTreeMap::new();
    if root.exists() {
        visit(root, root, &mut out);
    }
    out
}

pub fn sample_submission(id: u64, contest: &str, problem: &str) -> Submission {
    Submission {
        id,
        epoch_second: 1_589_000_000,
        problem_id: problem.into(),
        contest_id: contest.into(),
        user_id: USER.into(),
        language: "Rust (1.42.0)".into(),
        point: 100.0,
        length: 512,
        result: "AC".into(),
        execution_time: 2,
    }
}

/// Wraps a [`FakeJudge`] and stamps every request with the (tokio) time it
/// was made.
pub struct TimedJudge {
    pub inner: FakeJudge,
    pub stamps: Mutex<Vec<(String, Instant)>>,
}

impl TimedJudge {
    pub fn new(inner: FakeJudge) -> Self {
        Self {
            inner,
            stamps: Mutex::new(Vec::new()),
        }
    }

    fn stamp(&self, call: String) {
        self.stamps.lock().unwrap().push((call, Instant::now()));
    }
}

#[async_trait]
impl JudgeClient for TimedJudge {
    async fn listing_page(
        &self,
        contest_id: &str,
        user_id: &str,
        page: u32,
    ) -> Result<String, JudgeError> {
        self.stamp(format!("listing {contest_id} {page}"));
        self.inner.listing_page(contest_id, user_id, page).await
    }

    async fn submission_page(
        &self,
        contest_id: &str,
        submission_id: u64,
    ) -> Result<String, JudgeError> {
        self.stamp(format!("detail {contest_id} {submission_id}"));
        self.inner.submission_page(contest_id, submission_id).await
    }
}

/// Collects every tracing event as `"{LEVEL} {debug rendering}"`.
#[derive(Clone, Default)]
pub struct EventCollector {
    pub events: Arc<Mutex<Vec<String>>>,
}

impl EventCollector {
    /// Installs the collector as the thread's default subscriber until the
    /// guard is dropped.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = Registry::default().with(self.clone());
        tracing::subscriber::set_default(subscriber)
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.starts_with("WARN "))
            .cloned()
            .collect()
    }
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let level = event.metadata().level();
        self.events.lock().unwrap().push(format!("{level} {event:?}"));
    }
}
