//! Code fetcher: downloads a submission's detail page and pulls out its source.

use scraper::Html;
use thiserror::Error;
use tracing::debug;

use crate::contract::{JudgeClient, JudgeError};
use crate::discovery::{selector, DiscoveryError};
use crate::submission::Submission;

const CODE_SELECTOR: &str = "#submission-code";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Judge(#[from] JudgeError),
    #[error(transparent)]
    Parse(#[from] DiscoveryError),
    /// The page has no code block, or an empty one: either the page layout
    /// changed or the submission is gone.
    #[error("no source code found on the submission page")]
    EmptyCode,
}

/// Extracts the source text of the `#submission-code` block, untrimmed.
pub fn extract_code(html: &str) -> Result<String, FetchError> {
    let document = Html::parse_document(html);
    let code_selector = selector(CODE_SELECTOR)?;
    let code: String = document
        .select(&code_selector)
        .next()
        .map(|element| element.text().collect())
        .unwrap_or_default();
    if code.trim().is_empty() {
        return Err(FetchError::EmptyCode);
    }
    Ok(code)
}

/// Fetches the source code of one submission.
pub async fn fetch_code<J>(judge: &J, submission: &Submission) -> Result<String, FetchError>
where
    J: JudgeClient + ?Sized,
{
    let html = judge
        .submission_page(&submission.contest_id, submission.id)
        .await?;
    let code = extract_code(&html)?;
    debug!(
        contest = %submission.contest_id,
        id = submission.id,
        bytes = code.len(),
        "[FETCH] Extracted source code"
    );
    Ok(code)
}
