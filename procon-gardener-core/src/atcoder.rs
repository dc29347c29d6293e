//! [`JudgeClient`] implementation that talks to AtCoder over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::debug;

use crate::contract::{JudgeClient, JudgeError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn default_headers() -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::ACCEPT, header::HeaderValue::from_static("text/html"));
    headers.insert(
        header::ACCEPT_LANGUAGE,
        header::HeaderValue::from_static("en"),
    );
    headers
}

#[derive(Debug, Clone)]
pub struct AtCoderClient {
    client: Client,
    base_url: String,
}

impl AtCoderClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, JudgeError> {
        let client = Client::builder()
            .user_agent(concat!("procon-gardener/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .default_headers(default_headers())
            .build()
            .map_err(|e| JudgeError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Joins `path` onto the base URL with exactly one `/` between them.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn listing_url(&self, contest_id: &str) -> String {
        self.url(&format!("contests/{contest_id}/submissions"))
    }

    pub fn submission_url(&self, contest_id: &str, submission_id: u64) -> String {
        self.url(&format!("contests/{contest_id}/submissions/{submission_id}"))
    }

    async fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, JudgeError> {
        debug!(url, ?query, "GET");
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|source| JudgeError::Request {
                url: url.to_string(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(JudgeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(|source| JudgeError::Request {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl JudgeClient for AtCoderClient {
    async fn listing_page(
        &self,
        contest_id: &str,
        user_id: &str,
        page: u32,
    ) -> Result<String, JudgeError> {
        let query = [("f.User", user_id.to_string()), ("page", page.to_string())];
        self.get_text(&self.listing_url(contest_id), &query).await
    }

    async fn submission_page(
        &self,
        contest_id: &str,
        submission_id: u64,
    ) -> Result<String, JudgeError> {
        self.get_text(&self.submission_url(contest_id, submission_id), &[])
            .await
    }
}
