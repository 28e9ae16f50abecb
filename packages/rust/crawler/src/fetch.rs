//! HTTP fetching for extractors.
//!
//! One [`Client`] is built per run and shared by every extractor. Each request
//! carries its own timeout so a slow page cannot stall the run past it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};
use url::Url;

use linkshelf_shared::{LinkshelfError, Result};

/// Content types an HTML/text extractor can work with.
const TEXTUAL_CONTENT_TYPES: &[&str] = &["text/", "application/xhtml+xml", "application/xml"];

/// A fetched page body plus the response metadata extractors need.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL as it appeared in the resource list.
    pub requested_url: String,
    /// The URL after redirects.
    pub final_url: Url,
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header, if the server sent one.
    pub content_type: Option<String>,
    /// Decoded response body.
    pub body: String,
    /// When the response was received.
    pub fetched_at: DateTime<Utc>,
}

impl FetchedPage {
    /// Host of the requested URL, falling back to the final URL.
    pub fn domain(&self) -> String {
        Url::parse(&self.requested_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
            .or_else(|| self.final_url.host_str().map(str::to_lowercase))
            .unwrap_or_default()
    }
}

/// Build the shared HTTP client.
pub fn build_client(user_agent: &str, max_redirects: usize) -> Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::limited(max_redirects))
        .build()
        .map_err(|e| LinkshelfError::Network(format!("failed to build HTTP client: {e}")))
}

/// Fetch `url` with a bounded timeout.
///
/// Connection failures, timeouts, and non-2xx statuses are
/// [`LinkshelfError::Network`]; a non-textual body is [`LinkshelfError::Parse`].
#[instrument(skip(client), fields(timeout_secs = timeout.as_secs()))]
pub async fn fetch_page(client: &Client, url: &str, timeout: Duration) -> Result<FetchedPage> {
    let parsed =
        Url::parse(url).map_err(|e| LinkshelfError::Network(format!("{url}: invalid URL: {e}")))?;

    let response = client
        .get(parsed)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| describe_request_error(url, timeout, &e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LinkshelfError::Network(format!("{url}: HTTP {status}")));
    }

    let final_url = response.url().clone();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase());

    if let Some(ct) = &content_type {
        if !TEXTUAL_CONTENT_TYPES.iter().any(|t| ct.starts_with(t)) {
            return Err(LinkshelfError::parse(format!(
                "{url}: unsupported content type {ct}"
            )));
        }
    }

    let body = response
        .text()
        .await
        .map_err(|e| describe_request_error(url, timeout, &e))?;

    debug!(
        status = status.as_u16(),
        bytes = body.len(),
        final_url = %final_url,
        "page fetched"
    );

    Ok(FetchedPage {
        requested_url: url.to_string(),
        final_url,
        status: status.as_u16(),
        content_type,
        body,
        fetched_at: Utc::now(),
    })
}

fn describe_request_error(url: &str, timeout: Duration, e: &reqwest::Error) -> LinkshelfError {
    if e.is_timeout() {
        LinkshelfError::Network(format!("{url}: timed out after {}s", timeout.as_secs()))
    } else if e.is_connect() {
        LinkshelfError::Network(format!("{url}: connection failed: {e}"))
    } else {
        LinkshelfError::Network(format!("{url}: {e}"))
    }
}
