//! Core domain types for the linkshelf pipeline.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{LinkshelfError, Result};
use crate::frontmatter::Frontmatter;

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// One input URL plus the metadata supplied alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// The URL as written in the input (trimmed).
    pub url: String,
    /// Title supplied by the curator, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Free-form type hint supplied by the curator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<String>,
    /// When the URL was first added to the list.
    pub first_seen: NaiveDate,
    /// Every other key from the input object, preserved untouched.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra_fields: serde_json::Map<String, serde_json::Value>,
}

impl Resource {
    /// Create a resource with only a URL, first seen today.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            type_hint: None,
            first_seen: Utc::now().date_naive(),
            extra_fields: serde_json::Map::new(),
        }
    }

    /// Identity key used for deduplication.
    pub fn identity_key(&self) -> String {
        normalize_url(&self.url)
    }
}

/// Normalize a URL into its identity key.
///
/// Scheme and host are lowercased, default ports and the fragment dropped,
/// and a trailing slash removed from the path. The query is kept.
pub fn normalize_url(raw: &str) -> String {
    let raw = raw.trim();
    let Ok(parsed) = Url::parse(raw) else {
        let without_fragment = raw.split('#').next().unwrap_or(raw);
        return without_fragment.trim_end_matches('/').to_lowercase();
    };

    let mut key = format!("{}://", parsed.scheme());
    if let Some(host) = parsed.host_str() {
        key.push_str(host);
    }
    if let Some(port) = parsed.port() {
        key.push_str(&format!(":{port}"));
    }
    key.push_str(parsed.path().trim_end_matches('/'));
    if let Some(query) = parsed.query() {
        if !query.is_empty() {
            key.push('?');
            key.push_str(query);
        }
    }
    key
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// The closed set of content categories a resource can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    GithubRepo,
    YoutubeVideo,
    BlogPost,
    Article,
    Other,
}

impl Category {
    /// Every category, in detection priority order.
    pub const ALL: [Category; 5] = [
        Category::GithubRepo,
        Category::YoutubeVideo,
        Category::BlogPost,
        Category::Article,
        Category::Other,
    ];

    /// Stable kebab-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::GithubRepo => "github-repo",
            Category::YoutubeVideo => "youtube-video",
            Category::BlogPost => "blog-post",
            Category::Article => "article",
            Category::Other => "other",
        }
    }

    /// Output directory for categories that have a fixed one.
    ///
    /// `Article` and `Other` return `None`: they are placed by domain.
    pub fn directory(&self) -> Option<&'static str> {
        match self {
            Category::GithubRepo => Some("github-repos"),
            Category::YoutubeVideo => Some("youtube-videos"),
            Category::BlogPost => Some("blog-posts"),
            Category::Article | Category::Other => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ClassifiedResource
// ---------------------------------------------------------------------------

/// Category-specific identifiers captured from a URL (`domain`, `owner`, `video_id`, …).
pub type CategoryMetadata = BTreeMap<String, String>;

/// A resource after type detection.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedResource {
    pub resource: Resource,
    pub category: Category,
    pub metadata: CategoryMetadata,
}

impl ClassifiedResource {
    /// The domain recorded by the detector, or an empty string for malformed URLs.
    pub fn domain(&self) -> &str {
        self.metadata.get("domain").map(String::as_str).unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// ExtractedContent
// ---------------------------------------------------------------------------

/// Output of an extractor: raw page text plus page-level metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedContent {
    /// Text content, one logical line per block element.
    pub raw_text: String,
    /// Page title, if one was found.
    pub title: Option<String>,
    /// Meta description, if one was found.
    pub description: Option<String>,
    /// The URL that was fetched.
    pub source_url: String,
    /// Host of the source URL.
    pub domain: String,
    /// When the page was fetched.
    pub extracted_at: DateTime<Utc>,
    /// Name of the extractor that produced this content.
    pub extractor_name: String,
}

impl ExtractedContent {
    /// Enforce the success-outcome invariant: content must not be blank.
    pub fn validated(self) -> Result<Self> {
        if self.raw_text.trim().is_empty() {
            return Err(LinkshelfError::parse(format!(
                "{}: no text content after stripping non-content elements",
                self.source_url
            )));
        }
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// ProcessedDocument
// ---------------------------------------------------------------------------

/// Final markdown document, written verbatim to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedDocument {
    /// Ordered metadata block.
    pub frontmatter: Frontmatter,
    /// Processed markdown body (without frontmatter).
    pub markdown_body: String,
    /// Resolved document title; `None` when only the `Untitled` placeholder was available.
    pub title: Option<String>,
}

impl ProcessedDocument {
    /// Render the full file contents: frontmatter, blank line, body.
    pub fn render(&self) -> String {
        let mut out = self.frontmatter.render();
        out.push('\n');
        out.push_str(&self.markdown_body);
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}

// ---------------------------------------------------------------------------
// LogEntry
// ---------------------------------------------------------------------------

/// Outcome status recorded for a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Completed,
    Failed,
}

/// One processing-log record; there is at most one per URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub url: String,
    pub status: LogStatus,
    pub processed_at: DateTime<Utc>,
    /// Where the markdown file was written (completed entries only).
    #[serde(rename = "output_file", default)]
    pub output_path: Option<PathBuf>,
    /// Human-readable failure reason (failed entries only).
    #[serde(default)]
    pub error: Option<String>,
}

impl LogEntry {
    /// A `completed` entry stamped now.
    pub fn completed(url: impl Into<String>, output_path: PathBuf) -> Self {
        Self {
            url: url.into(),
            status: LogStatus::Completed,
            processed_at: Utc::now(),
            output_path: Some(output_path),
            error: None,
        }
    }

    /// A `failed` entry stamped now.
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: LogStatus::Failed,
            processed_at: Utc::now(),
            output_path: None,
            error: Some(error.into()),
        }
    }
}

/// Aggregate counters over a processing log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}
