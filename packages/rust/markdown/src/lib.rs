//! Turns extracted page text into a markdown document with frontmatter.
//!
//! Processing is pure: entity decoding and whitespace cleanup, heading
//! detection, then frontmatter assembly. Nothing here touches the network
//! or the filesystem.

mod cleanup;
mod structure;

use chrono::SecondsFormat;
use tracing::{debug, instrument};

use linkshelf_shared::{
    CategoryMetadata, ExtractedContent, Frontmatter, LinkshelfError, ProcessedDocument, Result,
};

/// Title used in frontmatter when none can be found.
pub const UNTITLED: &str = "Untitled";

/// Process extracted content into a [`ProcessedDocument`].
///
/// Frontmatter keys, in order: `title`, `source`, `domain`, `extracted`,
/// `description` (when present), category metadata other than `domain`
/// (sorted by key), `extractor`, `word_count`.
///
/// Fails with [`LinkshelfError::Parse`] when nothing is left after cleanup.
#[instrument(skip_all, fields(url = %content.source_url))]
pub fn process(content: &ExtractedContent, metadata: &CategoryMetadata) -> Result<ProcessedDocument> {
    let cleaned = cleanup::run_pipeline(&content.raw_text);
    if cleaned.is_empty() {
        return Err(LinkshelfError::parse(format!(
            "{}: no text left after cleanup",
            content.source_url
        )));
    }

    let body = structure::structure_headings(&cleaned);

    let title = content
        .title
        .as_deref()
        .map(cleanup::clean_inline)
        .filter(|t| !t.is_empty())
        .or_else(|| structure::first_h1(&body));

    let description = content
        .description
        .as_deref()
        .map(cleanup::clean_inline)
        .filter(|d| !d.is_empty());

    let word_count = word_count(&body);

    let mut frontmatter = Frontmatter::new();
    frontmatter.insert("title", title.as_deref().unwrap_or(UNTITLED));
    frontmatter.insert("source", content.source_url.as_str());
    frontmatter.insert("domain", content.domain.as_str());
    frontmatter.insert(
        "extracted",
        content
            .extracted_at
            .to_rfc3339_opts(SecondsFormat::Secs, true),
    );
    if let Some(description) = &description {
        frontmatter.insert("description", description.as_str());
    }
    for (key, value) in metadata.iter().filter(|(k, _)| k.as_str() != "domain") {
        frontmatter.insert(key.as_str(), value.as_str());
    }
    frontmatter.insert("extractor", content.extractor_name.as_str());
    frontmatter.insert("word_count", word_count.to_string());

    debug!(word_count, title = ?title, "document processed");

    Ok(ProcessedDocument {
        frontmatter,
        markdown_body: body,
        title,
    })
}

/// Count words in a markdown body, ignoring heading and list markers.
pub fn word_count(markdown: &str) -> usize {
    markdown
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count()
}
