//! Extractor trait and the category-keyed extractor registry.
//!
//! The registry owns the HTTP client and does the fetching; extractors only
//! turn a parsed document into [`ExtractedContent`]. Categories without a
//! registered override fall back to [`GenericExtractor`].

mod generic;

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use scraper::Html;
use tracing::{debug, instrument};

use linkshelf_shared::{Category, ExtractedContent, Result, RunConfig};

use crate::fetch::{self, FetchedPage};

pub use generic::{GenericExtractor, extract_description, extract_text, extract_title};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Turns a fetched, parsed page into raw text plus metadata.
pub trait Extractor: Send + Sync {
    /// Human-readable extractor name, recorded in the output frontmatter.
    fn name(&self) -> &str;

    /// Extract content from the document. Blank text is rejected by the
    /// registry, so implementations need not check for it.
    fn extract(&self, doc: &Html, page: &FetchedPage) -> Result<ExtractedContent>;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps categories to extractors and fetches pages for them.
pub struct ExtractorRegistry {
    client: Client,
    timeout: Duration,
    fallback: Box<dyn Extractor>,
    overrides: HashMap<Category, Box<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// Create a registry with no overrides, using the run's HTTP settings.
    pub fn new(config: &RunConfig) -> Result<Self> {
        Ok(Self {
            client: fetch::build_client(&config.user_agent, config.max_redirects)?,
            timeout: config.timeout,
            fallback: Box::new(GenericExtractor),
            overrides: HashMap::new(),
        })
    }

    /// Install a category-specific extractor, replacing any earlier one.
    pub fn register(&mut self, category: Category, extractor: impl Extractor + 'static) {
        self.overrides.insert(category, Box::new(extractor));
    }

    /// The extractor used for `category`. Always returns one.
    pub fn get(&self, category: Category) -> &dyn Extractor {
        self.overrides
            .get(&category)
            .map(|e| e.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }

    /// Per-request timeout applied by [`fetch_and_extract`](Self::fetch_and_extract).
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch `url` and run the extractor for `category` over it.
    #[instrument(skip_all, fields(url = %url, category = %category))]
    pub async fn fetch_and_extract(
        &self,
        category: Category,
        url: &str,
        timeout: Duration,
    ) -> Result<ExtractedContent> {
        let page = fetch::fetch_page(&self.client, url, timeout).await?;
        let extractor = self.get(category);

        let content = {
            let doc = Html::parse_document(&page.body);
            extractor.extract(&doc, &page)?
        };
        let content = content.validated()?;

        debug!(
            extractor = extractor.name(),
            chars = content.raw_text.len(),
            "content extracted"
        );
        Ok(content)
    }
}
