//! Page fetching and content extraction.
//!
//! This crate provides:
//! - [`fetch`]: the shared HTTP client and bounded-timeout page fetch
//! - [`extractors`]: the [`Extractor`] trait, [`GenericExtractor`], and the
//!   category-keyed [`ExtractorRegistry`]

pub mod extractors;
pub mod fetch;

pub use extractors::{Extractor, ExtractorRegistry, GenericExtractor};
pub use fetch::{FetchedPage, build_client, fetch_page};
