//! Resource list loading and content type detection.
//!
//! This crate provides:
//! - [`loader`]: reads the curated JSON resource list, validates entries,
//!   and deduplicates them by normalized URL
//! - [`detector`]: classifies each resource into a [`Category`] and captures
//!   category-specific identifiers from its URL
//!
//! [`Category`]: linkshelf_shared::Category

pub mod detector;
pub mod loader;

pub use detector::{classify, classify_url};
pub use loader::{LoadStats, LoadedResources, load, parse};
