//! Shared types, error model, and configuration for linkshelf.
//!
//! This crate is the foundation depended on by all other linkshelf crates.
//! It provides:
//! - [`LinkshelfError`]: the unified error type
//! - Domain types ([`Resource`], [`ClassifiedResource`], [`ExtractedContent`],
//!   [`ProcessedDocument`], [`LogEntry`])
//! - [`Frontmatter`] rendering and parsing
//! - Configuration ([`AppConfig`], [`RunConfig`], config loading)

pub mod config;
pub mod error;
pub mod frontmatter;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, HttpConfig, PROCESSING_LOG_FILE, RunConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate_category_override,
};
pub use error::{LinkshelfError, Result};
pub use frontmatter::Frontmatter;
pub use types::{
    Category, CategoryMetadata, ClassifiedResource, ExtractedContent, LogEntry, LogStatus,
    LogSummary, ProcessedDocument, Resource, normalize_url,
};
