//! Run orchestration for linkshelf.
//!
//! This crate ties together resource loading, content type detection,
//! extraction, markdown processing, and storage into one extraction run
//! (see [`Orchestrator`]).

pub mod orchestrator;
pub mod progress;

pub use orchestrator::{Orchestrator, ResourceOutcome, ResourceReport, RunReport, Stage};
pub use progress::{ProgressReporter, SilentProgress};
