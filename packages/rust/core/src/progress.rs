//! Progress callbacks for extraction runs.

use crate::orchestrator::{ResourceReport, RunReport};

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called once before the first resource starts.
    fn run_started(&self, total: usize);
    /// Called when a resource enters the pipeline. `index` is zero-based.
    fn resource_started(&self, url: &str, index: usize, total: usize);
    /// Called when a resource reaches `completed` or `failed`.
    fn resource_finished(&self, report: &ResourceReport, index: usize, total: usize);
    /// Called when the run completes or is cancelled.
    fn done(&self, report: &RunReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn run_started(&self, _total: usize) {}
    fn resource_started(&self, _url: &str, _index: usize, _total: usize) {}
    fn resource_finished(&self, _report: &ResourceReport, _index: usize, _total: usize) {}
    fn done(&self, _report: &RunReport) {}
}
