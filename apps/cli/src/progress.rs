//! Terminal progress bar for extraction runs.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use linkshelf_core::{ProgressReporter, ResourceOutcome, ResourceReport, RunReport};

/// CLI progress reporter using an indicatif bar.
pub(crate) struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    pub(crate) fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template("{spinner:.cyan} [{pos}/{len}] {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }
}

impl ProgressReporter for CliProgress {
    fn run_started(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn resource_started(&self, url: &str, _index: usize, _total: usize) {
        self.bar.set_message(url.to_string());
    }

    fn resource_finished(&self, report: &ResourceReport, _index: usize, _total: usize) {
        if let ResourceOutcome::Failed { stage, reason } = &report.outcome {
            self.bar
                .println(format!("  failed ({stage}) {}: {reason}", report.url));
        }
        self.bar.inc(1);
    }

    fn done(&self, _report: &RunReport) {
        self.bar.finish_and_clear();
    }
}
