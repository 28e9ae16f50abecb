//! Drives resources through classify → extract → process → store.
//!
//! Each resource runs its stages in isolation: a failing stage becomes a
//! `failed` log entry and the run moves on. Only an unreadable input list
//! aborts a run.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use linkshelf_crawler::ExtractorRegistry;
use linkshelf_shared::{
    Category, ClassifiedResource, LinkshelfError, LogEntry, LogSummary, Resource, Result,
    RunConfig, validate_category_override,
};
use linkshelf_storage::{ProcessingLog, StorageManager, StorageStats};

use crate::progress::ProgressReporter;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Pipeline stage a resource can fail in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extracting,
    Processing,
    Storing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Extracting => "extracting",
            Stage::Processing => "processing",
            Stage::Storing => "storing",
        })
    }
}

/// Terminal state of one resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceOutcome {
    Completed { path: PathBuf },
    Failed { stage: Stage, reason: String },
}

/// What happened to one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceReport {
    pub url: String,
    pub category: Category,
    pub outcome: ResourceOutcome,
}

impl ResourceReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ResourceOutcome::Completed { .. })
    }

    fn log_entry(&self) -> LogEntry {
        match &self.outcome {
            ResourceOutcome::Completed { path } => LogEntry::completed(&self.url, path.clone()),
            ResourceOutcome::Failed { reason, .. } => LogEntry::failed(&self.url, reason),
        }
    }
}

/// Aggregate result of a run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Per-resource results, in input order.
    pub outcomes: Vec<ResourceReport>,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Resources left out because an earlier run already completed them.
    pub skipped: usize,
    /// Attempted resources per detected category.
    pub by_category: BTreeMap<Category, usize>,
    /// Resources never started because the run was cancelled or timed out.
    pub not_started: usize,
    pub cancelled: bool,
    pub elapsed: Duration,
    pub storage: StorageStats,
    /// Counters over the whole log, earlier runs included.
    pub log: LogSummary,
    pub log_path: PathBuf,
}

impl RunReport {
    /// `0` when nothing failed, `1` when everything attempted failed, `2` otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.failed == 0 {
            0
        } else if self.succeeded == 0 {
            1
        } else {
            2
        }
    }
}

/// A stage error tagged with the stage it came from.
struct StageFailure {
    stage: Stage,
    error: LinkshelfError,
}

impl StageFailure {
    fn at(stage: Stage) -> impl FnOnce(LinkshelfError) -> Self {
        move |error| Self { stage, error }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Everything a resource pipeline needs for one run, shared across worker tasks.
struct StageContext {
    registry: Arc<ExtractorRegistry>,
    storage: StorageManager,
    category_override: Option<String>,
}

/// Owns the processing log and coordinates one or more runs.
pub struct Orchestrator {
    config: RunConfig,
    registry: Arc<ExtractorRegistry>,
    log: ProcessingLog,
    cancel: CancellationToken,
}

impl Orchestrator {
    /// Build an orchestrator with the default extractor registry.
    pub fn new(config: RunConfig) -> Result<Self> {
        let registry = ExtractorRegistry::new(&config)?;
        Self::with_registry(config, registry)
    }

    /// Build an orchestrator around a caller-configured registry.
    ///
    /// Loads the processing log from the output root.
    pub fn with_registry(config: RunConfig, registry: ExtractorRegistry) -> Result<Self> {
        if let Some(category) = &config.category_override {
            validate_category_override(category)?;
        }
        let log = ProcessingLog::load(&config.log_path())?;

        Ok(Self {
            config,
            registry: Arc::new(registry),
            log,
            cancel: CancellationToken::new(),
        })
    }

    /// Token that stops the run before the next resource starts.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn log(&self) -> &ProcessingLog {
        &self.log
    }

    /// Load a resource list and run it. A [`LinkshelfError::Format`] from
    /// loading aborts before any resource is processed.
    pub async fn run_file(
        &mut self,
        input: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<RunReport> {
        let loaded = linkshelf_resources::load(input)?;
        self.run(loaded.resources, progress).await
    }

    /// Process `resources` in order and persist the log.
    ///
    /// With `skip_completed` set, URLs the log already marks completed are
    /// left out and counted as skipped.
    #[instrument(skip_all, fields(resources = resources.len(), concurrency = self.config.concurrency))]
    pub async fn run(
        &mut self,
        mut resources: Vec<Resource>,
        progress: &dyn ProgressReporter,
    ) -> Result<RunReport> {
        let start = Instant::now();
        let deadline = self.config.run_timeout.map(|d| start + d);
        let batch_size = self.config.concurrency.max(1);
        let log_path = self.config.log_path();

        let mut skipped = 0;
        if self.config.skip_completed {
            let before = resources.len();
            resources.retain(|r| !self.log.is_completed(&r.url));
            skipped = before - resources.len();
            if skipped > 0 {
                info!(skipped, "skipping resources completed in earlier runs");
            }
        }
        let total = resources.len();

        // Fresh storage per run: counters and name allocations never leak across runs.
        let ctx = Arc::new(StageContext {
            registry: Arc::clone(&self.registry),
            storage: StorageManager::new(&self.config.output_root),
            category_override: self.config.category_override.clone(),
        });

        info!(total, output_root = %self.config.output_root.display(), "starting run");
        progress.run_started(total);

        let mut outcomes: Vec<ResourceReport> = Vec::with_capacity(total);
        let mut pending = resources.into_iter();
        let mut cancelled = false;

        loop {
            if self.stop_requested(deadline) {
                cancelled = true;
                break;
            }

            let batch: Vec<ClassifiedResource> = pending
                .by_ref()
                .take(batch_size)
                .map(linkshelf_resources::classify)
                .collect();
            if batch.is_empty() {
                break;
            }

            let first_index = outcomes.len();
            for (offset, resource) in batch.iter().enumerate() {
                progress.resource_started(&resource.resource.url, first_index + offset, total);
            }

            let reports = run_batch(&ctx, batch).await;

            for report in reports {
                let index = outcomes.len();
                self.log.record(report.log_entry());
                progress.resource_finished(&report, index, total);
                if self.config.persist_each {
                    if let Err(e) = self.log.persist(&log_path) {
                        warn!(error = %e, "failed to persist processing log");
                    }
                }
                outcomes.push(report);
            }
        }

        let not_started = pending.count();
        if cancelled {
            warn!(not_started, "run stopped before all resources started");
        }

        self.log.persist(&log_path)?;

        let succeeded = outcomes.iter().filter(|r| r.is_success()).count();
        let mut by_category = BTreeMap::new();
        for report in &outcomes {
            *by_category.entry(report.category).or_insert(0) += 1;
        }
        let report = RunReport {
            attempted: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            skipped,
            by_category,
            not_started,
            cancelled,
            elapsed: start.elapsed(),
            storage: ctx.storage.stats(),
            log: self.log.summary(),
            log_path,
            outcomes,
        };

        info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            not_started = report.not_started,
            elapsed_ms = report.elapsed.as_millis(),
            "run complete"
        );
        progress.done(&report);

        Ok(report)
    }

    fn stop_requested(&self, deadline: Option<Instant>) -> bool {
        if self.cancel.is_cancelled() {
            info!("cancellation requested");
            return true;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            info!("run timeout reached");
            return true;
        }
        false
    }
}

/// Run a batch, returning reports in batch order.
async fn run_batch(ctx: &Arc<StageContext>, batch: Vec<ClassifiedResource>) -> Vec<ResourceReport> {
    if batch.len() == 1 {
        let mut reports = Vec::with_capacity(1);
        for resource in batch {
            reports.push(process_resource(ctx, resource).await);
        }
        return reports;
    }

    let mut handles = Vec::with_capacity(batch.len());
    for resource in batch {
        let url = resource.resource.url.clone();
        let category = resource.category;
        let ctx = Arc::clone(ctx);
        let handle = tokio::spawn(async move { process_resource(&ctx, resource).await });
        handles.push((url, category, handle));
    }

    let mut reports = Vec::with_capacity(handles.len());
    for (url, category, handle) in handles {
        let report = match handle.await {
            Ok(report) => report,
            Err(e) => {
                error!(%url, error = %e, "resource task failed");
                ResourceReport {
                    url,
                    category,
                    outcome: ResourceOutcome::Failed {
                        stage: Stage::Extracting,
                        reason: format!("worker task failed: {e}"),
                    },
                }
            }
        };
        reports.push(report);
    }
    reports
}

// ---------------------------------------------------------------------------
// Per-resource pipeline
// ---------------------------------------------------------------------------

#[instrument(skip_all, fields(url = %resource.resource.url, category = %resource.category))]
async fn process_resource(ctx: &StageContext, resource: ClassifiedResource) -> ResourceReport {
    let outcome = match run_stages(ctx, &resource).await {
        Ok(path) => ResourceOutcome::Completed { path },
        Err(failure) => {
            warn!(stage = %failure.stage, error = %failure.error, "resource failed");
            ResourceOutcome::Failed {
                stage: failure.stage,
                reason: failure.error.to_string(),
            }
        }
    };

    ResourceReport {
        url: resource.resource.url,
        category: resource.category,
        outcome,
    }
}

async fn run_stages(
    ctx: &StageContext,
    resource: &ClassifiedResource,
) -> std::result::Result<PathBuf, StageFailure> {
    let content = ctx
        .registry
        .fetch_and_extract(
            resource.category,
            &resource.resource.url,
            ctx.registry.timeout(),
        )
        .await
        .map_err(StageFailure::at(Stage::Extracting))?;

    let document = linkshelf_markdown::process(&content, &resource.metadata)
        .map_err(StageFailure::at(Stage::Processing))?;

    ctx.storage
        .store(&document, resource, ctx.category_override.as_deref())
        .map_err(StageFailure::at(Stage::Storing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentProgress;
    use linkshelf_shared::{Frontmatter, LogStatus};
    use wiremock::matchers::path;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const EXAMPLE_PAGE: &str = r#"<!doctype html>
<html>
<head><title>Example Domain</title></head>
<body>
<div>
  <h1>Example Domain</h1>
  <p>This domain is for use in illustrative examples in documents.</p>
  <p><a href="https://www.iana.org/domains/example">More information...</a></p>
</div>
</body>
</html>"#;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("linkshelf-run-{}", uuid::Uuid::now_v7()))
    }

    fn run_config(root: &Path) -> RunConfig {
        RunConfig {
            output_root: root.to_path_buf(),
            timeout: Duration::from_secs(5),
            ..RunConfig::default()
        }
    }

    async fn mount_html(server: &MockServer, route: &str, html: &str) {
        Mock::given(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html; charset=utf-8")
                    .set_body_string(html),
            )
            .mount(server)
            .await;
    }

    fn page(title: &str, body: &str) -> String {
        format!("<html><head><title>{title}</title></head><body><main><p>{body}</p></main></body></html>")
    }

    #[tokio::test]
    async fn example_domain_scenario_runs_twice() {
        let server = MockServer::start().await;
        mount_html(&server, "/", EXAMPLE_PAGE).await;
        let url = server.uri();
        let root = temp_root();

        let mut first = Orchestrator::new(run_config(&root)).unwrap();
        let report = first
            .run(vec![Resource::new(url.clone())], &SilentProgress)
            .await
            .unwrap();

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.exit_code(), 0);
        let ResourceOutcome::Completed { path: first_path } = &report.outcomes[0].outcome else {
            panic!("expected completed outcome: {:?}", report.outcomes[0]);
        };
        assert_eq!(*first_path, root.join("127-0-0-1").join("example-domain.md"));

        let written = std::fs::read_to_string(first_path).unwrap();
        let (frontmatter, body) = Frontmatter::parse(&written).unwrap();
        assert_eq!(frontmatter.get("title"), Some("Example Domain"));
        assert_eq!(frontmatter.get("source"), Some(url.as_str()));
        assert_eq!(frontmatter.get("domain"), Some("127.0.0.1"));
        assert!(frontmatter.contains_key("extracted"));
        assert!(body.starts_with("# Example Domain\n"));

        // Second run without clearing the log.
        let mut second = Orchestrator::new(run_config(&root)).unwrap();
        assert!(second.log().is_completed(&url));
        let report = second
            .run(vec![Resource::new(url.clone())], &SilentProgress)
            .await
            .unwrap();

        let ResourceOutcome::Completed { path: second_path } = &report.outcomes[0].outcome else {
            panic!("expected completed outcome");
        };
        assert_eq!(*second_path, root.join("127-0-0-1").join("example-domain-1.md"));
        assert!(first_path.exists());

        let log = ProcessingLog::load(&root.join("_processing-log.json")).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].output_path.as_ref(), Some(second_path));
        assert_eq!(report.log.total, 1);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_run() {
        let server = MockServer::start().await;
        mount_html(&server, "/a", &page("Alpha", "First page.")).await;
        Mock::given(path("/b"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_html(&server, "/c", &page("Gamma", "Third page.")).await;
        let root = temp_root();

        let resources = ["/a", "/b", "/c"]
            .iter()
            .map(|p| Resource::new(format!("{}{p}", server.uri())))
            .collect();
        let mut orchestrator = Orchestrator::new(run_config(&root)).unwrap();
        let report = orchestrator.run(resources, &SilentProgress).await.unwrap();

        assert_eq!(report.attempted, 3);
        assert_eq!(report.succeeded + report.failed, report.attempted);
        assert_eq!(report.failed, 1);
        assert_eq!(report.exit_code(), 2);
        assert!(report.outcomes[0].is_success());
        assert!(report.outcomes[2].is_success());
        assert!(matches!(
            report.outcomes[1].outcome,
            ResourceOutcome::Failed { stage: Stage::Extracting, .. }
        ));
        assert_eq!(report.storage.files_written, 2);

        let failed = orchestrator
            .log()
            .get(&format!("{}/b", server.uri()))
            .unwrap();
        assert_eq!(failed.status, LogStatus::Failed);
        assert!(failed.error.as_deref().is_some_and(|e| e.contains("500")));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn report_counts_attempts_per_category() {
        let server = MockServer::start().await;
        mount_html(&server, "/blog/launch", &page("Launch", "We shipped.")).await;
        mount_html(&server, "/a", &page("Alpha", "First page.")).await;
        Mock::given(path("/b"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let root = temp_root();

        let resources = ["/blog/launch", "/a", "/b"]
            .iter()
            .map(|p| Resource::new(format!("{}{p}", server.uri())))
            .collect();
        let mut orchestrator = Orchestrator::new(run_config(&root)).unwrap();
        let report = orchestrator.run(resources, &SilentProgress).await.unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(
            report.by_category,
            BTreeMap::from([(Category::BlogPost, 1), (Category::Article, 2)])
        );
        assert_eq!(report.by_category.values().sum::<usize>(), report.attempted);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn skip_completed_leaves_out_finished_urls() {
        let server = MockServer::start().await;
        mount_html(&server, "/a", &page("Alpha", "First page.")).await;
        mount_html(&server, "/b", &page("Beta", "Second page.")).await;
        let root = temp_root();
        let a = format!("{}/a", server.uri());
        let b = format!("{}/b", server.uri());

        let mut first = Orchestrator::new(run_config(&root)).unwrap();
        first
            .run(vec![Resource::new(a.clone())], &SilentProgress)
            .await
            .unwrap();

        let mut second = Orchestrator::new(RunConfig {
            skip_completed: true,
            ..run_config(&root)
        })
        .unwrap();
        let report = second
            .run(vec![Resource::new(a), Resource::new(b.clone())], &SilentProgress)
            .await
            .unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.attempted, 1);
        assert_eq!(report.outcomes[0].url, b);
        assert_eq!(report.storage.files_written, 1);
        assert_eq!(report.log.total, 2);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn storage_counters_reset_between_runs() {
        let server = MockServer::start().await;
        mount_html(&server, "/a", &page("Alpha", "First page.")).await;
        let root = temp_root();
        let url = format!("{}/a", server.uri());

        let mut orchestrator = Orchestrator::new(run_config(&root)).unwrap();
        let first = orchestrator
            .run(vec![Resource::new(url.clone())], &SilentProgress)
            .await
            .unwrap();
        let second = orchestrator
            .run(vec![Resource::new(url)], &SilentProgress)
            .await
            .unwrap();

        assert_eq!(first.storage.files_written, 1);
        assert_eq!(second.storage.files_written, 1);
        assert_eq!(second.storage.bytes_written, first.storage.bytes_written);
        assert_eq!(second.skipped, 0);
        assert_eq!(
            second.outcomes[0].outcome,
            ResourceOutcome::Completed {
                path: root.join("127-0-0-1").join("alpha-1.md")
            }
        );

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn all_failed_exits_with_one() {
        let root = temp_root();
        let mut orchestrator = Orchestrator::new(RunConfig {
            timeout: Duration::from_secs(2),
            ..run_config(&root)
        })
        .unwrap();
        let report = orchestrator
            .run(vec![Resource::new("http://127.0.0.1:9/")], &SilentProgress)
            .await
            .unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.exit_code(), 1);
        assert!(root.join("_processing-log.json").exists());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn processing_and_storing_failures_are_tagged() {
        let server = MockServer::start().await;
        // Text that is only an escaped entity survives extraction but not cleanup.
        mount_html(&server, "/entity", "<html><body><p>&amp;nbsp;</p></body></html>").await;
        mount_html(&server, "/blocked", &page("Blocked", "Cannot be stored.")).await;
        let root = temp_root();
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("blocked-dir"), "a file, not a directory").unwrap();

        let mut orchestrator = Orchestrator::new(RunConfig {
            category_override: Some("blocked-dir".into()),
            ..run_config(&root)
        })
        .unwrap();
        let resources = vec![
            Resource::new(format!("{}/entity", server.uri())),
            Resource::new(format!("{}/blocked", server.uri())),
        ];
        let report = orchestrator.run(resources, &SilentProgress).await.unwrap();

        assert!(matches!(
            report.outcomes[0].outcome,
            ResourceOutcome::Failed { stage: Stage::Processing, .. }
        ));
        assert!(matches!(
            report.outcomes[1].outcome,
            ResourceOutcome::Failed { stage: Stage::Storing, .. }
        ));
        assert_eq!(report.exit_code(), 1);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn category_override_sets_directory() {
        let server = MockServer::start().await;
        mount_html(&server, "/guide", &page("Guide", "Read me.")).await;
        let root = temp_root();

        let mut orchestrator = Orchestrator::new(RunConfig {
            category_override: Some("ai-tools".into()),
            ..run_config(&root)
        })
        .unwrap();
        let report = orchestrator
            .run(vec![Resource::new(format!("{}/guide", server.uri()))], &SilentProgress)
            .await
            .unwrap();

        assert_eq!(
            report.outcomes[0].outcome,
            ResourceOutcome::Completed {
                path: root.join("ai-tools").join("guide.md")
            }
        );

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn concurrent_batches_keep_order_and_unique_names() {
        let server = MockServer::start().await;
        for i in 0..5 {
            mount_html(&server, &format!("/same/{i}"), &page("Same Title", "Body text.")).await;
        }
        let root = temp_root();

        let resources: Vec<Resource> = (0..5)
            .map(|i| Resource::new(format!("{}/same/{i}", server.uri())))
            .collect();
        let urls: Vec<String> = resources.iter().map(|r| r.url.clone()).collect();

        let mut orchestrator = Orchestrator::new(RunConfig {
            concurrency: 3,
            ..run_config(&root)
        })
        .unwrap();
        let report = orchestrator.run(resources, &SilentProgress).await.unwrap();

        assert_eq!(report.succeeded, 5);
        let reported: Vec<&str> = report.outcomes.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(reported, urls);

        let mut paths: Vec<PathBuf> = report
            .outcomes
            .iter()
            .filter_map(|r| match &r.outcome {
                ResourceOutcome::Completed { path } => Some(path.clone()),
                ResourceOutcome::Failed { .. } => None,
            })
            .collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), 5);
        assert!(paths.contains(&root.join("127-0-0-1").join("same-title-4.md")));

        let logged: Vec<&str> = orchestrator.log().entries().iter().map(|e| e.url.as_str()).collect();
        assert_eq!(logged, urls);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn cancelled_run_starts_nothing_and_persists_log() {
        let root = temp_root();
        let mut orchestrator = Orchestrator::new(run_config(&root)).unwrap();
        orchestrator.cancellation_token().cancel();

        let report = orchestrator
            .run(
                vec![
                    Resource::new("https://a.example.com"),
                    Resource::new("https://b.example.com"),
                ],
                &SilentProgress,
            )
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.attempted, 0);
        assert_eq!(report.not_started, 2);
        assert_eq!(report.exit_code(), 0);
        assert!(root.join("_processing-log.json").exists());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn run_timeout_stops_after_in_flight_resource() {
        let server = MockServer::start().await;
        Mock::given(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(page("Slow", "Eventually here."))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        let root = temp_root();

        let mut orchestrator = Orchestrator::new(RunConfig {
            run_timeout: Some(Duration::from_millis(100)),
            ..run_config(&root)
        })
        .unwrap();
        let resources = vec![
            Resource::new(format!("{}/slow", server.uri())),
            Resource::new(format!("{}/never", server.uri())),
        ];
        let report = orchestrator.run(resources, &SilentProgress).await.unwrap();

        assert!(report.cancelled);
        assert_eq!(report.attempted, 1);
        assert!(report.outcomes[0].is_success());
        assert_eq!(report.not_started, 1);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn run_file_rejects_non_array_input() {
        let root = temp_root();
        std::fs::create_dir_all(&root).unwrap();
        let input = root.join("resources.json");
        std::fs::write(&input, r#"{"url": "http://example.com"}"#).unwrap();

        let mut orchestrator = Orchestrator::new(run_config(&root)).unwrap();
        let err = orchestrator.run_file(&input, &SilentProgress).await.unwrap_err();
        assert!(matches!(err, LinkshelfError::Format { .. }));
        assert!(!root.join("_processing-log.json").exists());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn invalid_category_override_is_rejected() {
        let root = temp_root();
        let result = Orchestrator::new(RunConfig {
            category_override: Some("../escape".into()),
            ..run_config(&root)
        });
        assert!(matches!(result, Err(LinkshelfError::Config { .. })));
    }
}
