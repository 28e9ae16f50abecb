//! CLI command definitions, routing, and tracing setup.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use linkshelf_core::{Orchestrator, RunReport};
use linkshelf_shared::{
    AppConfig, Category, LogStatus, PROCESSING_LOG_FILE, RunConfig, config_file_path, init_config,
    load_config, load_config_from,
};
use linkshelf_storage::ProcessingLog;

use crate::progress::CliProgress;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// linkshelf: turn saved links into a markdown knowledge base.
#[derive(Parser)]
#[command(
    name = "linkshelf",
    version,
    about = "Fetch a list of saved links and store each page as categorized markdown.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.linkshelf/linkshelf.toml.
    #[arg(long, global = true, env = "LINKSHELF_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Extract every resource in the input list into markdown.
    Extract(ExtractArgs),

    /// Summarize the processing log of an output directory.
    Status {
        /// Output directory holding the processing log.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags for `extract`. Unset flags fall back to the config file.
#[derive(clap::Args)]
pub(crate) struct ExtractArgs {
    /// JSON resource list.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory for markdown files and the processing log.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Store every resource under this directory instead of its detected category.
    #[arg(short, long)]
    category: Option<String>,

    /// Resources processed at once.
    #[arg(long)]
    concurrency: Option<u32>,

    /// Stop starting new resources after this many seconds.
    #[arg(long)]
    run_timeout: Option<u64>,

    /// Skip URLs already marked completed in the processing log.
    #[arg(long)]
    skip_completed: bool,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "linkshelf=info",
        1 => "linkshelf=debug",
        _ => "linkshelf=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Command::Extract(args) => cmd_extract(&config, args).await,
        Command::Status { output } => cmd_status(&config, output.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init { force } => cmd_config_init(force),
            ConfigAction::Show => cmd_config_show(&config, cli.config.as_deref()),
        },
    }
}

// ---------------------------------------------------------------------------
// extract
// ---------------------------------------------------------------------------

async fn cmd_extract(config: &AppConfig, args: ExtractArgs) -> Result<ExitCode> {
    let input = args
        .input
        .unwrap_or_else(|| PathBuf::from(&config.defaults.input));

    let mut run_config = RunConfig::from(config);
    if let Some(output) = args.output {
        run_config.output_root = output;
    }
    if let Some(secs) = args.timeout {
        run_config.timeout = Duration::from_secs(secs);
    }
    if let Some(concurrency) = args.concurrency {
        run_config.concurrency = concurrency.max(1) as usize;
    }
    run_config.category_override = args.category;
    run_config.run_timeout = args.run_timeout.map(Duration::from_secs);
    run_config.skip_completed = args.skip_completed;

    let mut orchestrator = Orchestrator::new(run_config)?;

    let loaded = linkshelf_resources::load(&input)?;
    info!(
        input = %input.display(),
        resources = loaded.resources.len(),
        invalid = loaded.stats.invalid,
        duplicates = loaded.stats.duplicates,
        "extracting resources"
    );

    let token = orchestrator.cancellation_token();
    tokio::spawn(async move {
        if wait_for_forced_exit(tokio::signal::ctrl_c, token).await {
            std::process::exit(130);
        }
    });

    let reporter = CliProgress::new();
    let report = orchestrator.run(loaded.resources, &reporter).await?;

    print_report(&report);
    Ok(ExitCode::from(report.exit_code()))
}

/// Cancel `token` on the first interrupt and return `true` on the second.
///
/// Returns `false` if interrupts cannot be received.
async fn wait_for_forced_exit<F, Fut>(mut interrupt: F, token: CancellationToken) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = interrupt().await {
        warn!(error = %e, "cannot listen for interrupts");
        return false;
    }
    warn!("interrupt received, finishing in-flight resources (interrupt again to quit)");
    token.cancel();

    if interrupt().await.is_err() {
        return false;
    }
    warn!("second interrupt received, exiting");
    true
}

fn print_report(report: &RunReport) {
    println!();
    if report.cancelled {
        println!("  Extraction stopped early.");
    } else {
        println!("  Extraction finished.");
    }
    println!("  Attempted:   {}", report.attempted);
    println!("  Succeeded:   {}", report.succeeded);
    println!("  Failed:      {}", report.failed);
    if report.skipped > 0 {
        println!("  Skipped:     {} (completed earlier)", report.skipped);
    }
    if report.not_started > 0 {
        println!("  Not started: {}", report.not_started);
    }
    println!(
        "  Written:     {} files, {} bytes",
        report.storage.files_written, report.storage.bytes_written
    );
    println!("  Log:         {}", report.log_path.display());
    println!("  Time:        {:.1}s", report.elapsed.as_secs_f64());

    if report.attempted > 0 {
        println!();
        println!("  By category:");
        for category in Category::ALL {
            let count = report.by_category.get(&category).copied().unwrap_or(0);
            println!("    {:<14} {count}", category.as_str());
        }
    }
    println!();
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

fn cmd_status(config: &AppConfig, output: Option<&Path>) -> Result<ExitCode> {
    let output_root = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.defaults.output_dir));
    let log_path = output_root.join(PROCESSING_LOG_FILE);

    if !log_path.exists() {
        return Err(eyre!("no processing log at '{}'", log_path.display()));
    }

    let log = ProcessingLog::load(&log_path)?;
    let summary = log.summary();

    println!();
    println!("  Log:        {}", log_path.display());
    println!("  Total:      {}", summary.total);
    println!("  Successful: {}", summary.successful);
    println!("  Failed:     {}", summary.failed);

    let failures: Vec<_> = log
        .entries()
        .iter()
        .filter(|e| e.status == LogStatus::Failed)
        .collect();
    if !failures.is_empty() {
        println!();
        for entry in failures {
            println!(
                "  - {}: {}",
                entry.url,
                entry.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
    println!();

    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init(force: bool) -> Result<ExitCode> {
    let path = config_file_path()?;
    if path.exists() && !force {
        return Err(eyre!(
            "config already exists at '{}' (use --force to overwrite)",
            path.display()
        ));
    }
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_config_show(config: &AppConfig, explicit: Option<&Path>) -> Result<ExitCode> {
    let source = match explicit {
        Some(path) => path.to_path_buf(),
        None => config_file_path()?,
    };
    let toml_str = toml::to_string_pretty(config)?;
    println!("# {}", source.display());
    println!("{toml_str}");
    Ok(ExitCode::SUCCESS)
}
