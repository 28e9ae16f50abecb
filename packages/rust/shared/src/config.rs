//! Application configuration for linkshelf.
//!
//! User config lives at `~/.linkshelf/linkshelf.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LinkshelfError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "linkshelf.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".linkshelf";

/// File name of the processing log inside the output root.
pub const PROCESSING_LOG_FILE: &str = "_processing-log.json";

// ---------------------------------------------------------------------------
// Config structs (matching linkshelf.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default input resource list.
    #[serde(default = "default_input")]
    pub input: String,

    /// Default output root.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Resources processed at once. 1 means strictly sequential.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Persist the processing log after every resource, not only at the end.
    #[serde(default = "default_true")]
    pub persist_each: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output_dir: default_output_dir(),
            timeout_secs: default_timeout_secs(),
            concurrency: default_concurrency(),
            persist_each: true,
        }
    }
}

fn default_input() -> String {
    "data/resources-raw/resources-raw.json".into()
}
fn default_output_dir() -> String {
    "knowledge".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_concurrency() -> u32 {
    1
}
fn default_true() -> bool {
    true
}

/// `[http]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum redirects followed per request.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
        }
    }
}

fn default_user_agent() -> String {
    concat!("Mozilla/5.0 (compatible; linkshelf/", env!("CARGO_PKG_VERSION"), ")").into()
}
fn default_max_redirects() -> usize {
    5
}

// ---------------------------------------------------------------------------
// Run config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime configuration for one extraction run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Root directory for markdown output and the processing log.
    pub output_root: PathBuf,
    /// Per-request fetch timeout.
    pub timeout: Duration,
    /// Store every resource under this directory instead of its detected one.
    pub category_override: Option<String>,
    /// Resources processed at once (at least 1).
    pub concurrency: usize,
    /// Persist the log after each resource.
    pub persist_each: bool,
    /// Stop starting new resources once this much time has elapsed.
    pub run_timeout: Option<Duration>,
    /// Leave out URLs the processing log already marks completed.
    pub skip_completed: bool,
    /// User-Agent header.
    pub user_agent: String,
    /// Redirect limit.
    pub max_redirects: usize,
}

impl RunConfig {
    /// Path of the processing log inside the output root.
    pub fn log_path(&self) -> PathBuf {
        self.output_root.join(PROCESSING_LOG_FILE)
    }
}

impl From<&AppConfig> for RunConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            output_root: PathBuf::from(&config.defaults.output_dir),
            timeout: Duration::from_secs(config.defaults.timeout_secs),
            category_override: None,
            concurrency: config.defaults.concurrency.max(1) as usize,
            persist_each: config.defaults.persist_each,
            run_timeout: None,
            skip_completed: false,
            user_agent: config.http.user_agent.clone(),
            max_redirects: config.http.max_redirects,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Check that a category override is usable as a single directory name.
pub fn validate_category_override(value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LinkshelfError::config("category override must not be empty"));
    }
    if trimmed.contains(['/', '\\']) || trimmed.split('.').all(str::is_empty) {
        return Err(LinkshelfError::config(format!(
            "category override must be a single directory name, got {value:?}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.linkshelf/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LinkshelfError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.linkshelf/linkshelf.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LinkshelfError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| LinkshelfError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LinkshelfError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LinkshelfError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LinkshelfError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
