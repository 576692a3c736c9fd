use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

// =============================================================================
// Time-related constants
// =============================================================================

/// Timeout for a single chart lookup in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// Delay between starting each lookup to avoid rate limiting (10ms)
pub const FETCH_STAGGER_DELAY_MS: u64 = 10;

/// Retries for lookups that fail with a transient error
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Base delay for exponential retry backoff in milliseconds
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 200;

/// Artifact Hub package metadata endpoint; `{}` is replaced by the chart key
pub const DEFAULT_API_URL_TEMPLATE: &str = "https://artifacthub.io/api/v1/packages/helm/{}";

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "HELMFILE_AUDIT_CONFIG";

const APP_DIR: &str = "helmfile-audit";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AuditConfig {
    pub source: SourceConfig,
    pub lookup: LookupConfig,
    pub logging: LoggingConfig,
}

/// Which external lookup mechanism answers "what is the latest version"
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    #[default]
    ArtifactHub,
    HelmSearch,
}

/// Version source configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub api_url_template: String,
    pub helm_binary: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::ArtifactHub,
            api_url_template: DEFAULT_API_URL_TEMPLATE.to_string(),
            helm_binary: "helm".to_string(),
        }
    }
}

/// Lookup fan-out configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LookupConfig {
    pub timeout_ms: u64,
    pub stagger_delay_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            timeout_ms: FETCH_TIMEOUT_MS,
            stagger_delay_ms: FETCH_STAGGER_DELAY_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AuditConfig {
    /// Load the config from the default location, falling back to defaults
    /// when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Ok(serde_json::from_str(&content)?)
    }
}

/// Returns the path to the data directory for helmfile-audit.
/// Uses $XDG_DATA_HOME/helmfile-audit if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/helmfile-audit,
/// or ./helmfile-audit if neither is available.
pub fn data_dir() -> PathBuf {
    base_dir_with_env(
        std::env::var("XDG_DATA_HOME").ok(),
        dirs::home_dir(),
        ".local/share",
    )
}

/// Returns the path to the config file.
/// $HELMFILE_AUDIT_CONFIG wins, then $XDG_CONFIG_HOME, then ~/.config.
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    base_dir_with_env(
        std::env::var("XDG_CONFIG_HOME").ok(),
        dirs::home_dir(),
        ".config",
    )
    .join("config.json")
}

fn base_dir_with_env(
    xdg_home: Option<String>,
    home_dir: Option<PathBuf>,
    home_relative: &str,
) -> PathBuf {
    let base = xdg_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(home_relative)))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join(APP_DIR)
}
