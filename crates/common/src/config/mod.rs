//! Configuration management for scantron services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{APP_ENV}.toml, config/local.toml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Gateway server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Where uploads and generated CSVs live
    #[serde(default)]
    pub storage: StorageConfig,

    /// Answer extraction backend
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Cross-origin policy for the gateway
    #[serde(default)]
    pub cors: CorsConfig,

    /// Mock recognition service
    #[serde(default)]
    pub mock_ai: MockAiConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding transient PDFs and generated CSVs
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractorConfig {
    /// Extraction provider: synthetic, remote
    #[serde(default = "default_extractor_provider")]
    pub provider: String,

    /// Recognition endpoint used by the remote provider
    #[serde(default = "default_extractor_endpoint")]
    pub endpoint: String,

    /// Upper bound on a single extraction call in seconds
    #[serde(default = "default_extractor_timeout")]
    pub timeout_secs: u64,

    /// Questions fabricated per sheet by the synthetic provider
    #[serde(default = "default_questions_per_sheet")]
    pub questions_per_sheet: usize,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CorsConfig {
    /// Allowed origins; empty allows any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MockAiConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_mock_port")]
    pub port: u16,

    /// Scratch directory for sheets being counted
    #[serde(default = "default_mock_upload_dir")]
    pub upload_dir: PathBuf,

    /// Questions fabricated per student
    #[serde(default = "default_questions_per_sheet")]
    pub questions_per_sheet: usize,

    /// Where fabricated results are pushed after each request (disabled when unset)
    pub forward_url: Option<String>,

    /// Timeout for the forward push in seconds
    #[serde(default = "default_forward_timeout")]
    pub forward_timeout_secs: u64,

    /// Origins allowed to call the mock service
    #[serde(default = "default_mock_origins")]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error) or a full EnvFilter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Expose Prometheus metrics at /metrics
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 5001 }
fn default_mock_port() -> u16 { 5002 }
fn default_max_upload_bytes() -> usize { 50 * 1024 * 1024 }
fn default_upload_dir() -> PathBuf { PathBuf::from("instance/uploads") }
fn default_mock_upload_dir() -> PathBuf { PathBuf::from("instance/mock_uploads") }
fn default_extractor_provider() -> String { "synthetic".to_string() }
fn default_extractor_endpoint() -> String { "http://localhost:5002/mock_ai".to_string() }
fn default_extractor_timeout() -> u64 { 60 }
fn default_questions_per_sheet() -> usize { 20 }
fn default_forward_timeout() -> u64 { 5 }
fn default_mock_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:5002".to_string(),
        "http://localhost:5001".to_string(),
    ]
}
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_enabled() -> bool { true }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { upload_dir: default_upload_dir() }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            provider: default_extractor_provider(),
            endpoint: default_extractor_endpoint(),
            timeout_secs: default_extractor_timeout(),
            questions_per_sheet: default_questions_per_sheet(),
        }
    }
}

impl Default for MockAiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_mock_port(),
            upload_dir: default_mock_upload_dir(),
            questions_per_sheet: default_questions_per_sheet(),
            forward_url: None,
            forward_timeout_secs: default_forward_timeout(),
            allowed_origins: default_mock_origins(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files.
    ///
    /// `APP_CONFIG_FILE` replaces the `config/` lookup with a single file.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var("APP_CONFIG_FILE") {
            return Self::from_file(&path);
        }

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__SERVER__PORT=5001
            .add_source(env_source())

            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific file, still honouring APP__ overrides
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?;

        config.try_deserialize()
    }

    /// Get the extraction bound as Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extractor.timeout_secs)
    }

    /// Get the mock forward timeout as Duration
    pub fn forward_timeout(&self) -> Duration {
        Duration::from_secs(self.mock_ai.forward_timeout_secs)
    }
}

/// `APP__*` variables, with comma-separated origin lists
fn env_source() -> Environment {
    Environment::with_prefix("APP")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("cors.allowed_origins")
        .with_list_parse_key("mock_ai.allowed_origins")
}
