use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShetkariConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub advisor: AdvisorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. Required at startup; there is no built-in
    /// fallback database.
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_pool_max")]
    pub max_connections: u32,

    #[serde(default = "default_pool_min")]
    pub min_connections: u32,

    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Gemini API key. Required at startup; there is no anonymous mode.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_top_p")]
    pub top_p: f64,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// How many stored messages are replayed to the provider as context.
    #[serde(default = "default_context_turns")]
    pub context_turns: usize,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_pool_max() -> u32 {
    10
}

fn default_pool_min() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_temperature() -> f64 {
    0.4
}

fn default_top_p() -> f64 {
    0.95
}

fn default_top_k() -> u32 {
    40
}

fn default_max_output_tokens() -> u32 {
    1024
}

fn default_context_turns() -> usize {
    20
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_pool_max(),
            min_connections: default_pool_min(),
            acquire_timeout_secs: default_acquire_timeout(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
            context_turns: default_context_turns(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl ShetkariConfig {
    pub fn load() -> Result<Self, ConfigLoadError> {
        Self::load_from_paths(get_config_paths())
    }

    pub fn load_from_paths(paths: Vec<PathBuf>) -> Result<Self, ConfigLoadError> {
        load_dotenv_files();

        let mut builder = ConfigBuilder::builder();

        for path in paths {
            if path.exists() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("SHETKARI")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;

        let mut shetkari_config: ShetkariConfig = config.try_deserialize().unwrap_or_default();

        // Compound keys do not survive the single-underscore separator, so the
        // well-known variables are applied explicitly.
        if let Ok(url) = std::env::var("DATABASE_URL") {
            shetkari_config.database.url = url;
        } else if let Ok(url) = std::env::var("SHETKARI_DATABASE_URL") {
            shetkari_config.database.url = url;
        }

        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            shetkari_config.advisor.api_key = key;
        } else if let Ok(key) = std::env::var("GOOGLE_API_KEY") {
            shetkari_config.advisor.api_key = key;
        }

        if let Ok(level) = std::env::var("SHETKARI_LOG_LEVEL") {
            shetkari_config.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            shetkari_config.logging.level = level;
        }

        shetkari_config.validate()?;

        Ok(shetkari_config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.database.url.is_empty() {
            return Err(ConfigLoadError::MissingRequired("database.url".to_string()));
        }

        if !self.database.url.starts_with("postgres://")
            && !self.database.url.starts_with("postgresql://")
        {
            return Err(ConfigLoadError::InvalidValue {
                key: "database.url".to_string(),
                message:
                    "Must be a valid PostgreSQL URL starting with postgres:// or postgresql://"
                        .to_string(),
            });
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigLoadError::InvalidValue {
                key: "database.min_connections".to_string(),
                message: "Cannot be greater than max_connections".to_string(),
            });
        }

        if self.advisor.api_key.is_empty() {
            return Err(ConfigLoadError::MissingRequired(
                "advisor.api_key".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.advisor.temperature) {
            return Err(ConfigLoadError::InvalidValue {
                key: "advisor.temperature".to_string(),
                message: "Must be between 0.0 and 2.0".to_string(),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level_lower = self.logging.level.to_lowercase();
        if !valid_levels.contains(&level_lower.as_str()) && !level_lower.contains('=') {
            return Err(ConfigLoadError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Must be one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        Ok(())
    }

    pub fn log_level(&self) -> &str {
        &self.logging.level
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("config").join("default.toml"));
        paths.push(cwd.join("config").join("local.toml"));
        paths.push(cwd.join("shetkari.toml"));
    }

    paths
}

fn load_dotenv_files() {
    if let Ok(cwd) = std::env::current_dir() {
        for name in [".env", ".env.local"] {
            let path = cwd.join(name);
            if path.exists() {
                let _ = dotenvy::from_path(&path);
            }
        }
    }
}
