#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::model::SearchStrategy;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_one_of, validate_positive_number, validate_range,
    validate_url, Validate,
};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub use toml_config::FileConfig;

pub const DEFAULT_PORT: u16 = 7071;
pub const DEFAULT_HISTORY_SESSIONS: usize = 1000;

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub endpoint: String,
    pub index_name: String,
    pub admin_key: String,
    pub top_results: usize,
    pub api_version: String,
    /// `None` queries the index by keywords only.
    pub strategy: Option<SearchStrategy>,
    pub vector_field: String,
    pub semantic_configuration: String,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment_name: String,
    pub model: String,
    pub embeddings_deployment_name: String,
    pub api_version: String,
    pub api_type: String,
    pub temperature: f32,
    pub top_p: f32,
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl HttpClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
            retry_attempts: 2,
            retry_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub app_version: String,
    /// 0 disables conversation history.
    pub chat_history_max_messages: usize,
    /// Users kept in history; the least recently active is dropped first.
    pub chat_history_max_sessions: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub openai: OpenAiConfig,
    pub http: HttpClientConfig,
    pub server: ServerConfig,
}

/// Resolves setting names against the process environment first, then an
/// optional settings map loaded from a file.
struct Settings<F: Fn(&str) -> Option<String>> {
    lookup: F,
    missing: Vec<&'static str>,
}

impl<F: Fn(&str) -> Option<String>> Settings<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    fn required(&mut self, key: &'static str) -> String {
        match self.get(key) {
            Some(value) => value,
            None => {
                self.missing.push(key);
                String::new()
            }
        }
    }

    fn required_any(&mut self, keys: &[&'static str]) -> String {
        match keys.iter().find_map(|key| self.get(key)) {
            Some(value) => value,
            None => {
                self.missing.push(keys[0]);
                String::new()
            }
        }
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T: FromStr>(&self, key: &str, default: T) -> Result<T>
    where
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e: T::Err| AppError::InvalidConfigValueError {
                    field: key.to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                }),
            None => Ok(default),
        }
    }
}

impl AppConfig {
    /// Loads `.env` (when present), the optional TOML file and the environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => {
                return Err(AppError::ConfigError {
                    message: format!("failed to read .env file: {}", e),
                })
            }
        }

        let file_settings = match config_file {
            Some(path) => {
                tracing::info!("Loading configuration file {}", path.display());
                FileConfig::from_file(path)?.into_settings()
            }
            None => HashMap::new(),
        };

        Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| file_settings.get(key).cloned())
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let mut settings = Settings {
            lookup,
            missing: Vec::new(),
        };

        let strategy = match settings.get("AZURE_SEARCH_STRATEGY") {
            Some(raw) if raw.trim().eq_ignore_ascii_case("keyword") => None,
            Some(raw) => Some(raw.parse::<SearchStrategy>().map_err(|reason| {
                AppError::InvalidConfigValueError {
                    field: "AZURE_SEARCH_STRATEGY".to_string(),
                    value: raw.clone(),
                    reason,
                }
            })?),
            None => None,
        };

        let search = SearchConfig {
            endpoint: settings.required("AZURE_SEARCH_ENDPOINT"),
            index_name: settings.required("AZURE_SEARCH_INDEX_NAME"),
            admin_key: settings.required("AZURE_SEARCH_ADMIN_KEY"),
            top_results: settings.parsed("AZURE_SEARCH_TOP_RESULTS", 3)?,
            api_version: settings.or("AZURE_SEARCH_API_VERSION", "2023-11-01"),
            strategy,
            vector_field: settings.or("AZURE_SEARCH_VECTOR_FIELD", "contentVector"),
            semantic_configuration: settings.or("AZURE_SEARCH_SEMANTIC_CONFIGURATION", "default"),
        };

        let openai = OpenAiConfig {
            endpoint: settings.required("AZURE_OPENAI_ENDPOINT"),
            api_key: settings.required_any(&["AZURE_OPENAI_API_KEY", "AZURE_API_KEY"]),
            deployment_name: settings.required("AZURE_OPENAI_DEPLOYMENT_NAME"),
            model: settings.required("AZURE_OPENAI_MODEL"),
            embeddings_deployment_name: settings.required("AZURE_OPENAI_EMBEDDINGS_DEPLOYMENT_NAME"),
            api_version: settings.required("OPENAI_API_VERSION"),
            api_type: settings.or("OPENAI_API_TYPE", "azure"),
            temperature: settings.parsed("AZURE_OPENAI_TEMPERATURE", 0.7)?,
            top_p: settings.parsed("AZURE_OPENAI_TOP_P", 0.87)?,
        };

        let defaults = HttpClientConfig::default();
        let http = HttpClientConfig {
            timeout_seconds: settings.parsed("HTTP_TIMEOUT_SECONDS", defaults.timeout_seconds)?,
            retry_attempts: settings.parsed("HTTP_RETRY_ATTEMPTS", defaults.retry_attempts)?,
            retry_delay_ms: settings.parsed("HTTP_RETRY_DELAY_MS", defaults.retry_delay_ms)?,
        };

        let port = match settings.get("FUNCTIONS_CUSTOMHANDLER_PORT") {
            Some(_) => settings.parsed("FUNCTIONS_CUSTOMHANDLER_PORT", DEFAULT_PORT)?,
            None => settings.parsed("PORT", DEFAULT_PORT)?,
        };

        let server = ServerConfig {
            port,
            app_version: settings.or("APP_VERSION", "v1.0.0"),
            chat_history_max_messages: settings.parsed("CHAT_HISTORY_MAX_MESSAGES", 0)?,
            chat_history_max_sessions: settings
                .parsed("CHAT_HISTORY_MAX_SESSIONS", DEFAULT_HISTORY_SESSIONS)?,
        };

        if !settings.missing.is_empty() {
            return Err(AppError::MissingConfigError {
                field: settings.missing.join(", "),
            });
        }

        Ok(Self {
            search,
            openai,
            http,
            server,
        })
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_url("AZURE_SEARCH_ENDPOINT", &self.search.endpoint)?;
        validate_non_empty_string("AZURE_SEARCH_INDEX_NAME", &self.search.index_name)?;
        validate_non_empty_string("AZURE_SEARCH_ADMIN_KEY", &self.search.admin_key)?;
        validate_positive_number("AZURE_SEARCH_TOP_RESULTS", self.search.top_results, 1)?;
        validate_range("AZURE_SEARCH_TOP_RESULTS", self.search.top_results, 1, 1000)?;

        validate_url("AZURE_OPENAI_ENDPOINT", &self.openai.endpoint)?;
        validate_non_empty_string("AZURE_OPENAI_API_KEY", &self.openai.api_key)?;
        validate_non_empty_string("AZURE_OPENAI_DEPLOYMENT_NAME", &self.openai.deployment_name)?;
        validate_non_empty_string("AZURE_OPENAI_MODEL", &self.openai.model)?;
        validate_non_empty_string(
            "AZURE_OPENAI_EMBEDDINGS_DEPLOYMENT_NAME",
            &self.openai.embeddings_deployment_name,
        )?;
        validate_non_empty_string("OPENAI_API_VERSION", &self.openai.api_version)?;
        validate_one_of("OPENAI_API_TYPE", &self.openai.api_type, &["azure"])?;
        validate_range("AZURE_OPENAI_TEMPERATURE", self.openai.temperature, 0.0, 2.0)?;
        validate_range("AZURE_OPENAI_TOP_P", self.openai.top_p, 0.0, 1.0)?;

        validate_range("HTTP_TIMEOUT_SECONDS", self.http.timeout_seconds, 1, 600)?;
        validate_range("HTTP_RETRY_ATTEMPTS", self.http.retry_attempts, 0, 10)?;
        validate_range("HTTP_RETRY_DELAY_MS", self.http.retry_delay_ms, 0, 60_000)?;

        if self.server.chat_history_max_messages > 0 {
            validate_range(
                "CHAT_HISTORY_MAX_SESSIONS",
                self.server.chat_history_max_sessions,
                1,
                1_000_000,
            )?;
        }

        if self.search.strategy.is_some() {
            validate_non_empty_string("AZURE_SEARCH_VECTOR_FIELD", &self.search.vector_field)?;
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }
}
