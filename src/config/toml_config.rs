use crate::utils::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Optional settings file. Every value is a fallback for the environment
/// variable of the same meaning, which always wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    pub search: Option<SearchSection>,
    pub openai: Option<OpenAiSection>,
    pub http: Option<HttpSection>,
    pub server: Option<ServerSection>,
    pub environment: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchSection {
    pub endpoint: Option<String>,
    pub index_name: Option<String>,
    pub admin_key: Option<String>,
    pub top_results: Option<usize>,
    pub api_version: Option<String>,
    pub strategy: Option<String>,
    pub vector_field: Option<String>,
    pub semantic_configuration: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenAiSection {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub deployment_name: Option<String>,
    pub model: Option<String>,
    pub embeddings_deployment_name: Option<String>,
    pub api_version: Option<String>,
    pub api_type: Option<String>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpSection {
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub port: Option<u16>,
    pub app_version: Option<String>,
    pub chat_history_max_messages: Option<usize>,
    pub chat_history_max_sessions: Option<usize>,
}

impl FileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AppError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AppError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AppError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Flattens the file into environment-variable names so it can back
    /// the same lookup as the process environment.
    pub fn into_settings(self) -> HashMap<String, String> {
        let mut settings = HashMap::new();

        fn put<T: ToString>(settings: &mut HashMap<String, String>, key: &str, value: Option<T>) {
            if let Some(value) = value {
                settings.insert(key.to_string(), value.to_string());
            }
        }

        if let Some(environment) = self.environment {
            settings.extend(environment);
        }

        if let Some(search) = self.search {
            put(&mut settings, "AZURE_SEARCH_ENDPOINT", search.endpoint);
            put(&mut settings, "AZURE_SEARCH_INDEX_NAME", search.index_name);
            put(&mut settings, "AZURE_SEARCH_ADMIN_KEY", search.admin_key);
            put(&mut settings, "AZURE_SEARCH_TOP_RESULTS", search.top_results);
            put(&mut settings, "AZURE_SEARCH_API_VERSION", search.api_version);
            put(&mut settings, "AZURE_SEARCH_STRATEGY", search.strategy);
            put(&mut settings, "AZURE_SEARCH_VECTOR_FIELD", search.vector_field);
            put(
                &mut settings,
                "AZURE_SEARCH_SEMANTIC_CONFIGURATION",
                search.semantic_configuration,
            );
        }

        if let Some(openai) = self.openai {
            put(&mut settings, "AZURE_OPENAI_ENDPOINT", openai.endpoint);
            put(&mut settings, "AZURE_OPENAI_API_KEY", openai.api_key);
            put(&mut settings, "AZURE_OPENAI_DEPLOYMENT_NAME", openai.deployment_name);
            put(&mut settings, "AZURE_OPENAI_MODEL", openai.model);
            put(
                &mut settings,
                "AZURE_OPENAI_EMBEDDINGS_DEPLOYMENT_NAME",
                openai.embeddings_deployment_name,
            );
            put(&mut settings, "OPENAI_API_VERSION", openai.api_version);
            put(&mut settings, "OPENAI_API_TYPE", openai.api_type);
            put(&mut settings, "AZURE_OPENAI_TEMPERATURE", openai.temperature);
            put(&mut settings, "AZURE_OPENAI_TOP_P", openai.top_p);
        }

        if let Some(http) = self.http {
            put(&mut settings, "HTTP_TIMEOUT_SECONDS", http.timeout_seconds);
            put(&mut settings, "HTTP_RETRY_ATTEMPTS", http.retry_attempts);
            put(&mut settings, "HTTP_RETRY_DELAY_MS", http.retry_delay_ms);
        }

        if let Some(server) = self.server {
            put(&mut settings, "PORT", server.port);
            put(&mut settings, "APP_VERSION", server.app_version);
            put(
                &mut settings,
                "CHAT_HISTORY_MAX_MESSAGES",
                server.chat_history_max_messages,
            );
            put(
                &mut settings,
                "CHAT_HISTORY_MAX_SESSIONS",
                server.chat_history_max_sessions,
            );
        }

        settings
    }
}
