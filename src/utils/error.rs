use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("{service} returned HTTP {status}: {body}")]
    UpstreamError {
        service: String,
        status: u16,
        body: String,
    },

    #[error("Unexpected response from {service}: {message}")]
    UpstreamProtocolError { service: String, message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Manifest error: {message}")]
    ManifestError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Upstream,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::ConfigError { .. }
            | AppError::MissingConfigError { .. }
            | AppError::InvalidConfigValueError { .. }
            | AppError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            AppError::HttpError(_) => ErrorCategory::Network,
            AppError::UpstreamError { .. } | AppError::UpstreamProtocolError { .. } => {
                ErrorCategory::Upstream
            }
            AppError::SerializationError(_)
            | AppError::ValidationError { .. }
            | AppError::ManifestError { .. } => ErrorCategory::Data,
            AppError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::ValidationError { .. } | AppError::ManifestError { .. } => {
                ErrorSeverity::Low
            }
            AppError::HttpError(_) => ErrorSeverity::Medium,
            AppError::UpstreamError { status, .. } if *status == 429 || *status >= 500 => {
                ErrorSeverity::Medium
            }
            AppError::UpstreamError { .. }
            | AppError::UpstreamProtocolError { .. }
            | AppError::SerializationError(_) => ErrorSeverity::High,
            AppError::ConfigError { .. }
            | AppError::MissingConfigError { .. }
            | AppError::InvalidConfigValueError { .. }
            | AppError::ConfigValidationError { .. }
            | AppError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// Whether repeating the same upstream call may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::HttpError(e) => e.is_timeout() || e.is_connect(),
            AppError::UpstreamError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::MissingConfigError { field } => {
                format!("Required setting {} is not defined", field)
            }
            AppError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting {} is invalid: {}", field, reason)
            }
            AppError::UpstreamError {
                service, status, ..
            } => format!("{} rejected the request (HTTP {})", service, status),
            AppError::HttpError(_) => "Could not reach an upstream service".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the environment variables, the .env file and the TOML config file"
            }
            ErrorCategory::Network => "Check network connectivity to the Azure endpoints",
            ErrorCategory::Upstream => {
                "Check the Azure deployment names, API keys and service quotas"
            }
            ErrorCategory::Data => "Check the input data format",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
