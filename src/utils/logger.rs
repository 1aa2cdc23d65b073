use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable single lines for terminals.
    Compact,
    /// One JSON object per event; the Functions host forwards stdout to Application Insights.
    Json,
}

impl LogFormat {
    /// JSON when asked for or when running under the Functions host.
    pub fn detect(json_requested: bool) -> Self {
        if json_requested || running_in_functions_host() {
            LogFormat::Json
        } else {
            LogFormat::Compact
        }
    }
}

/// Directives used when `RUST_LOG` is unset.
pub fn default_filter(format: LogFormat, verbose: bool) -> &'static str {
    match (format, verbose) {
        (_, true) => "sinacor_gpt=debug,tower_http=debug,info",
        (LogFormat::Compact, false) => "sinacor_gpt=info",
        (LogFormat::Json, false) => "sinacor_gpt=info,tower_http=info",
    }
}

pub fn init_logger(format: LogFormat, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(format, verbose)));

    let layer = tracing_subscriber::fmt::layer()
        .with_target(format == LogFormat::Json)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Compact => registry.with(layer.compact()).init(),
        LogFormat::Json => registry.with(layer.json()).init(),
    }
}

/// True when the process was launched by the Azure Functions host.
pub fn running_in_functions_host() -> bool {
    std::env::var_os("FUNCTIONS_CUSTOMHANDLER_PORT").is_some()
        || std::env::var_os("FUNCTIONS_WORKER_RUNTIME").is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(LogFormat::Compact, false), "sinacor_gpt=info");
        assert_eq!(
            default_filter(LogFormat::Json, false),
            "sinacor_gpt=info,tower_http=info"
        );
        assert_eq!(
            default_filter(LogFormat::Compact, true),
            default_filter(LogFormat::Json, true)
        );
        assert!(default_filter(LogFormat::Json, true).contains("sinacor_gpt=debug"));
    }

    #[test]
    fn test_default_filters_parse() {
        for format in [LogFormat::Compact, LogFormat::Json] {
            for verbose in [false, true] {
                assert!(EnvFilter::try_new(default_filter(format, verbose)).is_ok());
            }
        }
    }

    #[test]
    fn test_json_flag_forces_json() {
        assert_eq!(LogFormat::detect(true), LogFormat::Json);
    }
}
