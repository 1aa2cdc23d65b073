use clap::Parser;
use sinacor_gpt::config::cli::ServeArgs;
use sinacor_gpt::utils::error::{AppError, ErrorSeverity};
use sinacor_gpt::utils::logger::{self, LogFormat};
use sinacor_gpt::utils::validation::Validate;
use sinacor_gpt::{AppConfig, AppState, HttpServer};

fn report_and_exit(e: &AppError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() {
    let args = ServeArgs::parse();

    logger::init_logger(LogFormat::detect(args.json_logs), args.verbose);

    tracing::info!("Starting sinacor-gpt {}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &args.config {
        tracing::info!("📁 Loading configuration from: {}", path.display());
    }

    let mut config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => report_and_exit(&e),
    };

    if let Some(port) = args.port {
        config.server.port = port;
    }

    if let Err(e) = config.validate() {
        report_and_exit(&e);
    }

    if args.check {
        println!("✅ Configuration is valid");
        println!("   search index: {}", config.search.index_name);
        println!("   chat deployment: {}", config.openai.deployment_name);
        println!("   embeddings deployment: {}", config.openai.embeddings_deployment_name);
        return;
    }

    let bind_address = format!("{}:{}", args.host, config.server.port);
    let state = AppState::from_config(&config);

    if let Err(e) = HttpServer::new(bind_address, state).serve().await {
        report_and_exit(&e);
    }
}
