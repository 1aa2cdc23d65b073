use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "sinacor-gpt")]
#[command(about = "Chat and embeddings API grounded on Azure AI Search and Azure OpenAI")]
pub struct ServeArgs {
    /// Optional TOML settings file; environment variables take precedence
    #[arg(short, long, env = "SINACOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port override (defaults to FUNCTIONS_CUSTOMHANDLER_PORT, PORT, then 7071)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Emit JSON logs (always on under the Functions host)
    #[arg(long)]
    pub json_logs: bool,

    /// Validate configuration and exit
    #[arg(long)]
    pub check: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "check-manifest")]
#[command(about = "Validate a pinned dependency manifest (name==version per line)")]
pub struct ManifestArgs {
    /// Manifest files to check
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Print every pinned requirement
    #[arg(long)]
    pub list: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults() {
        let args = ServeArgs::parse_from(["sinacor-gpt"]);
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.port, None);
        assert!(!args.check);
    }

    #[test]
    fn test_manifest_args_require_path() {
        assert!(ManifestArgs::try_parse_from(["check-manifest"]).is_err());
        let args = ManifestArgs::try_parse_from(["check-manifest", "requirements.txt", "--list"]).unwrap();
        assert_eq!(args.paths.len(), 1);
        assert!(args.list);
    }
}
