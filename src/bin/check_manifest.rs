use anyhow::{Context, Result};
use clap::Parser;
use sinacor_gpt::config::cli::ManifestArgs;
use sinacor_gpt::utils::logger::{self, LogFormat};
use sinacor_gpt::Manifest;

fn main() -> Result<()> {
    let args = ManifestArgs::parse();
    logger::init_logger(LogFormat::Compact, args.verbose);

    let mut total_issues = 0;

    for path in &args.paths {
        let manifest = Manifest::from_file(path)
            .with_context(|| format!("Failed to read manifest '{}'", path.display()))?;
        tracing::debug!(
            "Parsed {} lines from {}",
            manifest.lines().len(),
            path.display()
        );

        if args.list {
            for requirement in manifest.requirements() {
                println!("{}", requirement);
            }
        }

        let issues = manifest.validate();
        if issues.is_empty() {
            println!(
                "✅ {}: {} pinned packages",
                path.display(),
                manifest.requirements().count()
            );
        } else {
            for issue in &issues {
                eprintln!("❌ {}: {}", path.display(), issue);
            }
            total_issues += issues.len();
        }
    }

    if total_issues > 0 {
        tracing::error!("{} manifest issue(s) found", total_issues);
        std::process::exit(1);
    }

    Ok(())
}
