//! jb - jsonnet package manager
//!
//! Usage:
//!   jb install [refs...]    # Add references and install everything
//!   jb update [refs...]     # Re-resolve locked revisions

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jbundle_core::commands::{InstallCommand, InstallReport, UpdateCommand};
use jbundle_core::config::Settings;
use jbundle_core::context::ProjectContext;

#[derive(Parser)]
#[command(name = "jb")]
#[command(about = "Package manager for jsonnet", long_about = None)]
struct Cli {
    /// Directory dependencies are installed into
    #[arg(long = "jsonnetpkg-home", global = true)]
    install_dir: Option<PathBuf>,

    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install new dependencies. Existing ones are silently skipped
    Install {
        /// Package references, e.g. github.com/grafana/jsonnet-libs/grafana-builder@master
        references: Vec<String>,
    },

    /// Update all or specific dependencies
    Update {
        /// Package references to update; all dependencies when empty
        references: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable summary
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jbundle_core=info,jb=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let ctx = build_context(&cli)?;

    match cli.command {
        Commands::Install { references } => {
            let report = InstallCommand::new(&ctx).execute(&references)?;
            print_report(&report, cli.format)?;
        }
        Commands::Update { references } => {
            let report = UpdateCommand::new(&ctx).execute(&references)?;
            print_report(&report, cli.format)?;
        }
    }

    Ok(())
}

fn build_context(cli: &Cli) -> Result<ProjectContext> {
    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::load_default()?,
    };
    let project_root =
        std::env::current_dir().context("Failed to determine the current directory")?;

    let mut ctx = ProjectContext::new(project_root, settings);
    if let Some(install_dir) = &cli.install_dir {
        ctx = ctx.with_install_dir(install_dir);
    }
    Ok(ctx)
}

fn print_report(report: &InstallReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            for name in &report.requested {
                let version = report
                    .lock
                    .get(name)
                    .map(|dep| dep.version.as_str())
                    .unwrap_or_default();
                println!("✓ {} {}", name, version);
            }
            println!("{} dependencies locked", report.lock.len());
            if report.lock_written {
                println!("  Updated jsonnetfile.lock.json");
            }
            if report.manifest_written {
                println!("  Updated jsonnetfile.json");
            }
            for link in &report.links {
                println!("  Linked {}", link.display());
            }
        }
        OutputFormat::Json => {
            let dependencies: Vec<_> = report
                .lock
                .iter()
                .map(|dep| {
                    serde_json::json!({
                        "name": dep.name(),
                        "version": dep.version,
                        "sum": dep.sum,
                    })
                })
                .collect();
            let output = serde_json::json!({
                "requested": report.requested,
                "dependencies": dependencies,
                "manifestWritten": report.manifest_written,
                "lockWritten": report.lock_written,
                "links": report.links,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_install_references() {
        let cli = Cli::parse_from([
            "jb",
            "install",
            "github.com/grafana/jsonnet-libs/grafana-builder",
            "../mylib",
        ]);
        match cli.command {
            Commands::Install { references } => assert_eq!(references.len(), 2),
            _ => panic!("expected install"),
        }
    }

    #[test]
    fn parses_global_install_dir() {
        let cli = Cli::parse_from(["jb", "update", "--jsonnetpkg-home", "lib"]);
        assert_eq!(cli.install_dir, Some(PathBuf::from("lib")));
        assert!(matches!(cli.command, Commands::Update { ref references } if references.is_empty()));
    }
}
