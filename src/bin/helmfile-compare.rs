//! Compare chart versions across helmfile manifests

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use colored::Colorize;

use helmfile_audit::commands::build_reconciler;
use helmfile_audit::commands::compare::{self, CompareOptions};
use helmfile_audit::config::{self, AuditConfig, SourceKind};
use helmfile_audit::logging;
use helmfile_audit::manifest::discover_manifests;
use helmfile_audit::report::OutputFormat;

#[derive(Parser)]
#[command(name = "helmfile-compare")]
#[command(version, about = "Compare chart versions across helmfile manifests")]
struct Cli {
    /// Manifests to compare (default: */system/helmfile.yaml)
    paths: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Version source, overriding the config file
    #[arg(long, value_enum)]
    source: Option<SourceKind>,

    /// Add a row with each manifest's last-modified age
    #[arg(long)]
    age: bool,

    /// Mirror debug logs to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {:#}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AuditConfig::load()?;
    let _guard = logging::init(&config.logging, &config::data_dir(), cli.verbose)?;

    let paths = if cli.paths.is_empty() {
        discover_manifests(Path::new(".")).context("Failed to discover manifests")?
    } else {
        cli.paths
    };

    let reconciler = build_reconciler(&config, cli.source)?;
    let options = CompareOptions {
        format: cli.format,
        show_age: cli.age,
    };

    let report = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(compare::run(&paths, &reconciler, &options))?;

    println!("{}", report);
    Ok(())
}
