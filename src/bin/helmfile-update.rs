//! Annotate stale chart versions in a single helmfile manifest

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

use helmfile_audit::commands::{build_reconciler, update};
use helmfile_audit::config::{self, AuditConfig};
use helmfile_audit::logging;

#[derive(Parser)]
#[command(name = "helmfile-update")]
#[command(version, about = "Annotate stale chart versions in a helmfile manifest")]
struct Cli {
    /// Manifest to annotate in place
    path: PathBuf,
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
    let _guard = logging::init(&config.logging, &config::data_dir(), false)?;

    let reconciler = build_reconciler(&config, None)?;

    let summary = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(update::run(&cli.path, &reconciler))?;

    println!("{}", summary);
    Ok(())
}
