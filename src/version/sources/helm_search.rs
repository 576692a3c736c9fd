//! Local package index lookup via `helm search repo`

use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::SourceKind;
use crate::version::error::SourceError;
use crate::version::source::VersionSource;
use crate::version::types::VersionCandidate;

/// Captured result of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external commands; swapped for a mock in tests
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<CommandOutput>;
}

/// [`CommandRunner`] spawning real processes through tokio
pub struct ProcessRunner;

#[async_trait::async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<CommandOutput> {
        let output = tokio::process::Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// One record of `helm search repo -o json`
#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    version: String,
}

/// Version source backed by the locally configured helm repositories
pub struct HelmSearchSource {
    helm_binary: String,
    runner: Arc<dyn CommandRunner>,
}

impl HelmSearchSource {
    pub fn new(helm_binary: &str) -> Self {
        Self::with_runner(helm_binary, Arc::new(ProcessRunner))
    }

    pub fn with_runner(helm_binary: &str, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            helm_binary: helm_binary.to_string(),
            runner,
        }
    }

    fn search_args(chart: &str) -> Vec<String> {
        ["search", "repo", chart, "--output", "json"]
            .into_iter()
            .map(String::from)
            .collect()
    }
}

#[async_trait::async_trait]
impl VersionSource for HelmSearchSource {
    fn kind(&self) -> SourceKind {
        SourceKind::HelmSearch
    }

    async fn query(&self, chart: &str) -> Result<Vec<VersionCandidate>, SourceError> {
        let args = Self::search_args(chart);
        debug!("Running {} {}", self.helm_binary, args.join(" "));

        let output = self.runner.run(&self.helm_binary, &args).await?;

        if !output.success {
            warn!("helm search failed for {}: {}", chart, output.stderr.trim());
            return Err(SourceError::Unavailable(output.stderr.trim().to_string()));
        }

        Ok(parse_search_output(chart, &output.stdout))
    }
}

/// First search hit becomes the single candidate; anything unusable gives none
fn parse_search_output(chart: &str, stdout: &str) -> Vec<VersionCandidate> {
    if stdout.trim().is_empty() {
        return Vec::new();
    }

    let hits: Vec<SearchHit> = match serde_json::from_str(stdout) {
        Ok(hits) => hits,
        Err(e) => {
            warn!("Failed to parse helm search output for {}: {}", chart, e);
            return Vec::new();
        }
    };

    hits.into_iter()
        .next()
        .map(|hit| hit.version.trim().to_string())
        .filter(|version| !version.is_empty())
        .map(|version| vec![VersionCandidate::new(version)])
        .unwrap_or_default()
}
