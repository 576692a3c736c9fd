//! Orchestration behind the two binaries

pub mod compare;
pub mod update;

use std::sync::Arc;

use anyhow::Context;

use crate::config::{AuditConfig, SourceKind};
use crate::version::sources::create_source;
use crate::version::{LookupOptions, Reconciler, VersionSource};

/// Build a reconciler from the configuration, with an optional source override
pub fn build_reconciler(config: &AuditConfig, kind: Option<SourceKind>) -> anyhow::Result<Reconciler> {
    let mut source_config = config.source.clone();
    if let Some(kind) = kind {
        source_config.kind = kind;
    }

    let source: Arc<dyn VersionSource> =
        create_source(&source_config).context("Failed to create version source")?;
    Ok(Reconciler::new(source, LookupOptions::from(&config.lookup)))
}
