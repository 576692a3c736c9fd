//! Version source implementations

pub mod artifact_hub;
pub mod helm_search;

use std::sync::Arc;

pub use artifact_hub::ArtifactHubSource;
pub use helm_search::{CommandOutput, CommandRunner, HelmSearchSource, ProcessRunner};

use crate::config::{SourceConfig, SourceKind};
use crate::version::error::SourceError;
use crate::version::source::VersionSource;

/// Create the version source selected by the configuration
pub fn create_source(config: &SourceConfig) -> Result<Arc<dyn VersionSource>, SourceError> {
    Ok(match config.kind {
        SourceKind::ArtifactHub => Arc::new(ArtifactHubSource::new(&config.api_url_template)?),
        SourceKind::HelmSearch => Arc::new(HelmSearchSource::new(&config.helm_binary)),
    })
}
