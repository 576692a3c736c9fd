//! Version source trait for looking up the versions of a chart

#[cfg(test)]
use mockall::automock;

use crate::config::SourceKind;
use crate::version::error::SourceError;
use crate::version::types::VersionCandidate;

/// Trait for querying an external source for the versions of a chart
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait VersionSource: Send + Sync {
    /// Returns the kind of source this implementation wraps
    fn kind(&self) -> SourceKind;

    /// Fetches the candidate versions for a chart
    ///
    /// # Arguments
    /// * `chart` - Normalized chart key (e.g., "bitnami/nginx")
    ///
    /// # Returns
    /// * `Ok(Vec<VersionCandidate>)` - Candidates in source order; empty when the
    ///   source answered with nothing usable
    /// * `Err(SourceError)` - If the source could not be reached or refused the query
    async fn query(&self, chart: &str) -> Result<Vec<VersionCandidate>, SourceError>;
}
