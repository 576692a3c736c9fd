//! Version lookup and reconciliation layer
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌──────────────┐
//! │ VersionSource│────▶│  Selector   │────▶│  Reconciler  │
//! │   (query)    │     │ (latest)    │     │ (resolutions)│
//! └──────────────┘     └─────────────┘     └──────────────┘
//!        │
//!        ▼
//! ┌──────────────────────────┐
//! │ Sources (Artifact Hub,   │
//! │  helm search repo)       │
//! └──────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`source`]: Source trait for fetching candidate versions of a chart
//! - [`sources`]: Concrete sources (Artifact Hub API, local helm index)
//! - [`selector`]: Latest stable version selection by numeric tuple
//! - [`resolution`]: Declared vs. latest result per chart and manifest
//! - [`engine`]: Concurrent, deduplicated reconciliation across manifests
//! - [`error`]: Error types for source lookups
//! - [`types`]: Common types like `VersionCandidate`

pub mod engine;
pub mod error;
pub mod resolution;
pub mod selector;
pub mod source;
pub mod sources;
pub mod types;

pub use engine::{LookupOptions, Reconciler};
pub use resolution::{DeclaredVersion, Resolution};
pub use selector::select_latest;
pub use source::VersionSource;
pub use types::VersionCandidate;
