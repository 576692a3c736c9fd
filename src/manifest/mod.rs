//! Manifest layer
//! - parser.rs: tree-sitter helmfile parser keeping byte positions
//! - reader.rs: file loading and the NotFound / Malformed taxonomy
//! - types.rs: Release, ManifestSource, chart normalization
//! - discover.rs: default `*/system/helmfile.yaml` discovery

pub mod discover;
pub mod parser;
pub mod reader;
pub mod types;

pub use discover::{discover_manifests, is_yaml_path};
pub use parser::{HelmfileDocument, HelmfileParser, ParseError, ReleaseEntry};
pub use reader::{ManifestError, parse_manifest};
pub use types::{ManifestSource, Release, normalize_chart};
