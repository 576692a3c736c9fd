//! helmfile.yaml parser
//!
//! Parses with tree-sitter so every release keeps the byte span of its version
//! value. The original text is never reserialized; the updater only inserts
//! comments at offsets recorded here.

use std::ops::Range;

use tracing::warn;

/// Error type for parsing operations
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to parse the file structure
    #[error("Failed to parse file: {0}")]
    ParseFailed(String),

    /// Invalid syntax in the file
    #[error("Invalid syntax: {0}")]
    InvalidSyntax(String),

    /// The document is YAML but not a key/value manifest
    #[error("Unexpected document shape: {0}")]
    UnexpectedShape(String),

    /// Tree-sitter related error
    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),
}

/// A `releases` item as written, before the extraction rule is applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseEntry {
    /// `chart` value with quotes removed
    pub chart: Option<String>,
    /// `version` value with quotes removed
    pub version: Option<String>,
    /// Byte range of the `version` value node (quotes included)
    pub version_span: Option<Range<usize>>,
    /// Line number of the version value (0-indexed)
    pub version_line: Option<usize>,
}

/// Parsed manifest: the untouched text plus the positions the updater needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelmfileDocument {
    content: String,
    entries: Vec<ReleaseEntry>,
    releases_keys: Vec<usize>,
}

impl HelmfileDocument {
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn entries(&self) -> &[ReleaseEntry] {
        &self.entries
    }

    /// Byte offsets of every top-level `releases` key, in document order
    pub fn releases_keys(&self) -> &[usize] {
        &self.releases_keys
    }
}

/// Parser for helmfile release manifests
pub struct HelmfileParser;

impl HelmfileParser {
    pub fn parse(&self, content: &str) -> Result<HelmfileDocument, ParseError> {
        let mut parser = tree_sitter::Parser::new();
        let language = tree_sitter_yaml::LANGUAGE;
        parser.set_language(&language.into()).map_err(|e| {
            warn!("Failed to set YAML language for tree-sitter: {}", e);
            ParseError::TreeSitter(e.to_string())
        })?;

        let tree = parser.parse(content, None).ok_or_else(|| {
            warn!("Failed to parse YAML content");
            ParseError::ParseFailed("Failed to parse YAML".to_string())
        })?;

        let root = tree.root_node();
        if root.has_error() {
            let line = first_error(root).map_or(0, |node| node.start_position().row);
            return Err(ParseError::InvalidSyntax(format!(
                "YAML error near line {}",
                line + 1
            )));
        }

        let mut document = HelmfileDocument {
            content: content.to_string(),
            entries: Vec::new(),
            releases_keys: Vec::new(),
        };

        let mut cursor = root.walk();
        for node in root.children(&mut cursor) {
            if node.kind() == "document" {
                self.collect_document(node, content, &mut document)?;
            }
        }

        Ok(document)
    }

    /// Extract releases from one YAML document
    ///
    /// YAML tree structure for a helmfile:
    /// ```text
    /// stream
    ///   document
    ///     block_node
    ///       block_mapping
    ///         block_mapping_pair          <- "releases: ..."
    ///           flow_node                 <- key: "releases"
    ///           block_node
    ///             block_sequence
    ///               block_sequence_item   <- "- chart: ..."
    ///                 block_node
    ///                   block_mapping
    ///                     block_mapping_pair    <- "chart: bitnami/nginx"
    ///                     block_mapping_pair    <- TARGET: "version: 15.0.0"
    /// ```
    fn collect_document(
        &self,
        node: tree_sitter::Node,
        content: &str,
        document: &mut HelmfileDocument,
    ) -> Result<(), ParseError> {
        let mut cursor = node.walk();
        let body = node
            .named_children(&mut cursor)
            .find(|child| child.kind() != "comment");

        // An empty document carries no releases
        let Some(body) = body else {
            return Ok(());
        };

        let Some(mapping) = unwrap_to(body, &["block_mapping", "flow_mapping"]) else {
            return Err(ParseError::UnexpectedShape(format!(
                "top level of line {} is not a mapping",
                body.start_position().row + 1
            )));
        };

        for pair in mapping_pairs(mapping) {
            let Some(key_node) = pair.child_by_field_name("key") else {
                continue;
            };
            if self.get_node_text(key_node, content) != "releases" {
                continue;
            }

            document.releases_keys.push(key_node.start_byte());

            let Some(value_node) = pair.child_by_field_name("value") else {
                continue;
            };
            let Some(sequence) = unwrap_to(value_node, &["block_sequence", "flow_sequence"])
            else {
                if is_null(value_node, content) {
                    continue;
                }
                return Err(ParseError::UnexpectedShape(format!(
                    "releases on line {} is not a sequence",
                    key_node.start_position().row + 1
                )));
            };

            for item in sequence_items(sequence) {
                match unwrap_to(item, &["block_mapping", "flow_mapping"]) {
                    Some(release) => document
                        .entries
                        .push(self.parse_release(release, content)),
                    None => warn!(
                        "Skipping non-mapping release on line {}",
                        item.start_position().row + 1
                    ),
                }
            }
        }

        Ok(())
    }

    /// Parse a single release mapping (chart + version + anything else)
    fn parse_release(&self, node: tree_sitter::Node, content: &str) -> ReleaseEntry {
        let mut entry = ReleaseEntry {
            chart: None,
            version: None,
            version_span: None,
            version_line: None,
        };

        for pair in mapping_pairs(node) {
            let (Some(key_node), Some(value_node)) = (
                pair.child_by_field_name("key"),
                pair.child_by_field_name("value"),
            ) else {
                continue;
            };

            let key = self.get_node_text(key_node, content);
            if matches!(key.as_str(), "chart" | "version")
                && unwrap_to(value_node, SCALAR_KINDS).is_none()
            {
                warn!(
                    "Ignoring non-scalar {} on line {}",
                    key,
                    value_node.start_position().row + 1
                );
                continue;
            }

            match key.as_str() {
                "chart" => entry.chart = Some(self.get_node_text(value_node, content)),
                "version" => {
                    entry.version = Some(self.get_node_text(value_node, content));
                    entry.version_span = Some(value_node.byte_range());
                    entry.version_line = Some(value_node.start_position().row);
                }
                _ => {}
            }
        }

        entry
    }

    /// Get text content of a node, removing quotes if present
    fn get_node_text(&self, node: tree_sitter::Node, content: &str) -> String {
        let text = &content[node.byte_range()];
        text.trim()
            .trim_start_matches('"')
            .trim_end_matches('"')
            .trim_start_matches('\'')
            .trim_end_matches('\'')
            .to_string()
    }
}

/// Single-line scalar node kinds; block scalars (`|`, `>`) are not accepted
const SCALAR_KINDS: &[&str] = &["plain_scalar", "double_quote_scalar", "single_quote_scalar"];

/// Descend through `block_node`/`flow_node` wrappers (and any anchor or tag)
/// to the first child of one of the given kinds.
fn unwrap_to<'tree>(
    node: tree_sitter::Node<'tree>,
    kinds: &[&str],
) -> Option<tree_sitter::Node<'tree>> {
    if kinds.contains(&node.kind()) {
        return Some(node);
    }
    if !matches!(node.kind(), "block_node" | "flow_node") {
        return None;
    }
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|child| kinds.contains(&child.kind()));
    found
}

fn mapping_pairs(mapping: tree_sitter::Node<'_>) -> Vec<tree_sitter::Node<'_>> {
    let mut cursor = mapping.walk();
    mapping
        .named_children(&mut cursor)
        .filter(|child| matches!(child.kind(), "block_mapping_pair" | "flow_pair"))
        .collect()
}

fn sequence_items(sequence: tree_sitter::Node<'_>) -> Vec<tree_sitter::Node<'_>> {
    let mut cursor = sequence.walk();
    let children: Vec<_> = sequence.named_children(&mut cursor).collect();

    children
        .into_iter()
        .filter_map(|child| match child.kind() {
            "block_sequence_item" => {
                let mut inner = child.walk();
                let item = child
                    .named_children(&mut inner)
                    .find(|n| n.kind() != "comment");
                item
            }
            "flow_node" => Some(child),
            _ => None,
        })
        .collect()
}

fn is_null(node: tree_sitter::Node, content: &str) -> bool {
    matches!(
        content[node.byte_range()].trim(),
        "" | "~" | "null" | "Null" | "NULL"
    )
}

fn first_error(node: tree_sitter::Node<'_>) -> Option<tree_sitter::Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}
