//! Multi-manifest comparison report
//!
//! - [`table`]: builds the chart x manifest table from resolutions
//! - [`render`]: turns a table into terminal or HTML output

pub mod render;
pub mod table;

pub use render::{Highlighter, OutputFormat, render};
pub use table::{PLACEHOLDER, ReportTable, build_table};
