//! Table rendering for terminal and HTML output

use colored::Colorize;

use crate::report::table::{AGE_LABEL, Cell, ReportTable};

/// Output format of the comparison report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// GitHub-flavoured pipe table with ANSI highlighting
    #[default]
    Text,
    /// Standalone HTML document with inline styles
    Html,
}

/// Decorates the text of a cell marked as different
pub trait Highlighter {
    fn highlight(&self, text: &str) -> String;
}

/// Red ANSI foreground
pub struct AnsiHighlighter;

impl Highlighter for AnsiHighlighter {
    fn highlight(&self, text: &str) -> String {
        text.red().to_string()
    }
}

/// Inline-styled span; expects already escaped text
pub struct HtmlHighlighter;

impl Highlighter for HtmlHighlighter {
    fn highlight(&self, text: &str) -> String {
        format!(r#"<span style="color:#d73a49;font-weight:bold">{text}</span>"#)
    }
}

pub fn render(table: &ReportTable, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => render_text(table, &AnsiHighlighter),
        OutputFormat::Html => render_html(table, &HtmlHighlighter),
    }
}

/// Render as a pipe table; column widths ignore highlight escapes
pub fn render_text(table: &ReportTable, highlighter: &dyn Highlighter) -> String {
    let body = body_rows(table);

    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.text.chars().count());
        }
    }

    let mut out = String::new();
    let headers: Vec<Cell> = table
        .headers
        .iter()
        .map(|h| Cell {
            text: h.clone(),
            different: false,
        })
        .collect();
    push_text_row(&mut out, &headers, &widths, highlighter);

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
    out.push_str(&format!("|{}|\n", separator.join("|")));

    for row in &body {
        push_text_row(&mut out, row, &widths, highlighter);
    }
    out
}

fn push_text_row(out: &mut String, cells: &[Cell], widths: &[usize], highlighter: &dyn Highlighter) {
    let rendered: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let padding = " ".repeat(width.saturating_sub(cell.text.chars().count()));
            let text = if cell.different {
                highlighter.highlight(&cell.text)
            } else {
                cell.text.clone()
            };
            format!(" {text}{padding} ")
        })
        .collect();
    out.push_str(&format!("|{}|\n", rendered.join("|")));
}

/// Render as a standalone HTML document
pub fn render_html(table: &ReportTable, highlighter: &dyn Highlighter) -> String {
    let mut out = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Chart versions</title>\n</head>\n<body>\n<table>\n<thead>\n<tr>",
    );
    for header in &table.headers {
        out.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");

    for row in body_rows(table) {
        out.push_str("<tr>");
        for cell in row {
            let text = escape_html(&cell.text);
            let text = if cell.different {
                highlighter.highlight(&text)
            } else {
                text
            };
            out.push_str(&format!("<td>{text}</td>"));
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    out
}

/// Age row (if any) followed by one row per chart, all as plain cells
fn body_rows(table: &ReportTable) -> Vec<Vec<Cell>> {
    let plain = |text: &str| Cell {
        text: text.to_string(),
        different: false,
    };

    let age = table.age_row.iter().map(|ages| {
        [plain(AGE_LABEL), plain("")]
            .into_iter()
            .chain(ages.iter().map(|a| plain(a.as_str())))
            .collect::<Vec<_>>()
    });

    let charts = table.rows.iter().map(|row| {
        [plain(row.chart.as_str()), row.latest.clone()]
            .into_iter()
            .chain(row.cells.iter().cloned())
            .collect::<Vec<_>>()
    });

    age.chain(charts).collect()
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::table::ReportRow;

    struct NoHighlight;

    impl Highlighter for NoHighlight {
        fn highlight(&self, text: &str) -> String {
            text.to_string()
        }
    }

    fn sample_table() -> ReportTable {
        ReportTable {
            headers: vec![
                "Chart".to_string(),
                "Latest Version".to_string(),
                "A".to_string(),
                "B".to_string(),
            ],
            age_row: None,
            rows: vec![ReportRow {
                chart: "nginx".to_string(),
                latest: Cell {
                    text: "1.3.0".to_string(),
                    different: false,
                },
                cells: vec![
                    Cell {
                        text: "1.2.0".to_string(),
                        different: true,
                    },
                    Cell {
                        text: "1.3.0".to_string(),
                        different: false,
                    },
                ],
            }],
        }
    }

    struct MarkHighlighter;

    impl Highlighter for MarkHighlighter {
        fn highlight(&self, text: &str) -> String {
            format!("{text}(marked)")
        }
    }

    #[test]
    fn render_text_produces_pipe_table() {
        let output = render_text(&sample_table(), &NoHighlight);

        assert_eq!(
            output,
            "| Chart | Latest Version | A     | B     |\n\
             |-------|----------------|-------|-------|\n\
             | nginx | 1.3.0          | 1.2.0 | 1.3.0 |\n"
        );
    }

    #[test]
    fn render_text_applies_highlighter_to_different_cells_only() {
        let output = render_text(&sample_table(), &MarkHighlighter);

        let last_line = output.lines().last().unwrap();
        assert_eq!(last_line, "| nginx | 1.3.0          | 1.2.0(marked) | 1.3.0 |");
    }

    #[test]
    fn ansi_highlighter_wraps_text_in_red() {
        colored::control::set_override(true);

        let highlighted = AnsiHighlighter.highlight("1.2.0");

        assert_eq!(highlighted, "\u{1b}[31m1.2.0\u{1b}[0m");
    }

    #[test]
    fn render_text_puts_age_row_first() {
        let mut table = sample_table();
        table.age_row = Some(vec!["2 days ago".to_string(), "-".to_string()]);

        let output = render_text(&table, &NoHighlight);

        let lines: Vec<_> = output.lines().collect();
        assert!(lines[2].starts_with("| Last modified |"));
        assert!(lines[2].contains("2 days ago"));
        assert!(lines[3].starts_with("| nginx "));
    }

    #[test]
    fn render_html_escapes_and_styles_cells() {
        let mut table = sample_table();
        table.rows[0].chart = "a<b>".to_string();

        let output = render_html(&table, &HtmlHighlighter);

        assert!(output.starts_with("<!DOCTYPE html>"));
        assert!(output.contains("<th>Latest Version</th>"));
        assert!(output.contains("<td>a&lt;b&gt;</td>"));
        assert!(output.contains(
            r#"<td><span style="color:#d73a49;font-weight:bold">1.2.0</span></td>"#
        ));
        assert!(output.contains("<td>1.3.0</td>"));
    }
}
