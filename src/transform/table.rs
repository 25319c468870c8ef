//! Pipe tables.
//!
//! A run of two or more lines that start and end with `|` is a table: the
//! first row is the header, the second row sets column alignment, the rest
//! are data rows. Row lengths are not reconciled with the header.

use tracing::debug;

use super::{match_final_newline, split_block_prefix, split_lines, PreformattedGuard};
use crate::error::{Error, Result};

/// Column text alignment taken from the alignment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    Left,
    /// Also used when a cell has no colons or the column has no alignment cell.
    #[default]
    Center,
    Right,
}

impl Alignment {
    /// Reads an alignment cell such as `:--`, `:-:` or `--:`.
    ///
    /// A cell without colons is centered, unlike most markdown dialects
    /// which left-align it.
    pub fn from_cell(cell: &str) -> Self {
        let cell = cell.trim();
        match (cell.starts_with(':'), cell.ends_with(':')) {
            (true, true) => Alignment::Center,
            (true, false) => Alignment::Left,
            (false, true) => Alignment::Right,
            (false, false) => Alignment::Center,
        }
    }

    /// CSS `text-align` value.
    pub fn as_css(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

/// A parsed pipe table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub alignments: Vec<Alignment>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Parses a block of table lines.
    pub fn parse(lines: &[&str]) -> Result<Self> {
        let [header, alignment, data @ ..] = lines else {
            return Err(Error::fault(
                "table",
                format!("expected header and alignment rows, got {} line(s)", lines.len()),
            ));
        };

        Ok(Self {
            header: split_row(header),
            alignments: split_row(alignment)
                .iter()
                .map(|cell| Alignment::from_cell(cell))
                .collect(),
            rows: data.iter().map(|line| split_row(line)).collect(),
        })
    }

    /// Alignment for a column; columns past the alignment row are centered.
    pub fn alignment(&self, column: usize) -> Alignment {
        self.alignments.get(column).copied().unwrap_or_default()
    }

    /// Renders the table as a single line of HTML.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table><thead><tr>");
        for (i, cell) in self.header.iter().enumerate() {
            html.push_str(&format!(
                r#"<th style="text-align: {}">{}</th>"#,
                self.alignment(i).as_css(),
                cell
            ));
        }
        html.push_str("</tr></thead><tbody>");

        for row in &self.rows {
            html.push_str("<tr>");
            for (i, cell) in row.iter().enumerate() {
                html.push_str(&format!(
                    r#"<td style="text-align: {}">{}</td>"#,
                    self.alignment(i).as_css(),
                    cell
                ));
            }
            html.push_str("</tr>");
        }

        html.push_str("</tbody></table>");
        html
    }
}

/// Returns true if the line starts and ends with a pipe.
pub fn is_table_line(line: &str) -> bool {
    let line = line.trim_end();
    line.len() >= 2 && line.starts_with('|') && line.ends_with('|')
}

/// Splits a table line into trimmed cells, dropping the outer pipes.
pub fn split_row(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    line.split('|').map(|cell| cell.trim().to_string()).collect()
}

/// Converts table blocks to HTML tables.
///
/// The block's own line breaks are consumed. A block that cannot be built
/// is emitted unchanged. Other lines keep their line breaks.
pub fn convert(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut guard = PreformattedGuard::default();
    let mut block: Vec<&str> = Vec::new();

    for line in split_lines(input) {
        if !guard.observe(line) {
            let (list_html, rest) = split_block_prefix(line);
            if is_table_line(rest) {
                if !list_html.is_empty() {
                    flush_block(&mut output, &mut block);
                    output.push_str(list_html);
                }
                block.push(rest);
                continue;
            }
        }
        flush_block(&mut output, &mut block);
        output.push_str(line);
        output.push('\n');
    }
    flush_block(&mut output, &mut block);
    match_final_newline(&mut output, input);

    output
}

fn flush_block(output: &mut String, block: &mut Vec<&str>) {
    let rendered = if block.len() >= 2 {
        Table::parse(block).map(|table| table.to_html())
    } else {
        Err(Error::fault("table", "single pipe line is not a table"))
    };

    match rendered {
        Ok(html) => output.push_str(&html),
        Err(err) => {
            if block.len() >= 2 {
                debug!(error = %err, "leaving table block as text");
            }
            for line in block.iter() {
                output.push_str(line);
                output.push('\n');
            }
        }
    }

    block.clear();
}
