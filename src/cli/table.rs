//! Aligned text tables for list output
//!
//! Column widths depend on every cell of the page, so the whole page is
//! rendered at once.

use std::fmt;
use std::str::FromStr;

use console::{measure_text_width, pad_str, Alignment};

use crate::core::config::ConfigError;

/// Table layout selected by the `table` option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableStyle {
    /// Two-space gaps and a `─` rule under the header
    #[default]
    TpTable,
    /// Two-space gaps, no rule
    Plain,
    /// Two-space gaps and a `-` rule under the header
    Simple,
    /// Markdown pipe table
    Pipe,
}

impl TableStyle {
    pub const NAMES: &'static [&'static str] = &["tp_table", "plain", "simple", "pipe"];

    pub fn name(&self) -> &'static str {
        match self {
            TableStyle::TpTable => "tp_table",
            TableStyle::Plain => "plain",
            TableStyle::Simple => "simple",
            TableStyle::Pipe => "pipe",
        }
    }

    fn rule_glyph(&self) -> Option<&'static str> {
        match self {
            TableStyle::TpTable => Some("─"),
            TableStyle::Simple => Some("-"),
            TableStyle::Plain | TableStyle::Pipe => None,
        }
    }
}

impl FromStr for TableStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tp_table" => Ok(TableStyle::TpTable),
            "plain" => Ok(TableStyle::Plain),
            "simple" => Ok(TableStyle::Simple),
            "pipe" => Ok(TableStyle::Pipe),
            _ => Err(ConfigError::UnknownTableStyle(s.to_string())),
        }
    }
}

impl fmt::Display for TableStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

const COLUMN_GAP: &str = "  ";

/// Renders a page of rows under a header line
#[derive(Debug, Clone)]
pub struct TableFormatter<'a> {
    headers: &'a [String],
    style: TableStyle,
    indent: usize,
}

impl<'a> TableFormatter<'a> {
    pub fn new(headers: &'a [String], style: TableStyle) -> Self {
        Self {
            headers,
            style,
            indent: 0,
        }
    }

    /// Prefix every line with `indent` spaces
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Render the table; an empty page still prints the header
    pub fn render(&self, rows: &[Vec<String>]) -> String {
        let widths = column_widths(self.headers, rows);
        let alignments: Vec<Alignment> = (0..self.headers.len())
            .map(|col| column_alignment(rows, col))
            .collect();

        let mut lines = Vec::with_capacity(rows.len() + 2);
        lines.push(self.line(self.headers, &widths, &alignments));

        if self.style == TableStyle::Pipe {
            lines.push(pipe_rule(&widths, &alignments));
        } else if let Some(glyph) = self.style.rule_glyph() {
            let rule: Vec<String> = widths.iter().map(|w| glyph.repeat(*w)).collect();
            lines.push(rule.join(COLUMN_GAP));
        }

        for row in rows {
            lines.push(self.line(row, &widths, &alignments));
        }

        let prefix = " ".repeat(self.indent);
        lines
            .iter()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn line(&self, cells: &[String], widths: &[usize], alignments: &[Alignment]) -> String {
        let padded: Vec<String> = widths
            .iter()
            .zip(alignments)
            .enumerate()
            .map(|(col, (width, align))| {
                let cell = cells.get(col).map(String::as_str).unwrap_or_default();
                pad_str(cell, *width, *align, None).into_owned()
            })
            .collect();

        match self.style {
            TableStyle::Pipe => format!("| {} |", padded.join(" | ")),
            _ => padded.join(COLUMN_GAP).trim_end().to_string(),
        }
    }
}

/// Width of each column: the widest of its header and cells
pub fn column_widths(headers: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| measure_text_width(cell))
                .fold(measure_text_width(header), usize::max)
        })
        .collect()
}

/// Right-align a column whose first non-empty value is all digits
fn column_alignment(rows: &[Vec<String>], col: usize) -> Alignment {
    let first = rows
        .iter()
        .filter_map(|row| row.get(col))
        .find(|cell| !cell.is_empty());

    match first {
        Some(cell) if cell.chars().all(|c| c.is_ascii_digit()) => Alignment::Right,
        _ => Alignment::Left,
    }
}

fn pipe_rule(widths: &[usize], alignments: &[Alignment]) -> String {
    let cells: Vec<String> = widths
        .iter()
        .zip(alignments)
        .map(|(width, align)| match align {
            Alignment::Right => format!("{}:", "-".repeat(width + 1)),
            _ => format!(":{}", "-".repeat(width + 1)),
        })
        .collect();
    format!("|{}|", cells.join("|"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_row() {
        let headers = strings(&["Id", "Name"]);
        let rows = vec![strings(&["18928", "User login"])];

        let table = TableFormatter::new(&headers, TableStyle::TpTable).render(&rows);
        assert_eq!(
            table,
            "   Id  Name\n\
             ─────  ──────────\n\
             18928  User login"
        );
    }

    #[test]
    fn test_empty_page_keeps_header() {
        let headers = strings(&["Id", "Name"]);
        let table = TableFormatter::new(&headers, TableStyle::TpTable).render(&[]);

        assert_eq!(table, "Id  Name\n──  ────");
    }

    #[test]
    fn test_widths_cover_every_cell() {
        let headers = strings(&["Id", "Owner", "X"]);
        let rows = vec![
            strings(&["1", "Ada Lovelace", ""]),
            strings(&["200", "", "wide value"]),
            strings(&["30", "Grace", "x"]),
        ];
        let widths = column_widths(&headers, &rows);

        for (col, width) in widths.iter().enumerate() {
            assert!(*width >= headers[col].len());
            for row in &rows {
                assert!(*width >= row[col].len());
            }
        }
        assert_eq!(widths, vec![3, 12, 10]);
    }

    #[test]
    fn test_alignment_from_first_non_empty_value() {
        let rows = vec![strings(&["", "abc"]), strings(&["12", "34"])];
        assert_eq!(column_alignment(&rows, 0), Alignment::Right);
        assert_eq!(column_alignment(&rows, 1), Alignment::Left);
        assert_eq!(column_alignment(&[], 0), Alignment::Left);
    }

    #[test]
    fn test_styles() {
        let headers = strings(&["Id", "State"]);
        let rows = vec![strings(&["7", "Open"])];

        assert_eq!(
            TableFormatter::new(&headers, TableStyle::Plain).render(&rows),
            "Id  State\n 7  Open"
        );
        assert_eq!(
            TableFormatter::new(&headers, TableStyle::Simple).render(&rows),
            "Id  State\n--  -----\n 7  Open"
        );
        assert_eq!(
            TableFormatter::new(&headers, TableStyle::Pipe).render(&rows),
            "| Id | State |\n|---:|:------|\n|  7 | Open  |"
        );
    }

    #[test]
    fn test_indent() {
        let headers = strings(&["Id"]);
        let rows = vec![strings(&["1"])];
        let table = TableFormatter::new(&headers, TableStyle::Plain)
            .indent(2)
            .render(&rows);

        assert_eq!(table, "  Id\n   1");
    }

    #[test]
    fn test_parse_style() {
        assert_eq!("pipe".parse::<TableStyle>().unwrap(), TableStyle::Pipe);
        assert_eq!("TP_TABLE".parse::<TableStyle>().unwrap(), TableStyle::TpTable);
        assert!(matches!(
            "fancy_grid".parse::<TableStyle>(),
            Err(ConfigError::UnknownTableStyle(_))
        ));
        for name in TableStyle::NAMES {
            assert_eq!(name.parse::<TableStyle>().unwrap().name(), *name);
        }
    }
}
