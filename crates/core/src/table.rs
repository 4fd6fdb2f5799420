//! Raw table extraction.
//!
//! Turns the first `<table>` of a page into a [`RawTable`]: a rectangular
//! grid of cell text. Header rows are kept as ordinary rows because the
//! published header is two-tier and is replaced later by the header mapper.
//!
//! Spanning cells are expanded the way a browser lays them out: a cell with
//! `colspan="3"` fills three slots of its row, a cell with `rowspan="2"`
//! also fills the same slot of the following row.

use serde::Serialize;

use crate::parse::{Document, Element};
use crate::{CrimetrendError, Result};

const MAX_COLSPAN: usize = 1000;
const MAX_ROWSPAN: usize = 65534;

/// Configuration for locating the table on the page.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// CSS selector for the table; the first match is used (default: `table`).
    pub selector: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { selector: "table".to_string() }
    }
}

/// A grid of text cells exactly as scraped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawTable {
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Builds a table from rows, checking that every row has the same width.
    ///
    /// # Errors
    ///
    /// [`CrimetrendError::NoTable`] for an empty grid and
    /// [`CrimetrendError::RaggedTable`] when a row differs in width from the first.
    pub fn new(rows: Vec<Vec<String>>) -> Result<Self> {
        let expected = match rows.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => return Err(CrimetrendError::NoTable),
        };

        if let Some((row, cells)) = rows.iter().enumerate().find(|(_, cells)| cells.len() != expected) {
            return Err(CrimetrendError::RaggedTable { row, expected, found: cells.len() });
        }

        Ok(Self { rows })
    }

    /// Convenience constructor from string slices, mostly for tests.
    pub fn from_strs(rows: &[&[&str]]) -> Result<Self> {
        Self::new(
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        )
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

/// Extracts the first table of an HTML page with the default configuration.
pub fn extract_table(html: &str) -> Result<RawTable> {
    extract_table_with_config(html, &ExtractConfig::default())
}

/// Extracts the first table matching `config.selector`.
pub fn extract_table_with_config(html: &str, config: &ExtractConfig) -> Result<RawTable> {
    let doc = Document::parse(html);
    let tables = doc.select(&config.selector)?;
    let table = tables.first().ok_or(CrimetrendError::NoTable)?;

    if table.tag_name() != "table" {
        return Err(CrimetrendError::HtmlParse(format!(
            "selector {:?} matched <{}>, not a table",
            config.selector,
            table.tag_name()
        )));
    }

    let rows = expand_rows(&table.table_rows());
    tracing::debug!(rows = rows.len(), cols = rows.first().map_or(0, Vec::len), "table extracted");

    RawTable::new(rows)
}

/// Lays out table rows into a grid, expanding `colspan` and `rowspan`.
fn expand_rows(rows: &[Element<'_>]) -> Vec<Vec<String>> {
    // Per column: rows still covered by a rowspan from above, and its text.
    let mut carry: Vec<(usize, String)> = Vec::new();
    let mut grid = Vec::with_capacity(rows.len());

    for tr in rows {
        let mut row: Vec<String> = Vec::new();
        let mut cells = tr.children_named(&["td", "th"]).into_iter();

        loop {
            let col = row.len();
            if col < carry.len() && carry[col].0 > 0 {
                carry[col].0 -= 1;
                row.push(carry[col].1.clone());
                continue;
            }

            let Some(cell) = cells.next() else { break };
            let text = cell.normalized_text();
            let colspan = span(&cell, "colspan", MAX_COLSPAN);
            let rowspan = span(&cell, "rowspan", MAX_ROWSPAN);

            for _ in 0..colspan {
                let col = row.len();
                if rowspan > 1 {
                    if carry.len() <= col {
                        carry.resize(col + 1, (0, String::new()));
                    }
                    carry[col] = (rowspan - 1, text.clone());
                }
                row.push(text.clone());
            }
        }

        if row.is_empty() {
            continue;
        }
        grid.push(row);
    }

    grid
}

fn span(cell: &Element<'_>, name: &str, max: usize) -> usize {
    cell.attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .map_or(1, |n| n.min(max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_table() {
        let html = r#"
            <table>
                <tr><th>Year</th><th>A</th></tr>
                <tr><td>2020</td><td>10</td></tr>
            </table>
        "#;
        let table = extract_table(html).unwrap();

        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.n_cols(), 2);
        assert_eq!(table.cell(1, 1), Some("10"));
    }

    #[test]
    fn test_two_tier_header_with_spans() {
        let html = r#"
            <table>
                <thead>
                    <tr><th rowspan="2">År</th><th colspan="2">Brott mot person</th><th rowspan="2">Stöld</th></tr>
                    <tr><th>Mord</th><th>Misshandel</th></tr>
                </thead>
                <tbody>
                    <tr><td>2020</td><td>100</td><td>1 234</td><td>5 000</td></tr>
                </tbody>
            </table>
        "#;
        let table = extract_table(html).unwrap();

        assert_eq!(table.n_cols(), 4);
        assert_eq!(table.row(0).unwrap(), ["År", "Brott mot person", "Brott mot person", "Stöld"]);
        assert_eq!(table.row(1).unwrap(), ["År", "Mord", "Misshandel", "Stöld"]);
        assert_eq!(table.row(2).unwrap(), ["2020", "100", "1 234", "5 000"]);
    }

    #[test]
    fn test_first_table_is_used() {
        let html = r#"
            <table><tr><td>first</td></tr></table>
            <table><tr><td>second</td></tr></table>
        "#;
        let table = extract_table(html).unwrap();
        assert_eq!(table.cell(0, 0), Some("first"));
    }

    #[test]
    fn test_selector_picks_other_table() {
        let html = r#"
            <table><tr><td>first</td></tr></table>
            <table class="stats"><tr><td>second</td></tr></table>
        "#;
        let config = ExtractConfig { selector: "table.stats".to_string() };
        let table = extract_table_with_config(html, &config).unwrap();
        assert_eq!(table.cell(0, 0), Some("second"));
    }

    #[test]
    fn test_selector_must_match_table() {
        let html = "<div class=\"x\"><table><tr><td>1</td></tr></table></div>";
        let config = ExtractConfig { selector: "div.x".to_string() };
        let result = extract_table_with_config(html, &config);
        assert!(matches!(result, Err(CrimetrendError::HtmlParse(_))));
    }

    #[test]
    fn test_no_table() {
        let result = extract_table("<html><body><p>No data</p></body></html>");
        assert!(matches!(result, Err(CrimetrendError::NoTable)));
    }

    #[test]
    fn test_empty_table() {
        let result = extract_table("<table></table>");
        assert!(matches!(result, Err(CrimetrendError::NoTable)));
    }

    #[test]
    fn test_ragged_table() {
        let html = r#"
            <table>
                <tr><td>Year</td><td>A</td><td>B</td></tr>
                <tr><td>2020</td><td>10</td></tr>
            </table>
        "#;
        let result = extract_table(html);
        assert!(matches!(result, Err(CrimetrendError::RaggedTable { row: 1, expected: 3, found: 2 })));
    }

    #[test]
    fn test_raw_table_new_rejects_ragged_rows() {
        let result = RawTable::from_strs(&[&["a", "b"], &["c"]]);
        assert!(matches!(result, Err(CrimetrendError::RaggedTable { .. })));
    }
}
