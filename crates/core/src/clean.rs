//! Cell cleaning and numeric conversion.
//!
//! Published counts use whitespace as a thousands separator (`1 234`, often
//! with a non-breaking or narrow space). Cleaning strips every whitespace
//! character and parses the rest. Cells that still fail to parse become
//! missing values: a dash, a footnote marker or an empty cell is "no data",
//! never zero.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::header::{DEFAULT_YEAR_LABEL, HeaderedTable};
use crate::tidy::WideTable;
use crate::{CrimetrendError, Result};

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static FOOTNOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(?:\*+|\(\w{1,3}\)|\[\w{1,3}\]|[¹²³⁰⁴-⁹]+)$").unwrap());

/// Options for turning a headered table into numbers.
#[derive(Debug, Clone)]
pub struct CleanConfig {
    /// Leading rows that hold the published header (default: 2).
    pub header_rows: usize,
    /// Name of the year column in the header list (default: `Year`).
    pub year_label: String,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self { header_rows: 2, year_label: DEFAULT_YEAR_LABEL.to_string() }
    }
}

/// Removes thousands separators from a cell.
///
/// Every Unicode whitespace character is dropped, a typographic minus is
/// turned into `-`, and a lone decimal comma becomes a dot.
pub fn strip_separators(raw: &str) -> String {
    let compact = SEPARATORS.replace_all(raw, "").replace('\u{2212}', "-");
    if compact.matches(',').count() == 1 && !compact.contains('.') {
        compact.replace(',', ".")
    } else {
        compact
    }
}

/// Cleans a cell and parses it as a number.
///
/// Returns `None` for anything that is not a finite number after cleaning.
///
/// ```rust
/// use crimetrend_core::clean_number;
///
/// assert_eq!(clean_number("1 234"), Some(1234.0));
/// assert_eq!(clean_number("1234"), Some(1234.0));
/// assert_eq!(clean_number("-"), None);
/// ```
pub fn clean_number(raw: &str) -> Option<f64> {
    strip_separators(raw).parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a year cell; only whole numbers in range qualify.
///
/// A trailing footnote marker (`2019*`, `2019 (1)`, `2019¹`) is dropped first.
pub fn clean_year(raw: &str) -> Option<i32> {
    let value = clean_number(&FOOTNOTE.replace(raw.trim(), ""))?;
    if value.fract() != 0.0 || value < i32::MIN as f64 || value > i32::MAX as f64 {
        return None;
    }
    Some(value as i32)
}

/// Drops the header rows and converts the data region to numbers.
///
/// Rows whose year cell is not a year (totals, footnotes) are skipped with a
/// warning. Category cells that do not parse become missing values.
///
/// # Errors
///
/// [`CrimetrendError::MissingYearColumn`] when no column carries the year
/// label and [`CrimetrendError::DuplicateYear`] when a year repeats.
pub fn clean_table(headered: &HeaderedTable, config: &CleanConfig) -> Result<WideTable> {
    let year_col = headered
        .column_index(&config.year_label)
        .ok_or_else(|| CrimetrendError::MissingYearColumn(config.year_label.clone()))?;

    let categories: Vec<String> = headered
        .columns()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != year_col)
        .map(|(_, name)| name.clone())
        .collect();

    let mut years = Vec::new();
    let mut values = Vec::new();
    let mut seen = HashSet::new();
    let mut missing = 0usize;

    for (index, row) in headered.table().rows().iter().enumerate().skip(config.header_rows) {
        let Some(year) = clean_year(&row[year_col]) else {
            tracing::warn!(row = index, cell = %row[year_col], "skipping row without a year");
            continue;
        };
        if !seen.insert(year) {
            return Err(CrimetrendError::DuplicateYear(year));
        }

        let cleaned: Vec<Option<f64>> = row
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != year_col)
            .map(|(_, cell)| clean_number(cell))
            .collect();
        missing += cleaned.iter().filter(|v| v.is_none()).count();

        years.push(year);
        values.push(cleaned);
    }

    tracing::debug!(years = years.len(), categories = categories.len(), missing, "table cleaned");

    Ok(WideTable::new(years, categories, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HeaderMapping;
    use crate::table::RawTable;
    use rstest::rstest;

    #[rstest]
    #[case("1 234", Some(1234.0))]
    #[case("1\u{a0}234", Some(1234.0))]
    #[case("12\u{202f}345\u{202f}678", Some(12_345_678.0))]
    #[case(" 42 ", Some(42.0))]
    #[case("3,5", Some(3.5))]
    #[case("\u{2212}7", Some(-7.0))]
    #[case("-", None)]
    #[case("..", None)]
    #[case("", None)]
    #[case("x", None)]
    #[case("inf", None)]
    #[case("NaN", None)]
    fn test_clean_number(#[case] raw: &str, #[case] expected: Option<f64>) {
        assert_eq!(clean_number(raw), expected);
    }

    #[rstest]
    #[case("1234")]
    #[case("1 234")]
    #[case("0.25")]
    #[case("-")]
    fn test_cleaning_is_idempotent(#[case] raw: &str) {
        let once = strip_separators(raw);
        assert_eq!(strip_separators(&once), once);

        if let Some(value) = clean_number(raw) {
            assert_eq!(clean_number(&value.to_string()), Some(value));
        }
    }

    #[rstest]
    #[case("2020", Some(2020))]
    #[case("2 020", Some(2020))]
    #[case("2019*", Some(2019))]
    #[case("2019 (1)", Some(2019))]
    #[case("2019[a]", Some(2019))]
    #[case("2019¹", Some(2019))]
    #[case("2020.5", None)]
    #[case("Totalt", None)]
    #[case("*", None)]
    fn test_clean_year(#[case] raw: &str, #[case] expected: Option<i32>) {
        assert_eq!(clean_year(raw), expected);
    }

    fn headered(rows: &[&[&str]], names: &[&str]) -> HeaderedTable {
        let table = RawTable::from_strs(rows).unwrap();
        HeaderMapping::new(names.iter().copied()).unwrap().apply(table).unwrap()
    }

    #[test]
    fn test_clean_table_drops_header_rows() {
        let table = headered(
            &[&["Year", "A", "B"], &["-", "x", "y"], &["2020", "10", "20"], &["2021", "15", "25"]],
            &["Year", "CatA", "CatB"],
        );
        let wide = clean_table(&table, &CleanConfig::default()).unwrap();

        assert_eq!(wide.years(), [2020, 2021]);
        assert_eq!(wide.categories(), ["CatA", "CatB"]);
        assert_eq!(wide.value(0, 0), Some(10.0));
        assert_eq!(wide.value(1, 1), Some(25.0));
    }

    #[test]
    fn test_parse_failures_become_missing() {
        let table = headered(
            &[&["Year", "A"], &["", "a"], &["2020", ".."], &["2021", "0"]],
            &["Year", "CatA"],
        );
        let wide = clean_table(&table, &CleanConfig::default()).unwrap();

        assert_eq!(wide.value(0, 0), None);
        assert_eq!(wide.value(1, 0), Some(0.0));
    }

    #[test]
    fn test_rows_without_year_are_skipped() {
        let table = headered(
            &[&["Year", "A"], &["", "a"], &["2020", "1"], &["Totalt", "9"]],
            &["Year", "CatA"],
        );
        let wide = clean_table(&table, &CleanConfig::default()).unwrap();
        assert_eq!(wide.years(), [2020]);
    }

    #[test]
    fn test_year_column_need_not_be_first() {
        let table = headered(&[&["A", "Year"], &["a", "y"], &["7", "2019"]], &["CatA", "Year"]);
        let wide = clean_table(&table, &CleanConfig::default()).unwrap();

        assert_eq!(wide.years(), [2019]);
        assert_eq!(wide.categories(), ["CatA"]);
        assert_eq!(wide.value(0, 0), Some(7.0));
    }

    #[test]
    fn test_footnoted_year_keeps_row() {
        let table = headered(
            &[&["Year", "A"], &["", "a"], &["2018", "4"], &["2019*", "5"]],
            &["Year", "CatA"],
        );
        let wide = clean_table(&table, &CleanConfig::default()).unwrap();

        assert_eq!(wide.years(), [2018, 2019]);
        assert_eq!(wide.value(1, 0), Some(5.0));
    }

    #[test]
    fn test_duplicate_year_fails() {
        let table = headered(
            &[&["Year", "A"], &["", "a"], &["2020", "1"], &["2020", "2"]],
            &["Year", "CatA"],
        );
        let result = clean_table(&table, &CleanConfig::default());
        assert!(matches!(result, Err(CrimetrendError::DuplicateYear(2020))));
    }

    #[test]
    fn test_missing_year_label_fails() {
        let table = headered(&[&["År", "A"], &["", "a"], &["2020", "1"]], &["År", "CatA"]);
        let result = clean_table(&table, &CleanConfig::default());
        assert!(matches!(result, Err(CrimetrendError::MissingYearColumn(_))));
    }
}
