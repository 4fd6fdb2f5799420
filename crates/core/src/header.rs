//! Positional header mapping.
//!
//! The published header is two-tier and not in English, so column names come
//! from a side file with one clean category name per line, in column order,
//! starting with the year column. Alignment is strictly positional: the only
//! validation possible is that the counts agree and the names are usable.
//!
//! ```text
//! # headers.txt
//! Year
//! Total
//! Assault
//! Theft
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::table::RawTable;
use crate::{CrimetrendError, Result};

/// Label of the year column when none is configured.
pub const DEFAULT_YEAR_LABEL: &str = "Year";

/// Ordered category names, one per table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMapping {
    names: Vec<String>,
}

impl HeaderMapping {
    /// Builds a mapping from names, rejecting empty and duplicate names.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut seen = HashSet::with_capacity(names.len());

        for name in &names {
            if name.trim().is_empty() {
                return Err(CrimetrendError::Config("header list contains an empty name".to_string()));
            }
            if !seen.insert(name.as_str()) {
                return Err(CrimetrendError::DuplicateCategory(name.clone()));
            }
        }

        Ok(Self { names })
    }

    /// Parses the side-file format.
    ///
    /// Lines are trimmed; blank lines and `#` comments are skipped.
    pub fn parse(content: &str) -> Result<Self> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    /// Loads the side file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CrimetrendError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let mapping = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), names = mapping.len(), "header list loaded");
        Ok(mapping)
    }

    /// Default side-file location: `<config dir>/crimetrend/headers.txt`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("crimetrend").join("headers.txt"))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Binds the names to the columns of `table`.
    ///
    /// # Errors
    ///
    /// [`CrimetrendError::HeaderMismatch`] when the number of names differs
    /// from the column count. The table is never truncated or padded.
    pub fn apply(&self, table: RawTable) -> Result<HeaderedTable> {
        if self.names.len() != table.n_cols() {
            return Err(CrimetrendError::HeaderMismatch { expected: table.n_cols(), found: self.names.len() });
        }
        Ok(HeaderedTable { columns: self.names.clone(), table })
    }
}

/// A raw table whose column positions are bound to category names.
#[derive(Debug, Clone)]
pub struct HeaderedTable {
    columns: Vec<String>,
    table: RawTable,
}

impl HeaderedTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn table(&self) -> &RawTable {
        &self.table
    }

    /// Position of the column named `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> RawTable {
        RawTable::from_strs(&[&["Year", "A", "B"], &["-", "x", "y"], &["2020", "10", "20"]]).unwrap()
    }

    #[test]
    fn test_apply_binds_names() {
        let mapping = HeaderMapping::new(["Year", "CatA", "CatB"]).unwrap();
        let headered = mapping.apply(sample_table()).unwrap();

        assert_eq!(headered.columns(), ["Year", "CatA", "CatB"]);
        assert_eq!(headered.column_index("CatB"), Some(2));
        assert_eq!(headered.table().n_rows(), 3);
    }

    #[test]
    fn test_too_few_names_fails() {
        let mapping = HeaderMapping::new(["Year", "CatA"]).unwrap();
        let result = mapping.apply(sample_table());
        assert!(matches!(result, Err(CrimetrendError::HeaderMismatch { expected: 3, found: 2 })));
    }

    #[test]
    fn test_too_many_names_fails() {
        let mapping = HeaderMapping::new(["Year", "CatA", "CatB", "CatC"]).unwrap();
        let result = mapping.apply(sample_table());
        assert!(matches!(result, Err(CrimetrendError::HeaderMismatch { expected: 3, found: 4 })));
    }

    #[test]
    fn test_parse_side_file() {
        let content = "\u{feff}# translated from the published header\nYear\n\n  Total crimes  \nTheft\n";
        let mapping = HeaderMapping::parse(content).unwrap();
        assert_eq!(mapping.names(), ["Year", "Total crimes", "Theft"]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = HeaderMapping::parse("Year\nTheft\nTheft\n");
        assert!(matches!(result, Err(CrimetrendError::DuplicateCategory(name)) if name == "Theft"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("headers.txt");
        std::fs::write(&path, "Year\nCatA\nCatB\n").unwrap();

        let mapping = HeaderMapping::from_file(&path).unwrap();
        assert_eq!(mapping.len(), 3);
    }

    #[test]
    fn test_from_missing_file() {
        let result = HeaderMapping::from_file("/nonexistent/headers.txt");
        assert!(matches!(result, Err(CrimetrendError::FileNotFound(_))));
    }
}
