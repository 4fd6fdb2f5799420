//! Wide and long (tidy) tables, and the filters over them.
//!
//! A [`WideTable`] has one row per year and one column per category. Pivoting
//! it yields a [`LongTable`] with one [`Observation`] per (year, category),
//! which is the shape the model fitter and the selectors work on.

use std::collections::HashSet;

use serde::Serialize;

use crate::{CrimetrendError, Result};

/// One row per year, one numeric column per category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WideTable {
    years: Vec<i32>,
    categories: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl WideTable {
    /// Creates a wide table; `values[row][col]` pairs `years[row]` with `categories[col]`.
    pub(crate) fn new(years: Vec<i32>, categories: Vec<String>, values: Vec<Vec<Option<f64>>>) -> Self {
        debug_assert_eq!(years.len(), values.len());
        debug_assert!(values.iter().all(|row| row.len() == categories.len()));
        Self { years, categories, values }
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn n_rows(&self) -> usize {
        self.years.len()
    }

    pub fn n_categories(&self) -> usize {
        self.categories.len()
    }

    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        *self.values.get(row)?.get(col)?
    }

    /// All values of one category in year order.
    pub fn column(&self, category: &str) -> Option<Vec<Option<f64>>> {
        let col = self.categories.iter().position(|c| c == category)?;
        Some(self.values.iter().map(|row| row[col]).collect())
    }

    /// Pivots to one observation per (year, category).
    ///
    /// Observations are ordered by year row, then by category column.
    pub fn to_long(&self) -> LongTable {
        let observations = self
            .years
            .iter()
            .zip(&self.values)
            .flat_map(|(&year, row)| {
                self.categories
                    .iter()
                    .zip(row)
                    .map(move |(category, &value)| Observation { year, category: category.clone(), value })
            })
            .collect();

        LongTable { observations }
    }
}

/// A single (year, category, value) triple.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub year: i32,
    pub category: String,
    pub value: Option<f64>,
}

/// One row per (year, category) with an explicit value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LongTable {
    observations: Vec<Observation>,
}

impl LongTable {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.observations
            .iter()
            .filter(|obs| seen.insert(obs.category.as_str()))
            .map(|obs| obs.category.clone())
            .collect()
    }

    /// Keeps the observations matching `predicate`.
    pub fn filter<F>(&self, mut predicate: F) -> LongTable
    where
        F: FnMut(&Observation) -> bool,
    {
        Self { observations: self.observations.iter().filter(|obs| predicate(obs)).cloned().collect() }
    }

    /// Observations of a single category; empty if the category is unknown.
    pub fn category(&self, name: &str) -> LongTable {
        self.filter(|obs| obs.category == name)
    }

    /// Observations of a single category, failing if it has none.
    pub fn require_category(&self, name: &str) -> Result<LongTable> {
        let subset = self.category(name);
        if subset.is_empty() {
            return Err(CrimetrendError::UnknownCategory(name.to_string()));
        }
        Ok(subset)
    }

    /// Observations of any of the named categories.
    pub fn categories_in(&self, names: &[&str]) -> LongTable {
        self.filter(|obs| names.contains(&obs.category.as_str()))
    }

    /// Observations with `from <= year <= to`.
    pub fn years_between(&self, from: i32, to: i32) -> LongTable {
        self.filter(|obs| (from..=to).contains(&obs.year))
    }

    /// (year, value) pairs with a present value, in table order.
    pub fn points(&self) -> Vec<(i32, f64)> {
        self.observations
            .iter()
            .filter_map(|obs| obs.value.map(|value| (obs.year, value)))
            .collect()
    }
}

impl<'a> IntoIterator for &'a LongTable {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}
