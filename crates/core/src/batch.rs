//! Fitting one model per category and ranking the results.
//!
//! Categories share nothing, so the batch fans out over rayon's pool and
//! gathers results back in category order. A category whose fit fails is
//! recorded with its error and the rest of the batch carries on, unless
//! [`BatchConfig::strict`] asks for the first failure to abort the run.

use rayon::prelude::*;
use serde::Serialize;

use crate::model::{Coefficient, FitConfig, FittedModel, GLOBAL_LABEL, ModelFamily, ModelFitter, Term};
use crate::tidy::LongTable;
use crate::{CrimetrendError, Result};

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub family: ModelFamily,
    pub fit: FitConfig,
    /// Abort on the first failing category instead of collecting failures.
    pub strict: bool,
    /// Also fit one standardized model pooled over every category.
    pub global: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { family: ModelFamily::StandardizedLinear, fit: FitConfig::default(), strict: false, global: false }
    }
}

/// A fitted model together with the observations it was fitted on.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryModel {
    pub model: FittedModel,
    #[serde(skip)]
    pub data: LongTable,
}

/// A category whose fit failed.
#[derive(Debug)]
pub struct CategoryFailure {
    pub category: String,
    pub error: CrimetrendError,
}

impl Serialize for CategoryFailure {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("CategoryFailure", 2)?;
        state.serialize_field("category", &self.category)?;
        state.serialize_field("error", &self.error.to_string())?;
        state.end()
    }
}

/// One entry of a term ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTerm {
    pub category: String,
    #[serde(flatten)]
    pub coefficient: Coefficient,
}

/// Fitted models for every category of one analysis run.
#[derive(Debug, Serialize)]
pub struct ModelCollection {
    #[serde(serialize_with = "serialize_family")]
    pub family: ModelFamily,
    pub models: Vec<CategoryModel>,
    pub failures: Vec<CategoryFailure>,
    /// Standardized fit pooled over every category, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global: Option<FittedModel>,
}

fn serialize_family<S: serde::Serializer>(family: &ModelFamily, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(family)
}

impl ModelCollection {
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn get(&self, category: &str) -> Option<&CategoryModel> {
        self.models.iter().find(|m| m.model.category == category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|m| m.model.category.as_str())
    }

    /// The coefficient for `term` from every model that has it, in category order.
    pub fn term(&self, term: Term) -> Vec<RankedTerm> {
        self.models
            .iter()
            .filter_map(|m| {
                m.model
                    .coefficient(term)
                    .map(|c| RankedTerm { category: m.model.category.clone(), coefficient: c.clone() })
            })
            .collect()
    }

    /// Categories sorted by the estimate of `term`, ascending.
    ///
    /// Both ends matter: the head holds the strongest negative trends and the
    /// tail the strongest positive ones. NaN estimates sort last.
    pub fn rank_by(&self, term: Term) -> Vec<RankedTerm> {
        let mut ranked = self.term(term);
        ranked.sort_by(|a, b| {
            let (x, y) = (a.coefficient.estimate, b.coefficient.estimate);
            x.is_nan().cmp(&y.is_nan()).then_with(|| x.total_cmp(&y))
        });
        ranked
    }
}

/// Fits one model family to every category of a long table.
#[derive(Debug, Clone, Default)]
pub struct BatchModeler {
    config: BatchConfig,
}

impl BatchModeler {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Fits every distinct category of `long`.
    ///
    /// # Errors
    ///
    /// [`CrimetrendError::Config`] for an invalid confidence level. In strict
    /// mode, the first failing category's error, in category order.
    pub fn fit_all(&self, long: &LongTable) -> Result<ModelCollection> {
        self.config.fit.validate()?;
        let fitter = ModelFitter::new(self.config.family, self.config.fit.clone());
        let categories = long.categories();

        let results: Vec<(String, LongTable, Result<FittedModel>)> = categories
            .into_par_iter()
            .map(|category| {
                let data = long.category(&category);
                let result = fitter.fit(&category, &data);
                (category, data, result)
            })
            .collect();

        let mut models = Vec::with_capacity(results.len());
        let mut failures = Vec::new();

        for (category, data, result) in results {
            match result {
                Ok(model) => models.push(CategoryModel { model, data }),
                Err(error) if self.config.strict => return Err(error),
                Err(error) => {
                    tracing::warn!(category = %category, %error, "category fit failed");
                    failures.push(CategoryFailure { category, error });
                }
            }
        }

        let global = if self.config.global {
            let pooled = ModelFitter::new(ModelFamily::StandardizedLinear, self.config.fit.clone());
            match pooled.fit_global(long) {
                Ok(model) => Some(model),
                Err(error) if self.config.strict => return Err(error),
                Err(error) => {
                    tracing::warn!(%error, "global fit failed");
                    failures.push(CategoryFailure { category: GLOBAL_LABEL.to_string(), error });
                    None
                }
            }
        } else {
            None
        };

        tracing::debug!(family = %self.config.family, fitted = models.len(), failed = failures.len(), "batch complete");

        Ok(ModelCollection { family: self.config.family, models, failures, global })
    }
}
