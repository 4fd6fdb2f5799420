//! Per-category trend models.
//!
//! Every model regresses the count (`value`) on `Year` by ordinary least
//! squares. Three families are supported:
//!
//! - [`ModelFamily::Linear`]: `value = b0 + b1 * Year`.
//! - [`ModelFamily::StandardizedLinear`]: both variables z-scored first, so
//!   the slope equals the Pearson correlation of year and value.
//! - [`ModelFamily::Polynomial`]: an orthogonal polynomial basis of `Year`
//!   up to the given degree (3 by default), so the linear, quadratic and
//!   cubic terms are uncorrelated and can be read independently.
//!
//! # Example
//!
//! ```rust
//! use crimetrend_core::{FitConfig, ModelFamily, ModelFitter, Observation, LongTable, Term};
//!
//! let data = LongTable::new(
//!     (2015..2020)
//!         .map(|year| Observation { year, category: "Theft".into(), value: Some(100.0 + 5.0 * (year - 2015) as f64) })
//!         .collect(),
//! );
//! let fitter = ModelFitter::new(ModelFamily::Linear, FitConfig::default());
//! let model = fitter.fit("Theft", &data).unwrap();
//! let slope = model.coefficient(Term::Degree(1)).unwrap();
//! assert!((slope.estimate - 5.0).abs() < 1e-9);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::ols;
use crate::stats::{mean, std_dev, student_t_quantile, student_t_two_sided_p, z_scores};
use crate::tidy::LongTable;
use crate::{CrimetrendError, Result};

/// Category label of a fit pooled over every category.
pub const GLOBAL_LABEL: &str = "All categories";

const YEAR: &str = "Year";
const VALUE: &str = "value";

/// The model family fitted to each category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    Linear,
    StandardizedLinear,
    Polynomial { degree: usize },
}

impl ModelFamily {
    /// Orthogonal cubic polynomial, the usual choice for trend shape.
    pub const CUBIC: ModelFamily = ModelFamily::Polynomial { degree: 3 };

    /// Number of free parameters including the intercept.
    ///
    /// Saturates, so an absurd degree reads as "more parameters than data".
    pub fn n_parameters(&self) -> usize {
        match self {
            ModelFamily::Linear | ModelFamily::StandardizedLinear => 2,
            ModelFamily::Polynomial { degree } => degree.saturating_add(1),
        }
    }

    /// Terms estimated by this family, in design-matrix order.
    pub fn terms(&self) -> Vec<Term> {
        (0..self.n_parameters())
            .map(|i| if i == 0 { Term::Intercept } else { Term::Degree(i) })
            .collect()
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelFamily::Linear => write!(f, "linear"),
            ModelFamily::StandardizedLinear => write!(f, "standardized-linear"),
            ModelFamily::Polynomial { degree } => write!(f, "polynomial-{}", degree),
        }
    }
}

impl FromStr for ModelFamily {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" | "lm" => Ok(Self::Linear),
            "standardized" | "standardized-linear" | "std" => Ok(Self::StandardizedLinear),
            "poly" | "polynomial" | "cubic" => Ok(Self::CUBIC),
            other => match other.strip_prefix("polynomial-").or_else(|| other.strip_prefix("poly-")) {
                Some(degree) => degree
                    .parse::<usize>()
                    .ok()
                    .filter(|&d| d >= 1)
                    .map(|degree| Self::Polynomial { degree })
                    .ok_or_else(|| format!("Invalid polynomial degree: {}", degree)),
                None => Err(format!(
                    "Invalid model family: {}. Valid options: linear, standardized, poly, poly-N",
                    s
                )),
            },
        }
    }
}

/// A model term, keyed by polynomial order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Intercept,
    /// Order 1 is the linear term, 2 quadratic, 3 cubic.
    Degree(usize),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Intercept => write!(f, "intercept"),
            Term::Degree(1) => write!(f, "linear"),
            Term::Degree(2) => write!(f, "quadratic"),
            Term::Degree(3) => write!(f, "cubic"),
            Term::Degree(n) => write!(f, "degree_{}", n),
        }
    }
}

impl FromStr for Term {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "intercept" => Ok(Term::Intercept),
            "linear" | "slope" => Ok(Term::Degree(1)),
            "quadratic" => Ok(Term::Degree(2)),
            "cubic" => Ok(Term::Degree(3)),
            other => other
                .strip_prefix("degree_")
                .and_then(|n| n.parse::<usize>().ok())
                .filter(|&n| n >= 1)
                .map(Term::Degree)
                .ok_or_else(|| format!("Invalid term: {}. Valid options: intercept, linear, quadratic, cubic", s)),
        }
    }
}

impl Serialize for Term {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Options for fitting.
#[derive(Debug, Clone)]
pub struct FitConfig {
    /// Confidence level of the coefficient intervals (default: 0.95).
    pub confidence_level: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self { confidence_level: 0.95 }
    }
}

impl FitConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(CrimetrendError::Config(format!(
                "confidence level must be between 0 and 1, got {}",
                self.confidence_level
            )));
        }
        Ok(())
    }
}

/// Estimate and inference for one term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coefficient {
    pub term: Term,
    pub estimate: f64,
    pub std_error: f64,
    /// t statistic on the residual degrees of freedom.
    pub statistic: f64,
    pub p_value: f64,
    pub conf_low: f64,
    pub conf_high: f64,
}

/// Observed and fitted value for one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FittedPoint {
    pub year: i32,
    pub observed: f64,
    pub fitted: f64,
}

/// Recurrence coefficients of an orthogonal polynomial basis.
///
/// Built from the observed years with the Stieltjes procedure: `P0 = 1`,
/// `P1 = x - a0`, `P(j+1) = (x - aj) Pj - (sj / s(j-1)) P(j-1)` where `sj`
/// is the sum of squares of `Pj` over the sample. Columns are scaled to unit
/// norm, so over the sample points they are orthonormal and each sums to
/// zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyBasis {
    alpha: Vec<f64>,
    norm2: Vec<f64>,
}

impl PolyBasis {
    /// Builds a basis of the given degree over `xs`.
    ///
    /// Returns `None` if `xs` has no more than `degree` distinct values.
    pub fn fit(xs: &[f64], degree: usize) -> Option<Self> {
        if degree == 0 || distinct(xs) <= degree {
            return None;
        }

        let n = xs.len();
        let mut alpha = Vec::with_capacity(degree);
        let mut norm2 = Vec::with_capacity(degree + 1);
        let mut prev: Vec<f64> = vec![0.0; n];
        let mut curr: Vec<f64> = vec![1.0; n];

        for j in 0..=degree {
            let s: f64 = curr.iter().map(|p| p * p).sum();
            if s <= f64::EPSILON * n as f64 {
                return None;
            }
            norm2.push(s);
            if j == degree {
                break;
            }

            let a = xs.iter().zip(&curr).map(|(x, p)| x * p * p).sum::<f64>() / s;
            alpha.push(a);

            let ratio = if j == 0 { 0.0 } else { s / norm2[j - 1] };
            let next: Vec<f64> = xs
                .iter()
                .zip(curr.iter().zip(&prev))
                .map(|(x, (c, p))| (x - a) * c - ratio * p)
                .collect();
            prev = std::mem::replace(&mut curr, next);
        }

        Some(Self { alpha, norm2 })
    }

    pub fn degree(&self) -> usize {
        self.alpha.len()
    }

    /// Basis values of degree 1..=d at `x`.
    pub fn evaluate(&self, x: f64) -> Vec<f64> {
        let degree = self.degree();
        let mut out = Vec::with_capacity(degree);
        let mut prev = 0.0;
        let mut curr = 1.0;

        for j in 0..degree {
            let ratio = if j == 0 { 0.0 } else { self.norm2[j] / self.norm2[j - 1] };
            let next = (x - self.alpha[j]) * curr - ratio * prev;
            prev = curr;
            curr = next;
            out.push(curr / self.norm2[j + 1].sqrt());
        }

        out
    }

    /// Design columns (one per degree) over `xs`.
    pub fn columns(&self, xs: &[f64]) -> Vec<Vec<f64>> {
        let rows: Vec<Vec<f64>> = xs.iter().map(|&x| self.evaluate(x)).collect();
        (0..self.degree()).map(|d| rows.iter().map(|row| row[d]).collect()).collect()
    }
}

/// Maps a year onto the fitted scale and back.
#[derive(Debug, Clone, PartialEq)]
enum Basis {
    Raw,
    Standardized { x_mean: f64, x_sd: f64, y_mean: f64, y_sd: f64 },
    Orthogonal(PolyBasis),
}

impl Basis {
    fn design_row(&self, year: f64) -> Vec<f64> {
        let mut row = vec![1.0];
        match self {
            Basis::Raw => row.push(year),
            Basis::Standardized { x_mean, x_sd, .. } => row.push((year - x_mean) / x_sd),
            Basis::Orthogonal(poly) => row.extend(poly.evaluate(year)),
        }
        row
    }
}

/// A fitted model for one category.
#[derive(Debug, Clone, Serialize)]
pub struct FittedModel {
    pub category: String,
    #[serde(serialize_with = "serialize_display")]
    pub family: ModelFamily,
    pub coefficients: Vec<Coefficient>,
    /// Observations used in the fit.
    pub n_obs: usize,
    /// Observations dropped because their value was missing.
    pub n_missing: usize,
    pub df_residual: usize,
    /// Residual standard error, on the fitted scale.
    pub sigma: f64,
    pub r_squared: f64,
    pub confidence_level: f64,
    pub fitted: Vec<FittedPoint>,
    #[serde(skip)]
    basis: Basis,
}

impl FittedModel {
    pub fn coefficient(&self, term: Term) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.term == term)
    }

    /// Predicted value for `year`, on the scale of the original counts.
    pub fn predict(&self, year: f64) -> f64 {
        let row = self.basis.design_row(year);
        let linear: f64 = row.iter().zip(&self.coefficients).map(|(x, c)| x * c.estimate).sum();
        match self.basis {
            Basis::Standardized { y_mean, y_sd, .. } => y_mean + y_sd * linear,
            _ => linear,
        }
    }
}

fn serialize_display<T: fmt::Display, S: Serializer>(value: &T, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

fn distinct(xs: &[f64]) -> usize {
    xs.iter().map(|x| x.to_bits()).collect::<HashSet<_>>().len()
}

/// Fits one model family to category subsets.
#[derive(Debug, Clone)]
pub struct ModelFitter {
    family: ModelFamily,
    config: FitConfig,
}

impl ModelFitter {
    pub fn new(family: ModelFamily, config: FitConfig) -> Self {
        Self { family, config }
    }

    pub fn family(&self) -> ModelFamily {
        self.family
    }

    /// Fits one model to every observation of `data`, whatever its category.
    pub fn fit_global(&self, data: &LongTable) -> Result<FittedModel> {
        self.fit(GLOBAL_LABEL, data)
    }

    /// Fits `value ~ Year` on `data`, labelling the result `category`.
    ///
    /// Observations with a missing value are dropped first.
    ///
    /// # Errors
    ///
    /// - [`CrimetrendError::ZeroVariance`] if every usable observation has the
    ///   same year, or (standardized fits) the same value.
    /// - [`CrimetrendError::InsufficientData`] if there are fewer usable
    ///   observations (or, for polynomials, distinct years) than parameters.
    /// - [`CrimetrendError::SingularDesign`] if the normal equations cannot be solved.
    pub fn fit(&self, category: &str, data: &LongTable) -> Result<FittedModel> {
        self.config.validate()?;

        let points = data.points();
        let n_missing = data.len() - points.len();
        let parameters = self.family.n_parameters();
        let insufficient = |observations| CrimetrendError::InsufficientData {
            category: category.to_string(),
            observations,
            parameters,
        };

        if points.is_empty() {
            return Err(insufficient(0));
        }

        let years: Vec<f64> = points.iter().map(|&(year, _)| year as f64).collect();
        let values: Vec<f64> = points.iter().map(|&(_, value)| value).collect();

        let distinct_years = distinct(&years);
        if distinct_years < 2 {
            return Err(CrimetrendError::ZeroVariance { category: category.to_string(), variable: YEAR.to_string() });
        }
        if points.len() < parameters {
            return Err(insufficient(points.len()));
        }

        let (basis, response) = match self.family {
            ModelFamily::Linear => (Basis::Raw, values.clone()),
            ModelFamily::StandardizedLinear => {
                let response = z_scores(&values).ok_or_else(|| CrimetrendError::ZeroVariance {
                    category: category.to_string(),
                    variable: VALUE.to_string(),
                })?;
                let basis = Basis::Standardized {
                    x_mean: mean(&years),
                    x_sd: std_dev(&years),
                    y_mean: mean(&values),
                    y_sd: std_dev(&values),
                };
                (basis, response)
            }
            ModelFamily::Polynomial { degree } => {
                let poly = PolyBasis::fit(&years, degree).ok_or_else(|| CrimetrendError::InsufficientData {
                    category: category.to_string(),
                    observations: distinct_years,
                    parameters,
                })?;
                (Basis::Orthogonal(poly), values.clone())
            }
        };

        // Raw years are solved centered; X'X on calendar years is ill-conditioned.
        let shift = if basis == Basis::Raw { mean(&years) } else { 0.0 };
        let rows: Vec<Vec<f64>> = years.iter().map(|&year| basis.design_row(year - shift)).collect();
        let mut solution =
            ols::solve(&rows, &response).ok_or_else(|| CrimetrendError::SingularDesign { category: category.to_string() })?;
        if shift != 0.0 {
            solution.shift_origin(shift);
        }

        let n = points.len();
        let df = n - parameters;
        let rss = solution.rss();
        let sigma2 = if df > 0 { rss / df as f64 } else { f64::NAN };
        let critical = student_t_quantile(1.0 - (1.0 - self.config.confidence_level) / 2.0, df as f64);

        let coefficients = self
            .family
            .terms()
            .into_iter()
            .enumerate()
            .map(|(i, term)| {
                let estimate = solution.beta[i];
                let std_error = (sigma2 * solution.xtx_inv[i][i]).sqrt();
                let statistic = estimate / std_error;
                Coefficient {
                    term,
                    estimate,
                    std_error,
                    statistic,
                    p_value: student_t_two_sided_p(statistic, df as f64),
                    conf_low: estimate - critical * std_error,
                    conf_high: estimate + critical * std_error,
                }
            })
            .collect();

        let response_mean = mean(&response);
        let tss: f64 = response.iter().map(|y| (y - response_mean).powi(2)).sum();
        let r_squared = if tss > 0.0 { 1.0 - rss / tss } else { f64::NAN };

        let mut model = FittedModel {
            category: category.to_string(),
            family: self.family,
            coefficients,
            n_obs: n,
            n_missing,
            df_residual: df,
            sigma: sigma2.sqrt(),
            r_squared,
            confidence_level: self.config.confidence_level,
            fitted: Vec::new(),
            basis,
        };
        let fitted = points
            .iter()
            .map(|&(year, observed)| FittedPoint { year, observed, fitted: model.predict(year as f64) })
            .collect();
        model.fitted = fitted;

        tracing::debug!(category, family = %self.family, n, n_missing, r_squared, "model fitted");

        Ok(model)
    }
}
