//! End-to-end analysis API.
//!
//! [`Pipeline`] runs every step in order: extract the table, bind the header
//! list, clean and pivot, select categories, and fit one model per category.
//! The convenience functions [`analyze_html`] and [`fetch_and_analyze`] use
//! the default configuration.
//!
//! # Example
//!
//! ```rust
//! use crimetrend_core::{HeaderMapping, ModelFamily, PipelineConfig, Pipeline};
//!
//! let html = r#"
//!     <table>
//!         <tr><th>År</th><th>Stöld</th></tr>
//!         <tr><th></th><th>antal</th></tr>
//!         <tr><td>2019</td><td>1 000</td></tr>
//!         <tr><td>2020</td><td>1 100</td></tr>
//!         <tr><td>2021</td><td>1 250</td></tr>
//!     </table>
//! "#;
//! let headers = HeaderMapping::new(["Year", "Theft"]).unwrap();
//! let config = PipelineConfig::builder().family(ModelFamily::Linear).build();
//! let analysis = Pipeline::with_config(config).analyze_html(html, &headers).unwrap();
//!
//! assert_eq!(analysis.long.len(), 3);
//! assert_eq!(analysis.models.len(), 1);
//! ```

use crate::batch::{BatchConfig, BatchModeler, ModelCollection};
use crate::clean::{CleanConfig, clean_table};
#[cfg(feature = "fetch")]
use crate::fetch::fetch_url;
use crate::fetch::FetchConfig;
use crate::header::HeaderMapping;
use crate::model::ModelFamily;
use crate::parse::Document;
use crate::table::{ExtractConfig, RawTable, extract_table_with_config};
use crate::tidy::{LongTable, WideTable};
use crate::{CrimetrendError, Result};

/// Configuration for a full analysis run.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub fetch: FetchConfig,
    pub extract: ExtractConfig,
    pub clean: CleanConfig,
    pub batch: BatchConfig,
    /// Categories to model; empty means all of them.
    pub categories: Vec<String>,
    /// Inclusive year range to keep before fitting.
    pub years: Option<(i32, i32)>,
}

impl PipelineConfig {
    /// Creates a new builder for PipelineConfig.
    ///
    /// # Example
    ///
    /// ```rust
    /// use crimetrend_core::{ModelFamily, PipelineConfig};
    ///
    /// let config = PipelineConfig::builder()
    ///     .family(ModelFamily::CUBIC)
    ///     .confidence_level(0.9)
    ///     .strict(true)
    ///     .build();
    /// assert!(config.batch.strict);
    /// ```
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }
}

/// Builder for PipelineConfig.
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: PipelineConfig::default() }
    }

    /// Sets the HTTP timeout in seconds.
    pub fn timeout(mut self, secs: u64) -> Self {
        self.config.fetch.timeout = secs;
        self
    }

    /// Sets the User-Agent sent with the request.
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.fetch.user_agent = value.into();
        self
    }

    /// Sets the CSS selector used to find the table.
    pub fn table_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.extract.selector = selector.into();
        self
    }

    /// Sets how many leading rows hold the published header.
    pub fn header_rows(mut self, rows: usize) -> Self {
        self.config.clean.header_rows = rows;
        self
    }

    /// Sets the header name of the year column.
    pub fn year_label(mut self, label: impl Into<String>) -> Self {
        self.config.clean.year_label = label.into();
        self
    }

    /// Sets the model family.
    pub fn family(mut self, family: ModelFamily) -> Self {
        self.config.batch.family = family;
        self
    }

    /// Sets the confidence level of coefficient intervals.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.config.batch.fit.confidence_level = level;
        self
    }

    /// Sets whether one failing category aborts the batch.
    pub fn strict(mut self, strict: bool) -> Self {
        self.config.batch.strict = strict;
        self
    }

    /// Sets whether to add a standardized fit pooled over every category.
    pub fn global(mut self, global: bool) -> Self {
        self.config.batch.global = global;
        self
    }

    /// Restricts modelling to the named categories.
    pub fn categories<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.categories = names.into_iter().map(Into::into).collect();
        self
    }

    /// Keeps only years in `from..=to`.
    pub fn year_range(mut self, from: i32, to: i32) -> Self {
        self.config.years = Some((from, to));
        self
    }

    /// Builds the config.
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Every intermediate product of one run.
#[derive(Debug)]
pub struct Analysis {
    /// Page title, if the page has one.
    pub title: Option<String>,
    pub raw: RawTable,
    pub wide: WideTable,
    /// The full long table, before category and year selection.
    pub long: LongTable,
    /// The observations the models were fitted on.
    pub selected: LongTable,
    pub models: ModelCollection,
}

/// Runs the scrape, reshape and fit steps.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the analysis on an already fetched page.
    ///
    /// # Errors
    ///
    /// Shape errors from extraction, header mapping and cleaning;
    /// [`CrimetrendError::UnknownCategory`] for a requested category the
    /// table does not have; fit errors only in strict mode.
    pub fn analyze_html(&self, html: &str, headers: &HeaderMapping) -> Result<Analysis> {
        let title = Document::parse(html).title();
        let raw = extract_table_with_config(html, &self.config.extract)?;
        let headered = headers.apply(raw.clone())?;
        let wide = clean_table(&headered, &self.config.clean)?;
        let long = wide.to_long();

        let selected = self.select(&long)?;
        let models = BatchModeler::new(self.config.batch.clone()).fit_all(&selected)?;

        Ok(Analysis { title, raw, wide, long, selected, models })
    }

    /// Fetches the page and runs the analysis.
    #[cfg(feature = "fetch")]
    pub async fn fetch_and_analyze(&self, url: &str, headers: &HeaderMapping) -> Result<Analysis> {
        let html = fetch_url(url, &self.config.fetch).await?;
        self.analyze_html(&html, headers)
    }

    fn select(&self, long: &LongTable) -> Result<LongTable> {
        let mut selected = if self.config.categories.is_empty() {
            long.clone()
        } else {
            let known = long.categories();
            if let Some(missing) = self.config.categories.iter().find(|name| !known.contains(*name)) {
                return Err(CrimetrendError::UnknownCategory(missing.clone()));
            }
            let names: Vec<&str> = self.config.categories.iter().map(String::as_str).collect();
            long.categories_in(&names)
        };

        if let Some((from, to)) = self.config.years {
            selected = selected.years_between(from, to);
        }

        Ok(selected)
    }
}

/// Runs the analysis with the default configuration.
pub fn analyze_html(html: &str, headers: &HeaderMapping) -> Result<Analysis> {
    Pipeline::new().analyze_html(html, headers)
}

/// Fetches and analyzes with the default configuration.
#[cfg(feature = "fetch")]
pub async fn fetch_and_analyze(url: &str, headers: &HeaderMapping) -> Result<Analysis> {
    Pipeline::new().fetch_and_analyze(url, headers).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Term;

    const HTML: &str = r#"
        <html><head><title>Anmälda brott</title></head><body>
        <table>
            <tr><th rowspan="2">År</th><th colspan="2">Brott mot person</th></tr>
            <tr><th>Misshandel</th><th>Rån</th></tr>
            <tr><td>2018</td><td>1 000</td><td>300</td></tr>
            <tr><td>2019</td><td>1 100</td><td>280</td></tr>
            <tr><td>2020</td><td>1 180</td><td>..</td></tr>
            <tr><td>2021</td><td>1 320</td><td>240</td></tr>
        </table>
        </body></html>
    "#;

    fn headers() -> HeaderMapping {
        HeaderMapping::new(["Year", "Assault", "Robbery"]).unwrap()
    }

    #[test]
    fn test_analyze_html() {
        let analysis = analyze_html(HTML, &headers()).unwrap();

        assert_eq!(analysis.title.as_deref(), Some("Anmälda brott"));
        assert_eq!(analysis.raw.n_rows(), 6);
        assert_eq!(analysis.wide.n_rows(), 4);
        assert_eq!(analysis.long.len(), 8);
        assert_eq!(analysis.models.len(), 2);

        let robbery = analysis.models.get("Robbery").unwrap();
        assert_eq!(robbery.model.n_missing, 1);
        assert!(robbery.model.coefficient(Term::Degree(1)).unwrap().estimate < 0.0);
    }

    #[test]
    fn test_category_selection() {
        let config = PipelineConfig::builder().categories(["Assault"]).build();
        let analysis = Pipeline::with_config(config).analyze_html(HTML, &headers()).unwrap();

        assert_eq!(analysis.models.len(), 1);
        assert_eq!(analysis.long.len(), 8);
        assert_eq!(analysis.selected.len(), 4);
        assert!(analysis.selected.iter().all(|obs| obs.category == "Assault"));
    }

    #[test]
    fn test_global_fit_follows_selection() {
        let config = PipelineConfig::builder().global(true).year_range(2018, 2020).build();
        let analysis = Pipeline::with_config(config).analyze_html(HTML, &headers()).unwrap();

        let global = analysis.models.global.as_ref().unwrap();
        assert_eq!(global.n_obs, 5);
        assert_eq!(global.n_missing, 1);
        assert_eq!(analysis.models.len(), 2);
    }

    #[test]
    fn test_unknown_category() {
        let config = PipelineConfig::builder().categories(["Arson"]).build();
        let result = Pipeline::with_config(config).analyze_html(HTML, &headers());
        assert!(matches!(result, Err(CrimetrendError::UnknownCategory(name)) if name == "Arson"));
    }

    #[test]
    fn test_year_range_can_starve_a_fit() {
        let config = PipelineConfig::builder().year_range(2021, 2021).family(ModelFamily::Linear).build();
        let analysis = Pipeline::with_config(config).analyze_html(HTML, &headers()).unwrap();

        assert!(analysis.models.is_empty());
        assert_eq!(analysis.models.failures.len(), 2);
        assert!(
            analysis
                .models
                .failures
                .iter()
                .all(|f| matches!(f.error, CrimetrendError::ZeroVariance { .. }))
        );
    }

    #[test]
    fn test_header_mismatch_propagates() {
        let headers = HeaderMapping::new(["Year", "Assault"]).unwrap();
        let result = analyze_html(HTML, &headers);
        assert!(matches!(result, Err(CrimetrendError::HeaderMismatch { expected: 3, found: 2 })));
    }
}
