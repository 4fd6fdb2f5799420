//! Scrape a published crime-statistics table and describe multi-year trends.
//!
//! The pipeline runs fetch → extract → map headers → clean → pivot → select →
//! fit, and each step is available on its own. [`Pipeline`] runs them all.

pub mod batch;
pub mod clean;
pub mod error;
pub mod fetch;
pub mod formatters;
pub mod header;
pub mod model;
mod ols;
pub mod parse;
pub mod pipeline;
pub mod stats;
pub mod table;
pub mod tidy;

pub use batch::{BatchConfig, BatchModeler, CategoryFailure, CategoryModel, ModelCollection, RankedTerm};
pub use clean::{CleanConfig, clean_number, clean_table, clean_year, strip_separators};
pub use error::{CrimetrendError, Result};
pub use fetch::FetchConfig;
#[cfg(feature = "fetch")]
pub use fetch::fetch_url;
pub use fetch::{fetch_file, fetch_stdin};
pub use formatters::{JsonConfig, JsonFormatter, MarkdownConfig, MarkdownFormatter, TextConfig, TextFormatter};
pub use formatters::{convert_to_json, convert_to_markdown, convert_to_text, long_to_csv, trend_to_csv};
pub use header::{DEFAULT_YEAR_LABEL, HeaderMapping, HeaderedTable};
pub use model::{
    Coefficient, FitConfig, FittedModel, FittedPoint, GLOBAL_LABEL, ModelFamily, ModelFitter, PolyBasis, Term,
};
pub use parse::Document;
#[cfg(feature = "fetch")]
pub use pipeline::fetch_and_analyze;
pub use pipeline::{Analysis, Pipeline, PipelineConfig, PipelineConfigBuilder, analyze_html};
pub use table::{ExtractConfig, RawTable, extract_table, extract_table_with_config};
pub use tidy::{LongTable, Observation, WideTable};
