use crate::Result;
use crate::batch::{ModelCollection, RankedTerm};
use crate::model::Term;
use crate::tidy::LongTable;
use serde::Serialize;

/// Complete JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a> {
    /// Page title, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    /// Fitted models and failed categories
    pub models: &'a ModelCollection,
    /// Optional ranking by one term
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranking: Option<Ranking>,
    /// Optional tidy observations the models were fitted on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<&'a LongTable>,
}

/// A ranking section for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    pub term: Term,
    pub entries: Vec<RankedTerm>,
}

/// Configuration for JSON output
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Include a ranking by this term
    pub rank: Option<Term>,
    /// Pretty print JSON output
    pub pretty: bool,
}

/// Convert a model collection to JSON
///
/// `observations` is embedded as-is when given, so callers decide whether
/// the full long table or a selection goes into the report.
pub fn convert_to_json(
    collection: &ModelCollection, title: Option<&str>, observations: Option<&LongTable>, config: &JsonConfig,
) -> Result<String> {
    let ranking = config.rank.map(|term| Ranking { term, entries: collection.rank_by(term) });
    let output = JsonOutput { title, models: collection, ranking, observations };

    if config.pretty { Ok(serde_json::to_string_pretty(&output)?) } else { Ok(serde_json::to_string(&output)?) }
}

/// JSON formatter with configurable options
pub struct JsonFormatter {
    config: JsonConfig,
}

impl JsonFormatter {
    pub fn new(config: JsonConfig) -> Self {
        Self { config }
    }

    pub fn convert(
        &self, collection: &ModelCollection, title: Option<&str>, observations: Option<&LongTable>,
    ) -> Result<String> {
        convert_to_json(collection, title, observations, &self.config)
    }
}
