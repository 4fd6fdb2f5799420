use crate::batch::ModelCollection;
use crate::formatters::{format_number, format_p_value};
use crate::model::Term;

/// Configuration for Markdown output
#[derive(Debug, Clone, Default)]
pub struct MarkdownConfig {
    /// Heading placed above the tables
    pub title: Option<String>,
    /// Append a ranking section for this term
    pub rank: Option<Term>,
}

/// Markdown formatter with configurable options
pub struct MarkdownFormatter {
    config: MarkdownConfig,
}

impl MarkdownFormatter {
    pub fn new(config: MarkdownConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, collection: &ModelCollection) -> String {
        convert_to_markdown(collection, &self.config)
    }
}

/// Render the collection as one tidy coefficient table per model family
pub fn convert_to_markdown(collection: &ModelCollection, config: &MarkdownConfig) -> String {
    let mut output = String::new();

    if let Some(title) = &config.title {
        output.push_str(&format!("# {}\n\n", escape(title)));
    }

    output.push_str(&format!("## Coefficients ({})\n\n", collection.family));
    output.push_str("| category | term | estimate | std.error | statistic | p.value | conf.low | conf.high |\n");
    output.push_str("|---|---|---:|---:|---:|---:|---:|---:|\n");

    for entry in &collection.models {
        for c in &entry.model.coefficients {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
                escape(&entry.model.category),
                c.term,
                format_number(c.estimate),
                format_number(c.std_error),
                format_number(c.statistic),
                format_p_value(c.p_value),
                format_number(c.conf_low),
                format_number(c.conf_high),
            ));
        }
    }

    if let Some(global) = &collection.global {
        output.push_str(&format!("\n## Pooled fit ({})\n\n", global.family));
        output.push_str("| term | estimate | std.error | p.value | conf.low | conf.high |\n");
        output.push_str("|---|---:|---:|---:|---:|---:|\n");
        for c in &global.coefficients {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                c.term,
                format_number(c.estimate),
                format_number(c.std_error),
                format_p_value(c.p_value),
                format_number(c.conf_low),
                format_number(c.conf_high),
            ));
        }
    }

    if !collection.failures.is_empty() {
        output.push_str("\n## Failed fits\n\n");
        for failure in &collection.failures {
            output.push_str(&format!("- **{}**: {}\n", escape(&failure.category), failure.error));
        }
    }

    if let Some(term) = config.rank {
        output.push_str(&format!("\n## Ranking by {} term\n\n", term));
        output.push_str("| rank | category | estimate | conf.low | conf.high |\n");
        output.push_str("|---:|---|---:|---:|---:|\n");
        for (i, ranked) in collection.rank_by(term).iter().enumerate() {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                i + 1,
                escape(&ranked.category),
                format_number(ranked.coefficient.estimate),
                format_number(ranked.coefficient.conf_low),
                format_number(ranked.coefficient.conf_high),
            ));
        }
    }

    output
}

/// Escape characters that would break a table cell
fn escape(text: &str) -> String {
    text.replace('|', "\\|")
}
