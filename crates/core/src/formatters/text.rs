use crate::batch::{ModelCollection, RankedTerm};
use crate::formatters::{format_number, format_p_value};
use crate::model::{FittedModel, Term};

const COLUMNS: [&str; 7] = ["term", "estimate", "std.error", "statistic", "p.value", "conf.low", "conf.high"];

/// Configuration for plain text output
#[derive(Debug, Clone, Default)]
pub struct TextConfig {
    /// Append a ranking of categories by this term
    pub rank: Option<Term>,

    /// Include observed and fitted values per year
    pub include_trend: bool,
}

/// Plain text formatter for model summaries
pub struct TextFormatter {
    config: TextConfig,
}

impl TextFormatter {
    pub fn new(config: TextConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, collection: &ModelCollection) -> String {
        convert_to_text(collection, &self.config)
    }
}

/// Render every model as an aligned coefficient table
pub fn convert_to_text(collection: &ModelCollection, config: &TextConfig) -> String {
    let mut output = String::new();

    for entry in &collection.models {
        output.push_str(&model_summary(&entry.model));
        if config.include_trend {
            output.push_str(&trend_table(&entry.model));
        }
        output.push('\n');
    }

    if let Some(global) = &collection.global {
        output.push_str(&model_summary(global));
        output.push('\n');
    }

    if !collection.failures.is_empty() {
        output.push_str("Failed fits\n");
        output.push_str(&"-".repeat(11));
        output.push('\n');
        for failure in &collection.failures {
            output.push_str(&format!("  {}: {}\n", failure.category, failure.error));
        }
        output.push('\n');
    }

    if let Some(term) = config.rank {
        output.push_str(&ranking_table(term, &collection.rank_by(term)));
    }

    output.trim_end().to_string() + "\n"
}

/// Header line plus coefficient table for one model
fn model_summary(model: &FittedModel) -> String {
    let title = format!("{} ({})", model.category, model.family);
    let mut out = format!("{}\n{}\n", title, "=".repeat(title.chars().count()));

    out.push_str(&format!(
        "n = {}, missing = {}, df = {}, sigma = {}, R² = {}\n",
        model.n_obs,
        model.n_missing,
        model.df_residual,
        format_number(model.sigma),
        format_number(model.r_squared)
    ));

    let rows: Vec<Vec<String>> = model
        .coefficients
        .iter()
        .map(|c| {
            vec![
                c.term.to_string(),
                format_number(c.estimate),
                format_number(c.std_error),
                format_number(c.statistic),
                format_p_value(c.p_value),
                format_number(c.conf_low),
                format_number(c.conf_high),
            ]
        })
        .collect();

    out.push_str(&aligned(&COLUMNS, &rows));
    out
}

fn trend_table(model: &FittedModel) -> String {
    let rows: Vec<Vec<String>> = model
        .fitted
        .iter()
        .map(|p| vec![p.year.to_string(), format_number(p.observed), format_number(p.fitted)])
        .collect();
    format!("\n{}", aligned(&["year", "observed", "fitted"], &rows))
}

fn ranking_table(term: Term, ranked: &[RankedTerm]) -> String {
    let title = format!("Ranking by {} term", term);
    let rows: Vec<Vec<String>> = ranked
        .iter()
        .enumerate()
        .map(|(i, r)| {
            vec![
                (i + 1).to_string(),
                r.category.clone(),
                format_number(r.coefficient.estimate),
                format_number(r.coefficient.conf_low),
                format_number(r.coefficient.conf_high),
            ]
        })
        .collect();

    format!(
        "{}\n{}\n{}",
        title,
        "=".repeat(title.chars().count()),
        aligned(&["rank", "category", "estimate", "conf.low", "conf.high"], &rows)
    )
}

/// Left-align text columns, right-align numeric ones
///
/// A column is numeric when every data cell parses as a number or reads `NA`.
fn aligned(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }
    let numeric: Vec<bool> = (0..header.len())
        .map(|i| !rows.is_empty() && rows.iter().all(|row| row.get(i).is_some_and(|cell| is_numeric(cell))))
        .collect();

    let render = |cells: Vec<&str>| -> String {
        let line: Vec<String> = cells
            .iter()
            .zip(widths.iter().zip(&numeric))
            .map(|(cell, (&w, &right))| if right { format!("{:>w$}", cell) } else { format!("{:<w$}", cell) })
            .collect();
        format!("  {}\n", line.join("  ").trim_end())
    };

    let mut out = render(header.to_vec());
    for row in rows {
        out.push_str(&render(row.iter().map(String::as_str).collect()));
    }
    out
}

fn is_numeric(cell: &str) -> bool {
    cell == "NA" || cell.trim_start_matches('<').parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{BatchConfig, BatchModeler};
    use crate::model::ModelFamily;
    use crate::tidy::{LongTable, Observation};

    fn collection() -> ModelCollection {
        let mut observations = Vec::new();
        for (i, year) in (2010..2016).enumerate() {
            observations.push(Observation { year, category: "Theft".into(), value: Some(100.0 + 4.0 * i as f64 + (i % 2) as f64) });
            observations.push(Observation { year, category: "Arson".into(), value: if i == 0 { Some(3.0) } else { None } });
        }
        let config = BatchConfig { family: ModelFamily::Linear, ..Default::default() };
        BatchModeler::new(config).fit_all(&LongTable::new(observations)).unwrap()
    }

    #[test]
    fn test_summary_lists_terms() {
        let text = convert_to_text(&collection(), &TextConfig::default());

        assert!(text.contains("Theft (linear)"));
        assert!(text.contains("intercept"));
        assert!(text.contains("linear"));
        assert!(text.contains("conf.high"));
    }

    #[test]
    fn test_failures_are_reported() {
        let text = convert_to_text(&collection(), &TextConfig::default());
        assert!(text.contains("Failed fits"));
        assert!(text.contains("Arson"));
    }

    #[test]
    fn test_ranking_and_trend() {
        let config = TextConfig { rank: Some(Term::Degree(1)), include_trend: true };
        let text = TextFormatter::new(config).convert(&collection());

        assert!(text.contains("Ranking by linear term"));
        assert!(text.contains("observed"));
        assert!(text.contains("2015"));
    }

    #[test]
    fn test_aligned_columns() {
        let table = aligned(&["a", "bb"], &[vec!["long".to_string(), "1".to_string()]]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "  a     bb");
        assert_eq!(lines[1], "  long   1");
    }

    #[test]
    fn test_ranking_names_are_left_aligned() {
        let rows = vec![
            vec!["1".to_string(), "Theft".to_string(), "-0.9950".to_string()],
            vec!["2".to_string(), "Sexual offences".to_string(), "NA".to_string()],
        ];
        let table = aligned(&["rank", "category", "estimate"], &rows);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "  rank  category         estimate");
        assert_eq!(lines[1], "     1  Theft             -0.9950");
        assert_eq!(lines[2], "     2  Sexual offences        NA");
    }

    #[test]
    fn test_global_model_is_printed() {
        let mut collection = collection();
        let data = collection.models[0].data.clone();
        collection.global = Some(
            crate::model::ModelFitter::new(ModelFamily::StandardizedLinear, Default::default())
                .fit_global(&data)
                .unwrap(),
        );
        let text = convert_to_text(&collection, &TextConfig::default());
        assert!(text.contains("All categories (standardized-linear)"));
    }
}
