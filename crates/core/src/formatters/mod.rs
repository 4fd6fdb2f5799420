pub mod csv;
pub mod json;
pub mod markdown;
pub mod text;

pub use csv::{long_to_csv, trend_to_csv};
pub use json::{JsonConfig, JsonFormatter, convert_to_json};
pub use markdown::{MarkdownConfig, MarkdownFormatter, convert_to_markdown};
pub use text::{TextConfig, TextFormatter, convert_to_text};

/// Renders a number for a report cell; undefined values print as `NA`.
pub(crate) fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NA".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Inf".to_string() } else { "-Inf".to_string() }
    } else if value != 0.0 && (value.abs() >= 1e6 || value.abs() < 1e-4) {
        format!("{:.3e}", value)
    } else {
        format!("{:.4}", value)
    }
}

/// Renders a p-value the way regression summaries usually do.
pub(crate) fn format_p_value(p: f64) -> String {
    if p.is_nan() {
        "NA".to_string()
    } else if p < 1e-4 {
        "<0.0001".to_string()
    } else {
        format!("{:.4}", p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(f64::NAN), "NA");
        assert_eq!(format_number(0.0), "0.0000");
        assert_eq!(format_number(2.5), "2.5000");
        assert_eq!(format_number(1234567.0), "1.235e6");
    }

    #[test]
    fn test_format_p_value() {
        assert_eq!(format_p_value(0.00001), "<0.0001");
        assert_eq!(format_p_value(0.0312), "0.0312");
    }
}
