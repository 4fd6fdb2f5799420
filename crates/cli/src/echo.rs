use owo_colors::OwoColorize;

use crimetrend_core::Analysis;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "crimetrend".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Scrape crime statistics and fit per-category trends\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print a labelled detail line under the current step
pub fn print_detail(label: &str, value: &str) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value.bright_white());
}

/// Print the table and model summary of one run
pub fn print_analysis_details(analysis: &Analysis) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Analysis Details".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    if let Some(title) = &analysis.title {
        print_detail("Title", title);
    }
    print_detail(
        "Table",
        &format!("{} rows x {} columns", analysis.raw.n_rows(), analysis.raw.n_cols()),
    );
    print_detail(
        "Years",
        &format!(
            "{} ({} categories)",
            analysis.wide.n_rows(),
            analysis.wide.n_categories()
        ),
    );
    print_detail("Observations", &analysis.long.len().to_string());
    print_detail("Family", &analysis.models.family.to_string());
    print_detail("Fitted", &analysis.models.len().to_string());
    if let Some(global) = &analysis.models.global {
        print_detail("Pooled R²", &format!("{:.4}", global.r_squared));
    }
    eprintln!();
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
