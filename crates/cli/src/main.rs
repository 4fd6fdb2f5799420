use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, bail};
use clap::Parser;
use crimetrend_core::{
    Analysis, HeaderMapping, JsonConfig, MarkdownConfig, ModelFamily, Pipeline, PipelineConfig, Term, TextConfig,
    convert_to_json, convert_to_markdown, convert_to_text, fetch_file, fetch_stdin, fetch_url, long_to_csv,
    trend_to_csv,
};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for the model report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("Invalid format: {}. Valid options: text, markdown, json, csv", s)),
        }
    }
}

/// Scrape a crime-statistics table and fit per-category trend models
#[derive(Parser, Debug)]
#[command(name = "crimetrend")]
#[command(author = "crimetrend contributors")]
#[command(version)]
#[command(about = "Scrape crime statistics and fit per-category trends", long_about = None)]
struct Args {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Header file with one column name per line (default: <config dir>/crimetrend/headers.txt)
    #[arg(long, value_name = "FILE")]
    headers: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (text, markdown, json, csv)
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    format: OutputFormat,

    /// Model family (linear, standardized, poly)
    #[arg(long, default_value = "standardized", value_name = "FAMILY")]
    family: ModelFamily,

    /// Polynomial degree (poly family only)
    #[arg(long, value_name = "N")]
    degree: Option<usize>,

    /// Confidence level for coefficient intervals
    #[arg(long, default_value = "0.95", value_name = "LEVEL")]
    level: f64,

    /// Only model this category (repeatable)
    #[arg(short, long = "category", value_name = "NAME")]
    categories: Vec<String>,

    /// First year to keep
    #[arg(long, value_name = "YEAR")]
    from: Option<i32>,

    /// Last year to keep
    #[arg(long, value_name = "YEAR")]
    to: Option<i32>,

    /// Rank categories by this term (intercept, linear, quadratic, cubic)
    #[arg(long, default_value = "linear", value_name = "TERM")]
    rank: Term,

    /// Leave the ranking out of the report
    #[arg(long)]
    no_rank: bool,

    /// Include observed and fitted values per year (text, csv)
    #[arg(long)]
    trend: bool,

    /// Embed the modelled observations (json)
    #[arg(long)]
    observations: bool,

    /// CSS selector of the statistics table
    #[arg(long, default_value = "table", value_name = "SELECTOR")]
    table_selector: String,

    /// Number of header rows above the data
    #[arg(long, default_value = "2", value_name = "NUM")]
    header_rows: usize,

    /// Name of the year column in the header file
    #[arg(long, default_value = "Year", value_name = "NAME")]
    year_label: String,

    /// Abort on the first category that cannot be fitted
    #[arg(long)]
    strict: bool,

    /// Add a standardized fit pooled over every category
    #[arg(long)]
    global: bool,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn model_family(&self) -> anyhow::Result<ModelFamily> {
        match (self.family, self.degree) {
            (_, Some(0)) => bail!("Polynomial degree must be at least 1"),
            (ModelFamily::Polynomial { .. }, Some(degree)) => Ok(ModelFamily::Polynomial { degree }),
            (family, Some(_)) => bail!("--degree only applies to the poly family, not {}", family),
            (family, None) => Ok(family),
        }
    }

    fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut builder = PipelineConfig::builder()
            .timeout(self.timeout)
            .table_selector(&self.table_selector)
            .header_rows(self.header_rows)
            .year_label(&self.year_label)
            .family(self.model_family()?)
            .confidence_level(self.level)
            .strict(self.strict)
            .global(self.global)
            .categories(&self.categories);

        if let Some(ua) = &self.user_agent {
            builder = builder.user_agent(ua);
        }

        match (self.from, self.to) {
            (None, None) => {}
            (from, to) => {
                let (from, to) = (from.unwrap_or(i32::MIN), to.unwrap_or(i32::MAX));
                if from > to {
                    bail!("--from {} is after --to {}", from, to);
                }
                builder = builder.year_range(from, to);
            }
        }

        Ok(builder.build())
    }

    fn rank(&self) -> Option<Term> {
        (!self.no_rank).then_some(self.rank)
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "crimetrend_core=debug,crimetrend=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}

fn load_headers(path: Option<&PathBuf>) -> anyhow::Result<HeaderMapping> {
    let path = match path {
        Some(path) => path.clone(),
        None => HeaderMapping::default_path().context("No --headers given and no config directory available")?,
    };

    HeaderMapping::from_file(&path).with_context(|| format!("Failed to load header file: {}", path.display()))
}

async fn read_input(args: &Args, config: &PipelineConfig) -> anyhow::Result<String> {
    if args.input == "-" {
        if args.verbose {
            echo::print_step(1, 4, "Reading from stdin");
        }
        fetch_stdin().context("Failed to read from stdin")
    } else if args.input.starts_with("http://") || args.input.starts_with("https://") {
        if args.verbose {
            echo::print_step(1, 4, &format!("Fetching from {}", args.input.bright_white().underline()));
        }
        fetch_url(&args.input, &config.fetch).await.context("Failed to fetch URL")
    } else {
        if args.verbose {
            echo::print_step(1, 4, &format!("Reading from file {}", args.input.bright_white()));
        }
        fetch_file(&args.input).with_context(|| format!("Failed to read file: {}", args.input))
    }
}

fn render(args: &Args, analysis: &Analysis) -> anyhow::Result<String> {
    let output = match args.format {
        OutputFormat::Text => {
            convert_to_text(&analysis.models, &TextConfig { rank: args.rank(), include_trend: args.trend })
        }
        OutputFormat::Markdown => {
            convert_to_markdown(&analysis.models, &MarkdownConfig { title: analysis.title.clone(), rank: args.rank() })
        }
        OutputFormat::Json => {
            let observations = args.observations.then_some(&analysis.selected);
            let config = JsonConfig { rank: args.rank(), pretty: true };
            convert_to_json(&analysis.models, analysis.title.as_deref(), observations, &config)
                .context("Failed to serialize JSON")?
        }
        OutputFormat::Csv if args.trend => trend_to_csv(&analysis.models),
        OutputFormat::Csv => long_to_csv(&analysis.selected),
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    let config = args.pipeline_config()?;
    let headers = load_headers(args.headers.as_ref())?;

    let html = read_input(&args, &config).await?;
    tracing::debug!(bytes = html.len(), input = %args.input, "input read");
    if args.verbose {
        echo::print_detail("Size", &echo::format_size(html.len()));
        echo::print_detail("Columns", &headers.len().to_string());
        eprintln!();
        echo::print_step(2, 4, "Extracting and reshaping table");
        echo::print_step(3, 4, &format!("Fitting {} models", config.batch.family));
    }

    let analysis = Pipeline::with_config(config).analyze_html(&html, &headers).context("Analysis failed")?;

    if args.verbose {
        echo::print_analysis_details(&analysis);
    }
    if analysis.models.is_empty() {
        echo::print_warning("No category could be fitted");
    }

    let output = render(&args, &analysis)?;

    if args.verbose {
        echo::print_step(4, 4, "Writing output");
        echo::print_detail("Format", &format!("{:?}", args.format));
        eprintln!();
    }

    match &args.output {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            print!("{}", output);
        }
    }

    Ok(())
}
