use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("crimetrend")
        .version("1.0.0")
        .author("crimetrend contributors")
        .about("Scrape crime statistics and fit per-category trends")
        .arg(clap::arg!(<INPUT> "URL to fetch, local HTML file, or '-' for stdin"))
        .arg(
            clap::arg!(--headers <FILE> "Header file with one column name per line")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (text, markdown, json, csv)")
                .default_value("text")
                .value_parser(["text", "markdown", "json", "csv"]),
        )
        .arg(
            clap::arg!(--family <FAMILY> "Model family (linear, standardized, poly)")
                .default_value("standardized")
                .value_parser(["linear", "standardized", "poly"]),
        )
        .arg(clap::arg!(--degree <N> "Polynomial degree (poly family only)"))
        .arg(clap::arg!(--level <LEVEL> "Confidence level for coefficient intervals").default_value("0.95"))
        .arg(
            clap::arg!(-c --category <NAME> "Only model this category (repeatable)")
                .action(clap::ArgAction::Append),
        )
        .arg(clap::arg!(--from <YEAR> "First year to keep"))
        .arg(clap::arg!(--to <YEAR> "Last year to keep"))
        .arg(
            clap::arg!(--rank <TERM> "Rank categories by this term")
                .default_value("linear")
                .value_parser(["intercept", "linear", "quadratic", "cubic"]),
        )
        .arg(clap::arg!(--no_rank "Leave the ranking out of the report"))
        .arg(clap::arg!(--trend "Include observed and fitted values per year"))
        .arg(clap::arg!(--observations "Embed the modelled observations (json)"))
        .arg(clap::arg!(--table_selector <SELECTOR> "CSS selector of the statistics table").default_value("table"))
        .arg(clap::arg!(--header_rows <NUM> "Number of header rows above the data").default_value("2"))
        .arg(clap::arg!(--year_label <NAME> "Name of the year column in the header file").default_value("Year"))
        .arg(clap::arg!(--strict "Abort on the first category that cannot be fitted"))
        .arg(clap::arg!(--global "Add a standardized fit pooled over every category"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(clap::arg!(--user_agent <UA> "Custom User-Agent for HTTP requests"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "crimetrend", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "crimetrend", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "crimetrend", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "crimetrend", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
