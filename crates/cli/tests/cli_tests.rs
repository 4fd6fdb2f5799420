//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("crimetrend")
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn table() -> String {
    get_fixture_path("crime_table.html")
}

fn headers() -> String {
    get_fixture_path("headers.txt")
}

#[test]
fn test_cli_file_input() {
    cmd()
        .args([table().as_str(), "--headers", &headers()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Theft (standardized-linear)"))
        .stdout(predicate::str::contains("Ranking by linear term"));
}

#[test]
fn test_cli_stdin_input() {
    let html = std::fs::read_to_string(table()).unwrap();
    cmd()
        .args(["-", "--headers", &headers()])
        .write_stdin(html)
        .assert()
        .success()
        .stdout(predicate::str::contains("Fraud"));
}

#[test]
fn test_cli_ranking_order() {
    cmd()
        .args([table().as_str(), "--headers", &headers(), "--family", "linear"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"\n\s+1\s+Theft\s").unwrap())
        .stdout(predicate::str::is_match(r"\n\s+5\s+Fraud\s").unwrap())
        .stdout(predicate::str::is_match(r"\n\s+6\s+Total\s").unwrap());
}

#[test]
fn test_cli_standardized_ranking_order() {
    cmd()
        .args([table().as_str(), "--headers", &headers()])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"\n\s+1\s+Theft\s").unwrap())
        .stdout(predicate::str::is_match(r"\n\s+6\s+Fraud\s").unwrap());
}

#[test]
fn test_cli_no_rank() {
    cmd()
        .args([table().as_str(), "--headers", &headers(), "--no-rank"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ranking").not());
}

#[test]
fn test_cli_cubic_family() {
    cmd()
        .args([table().as_str(), "--headers", &headers(), "--family", "poly", "--rank", "cubic"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Assault (polynomial-3)"))
        .stdout(predicate::str::contains("Ranking by cubic term"));
}

#[test]
fn test_cli_degree_needs_poly() {
    cmd()
        .args([table().as_str(), "--headers", &headers(), "--degree", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--degree"));
}

#[test]
fn test_cli_huge_degree_fails_cleanly() {
    cmd()
        .args([table().as_str(), "--headers", &headers(), "--family", "poly", "--degree", "18446744073709551615"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed fits"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn test_cli_global_fit() {
    cmd()
        .args([table().as_str(), "--headers", &headers(), "--global", "-c", "Theft", "-c", "Fraud"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All categories (standardized-linear)"))
        .stdout(predicate::str::contains("n = 24"));
}

#[test]
fn test_cli_markdown_format() {
    cmd()
        .args(["-f", "markdown", &table(), "--headers", &headers()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Anmälda brott"))
        .stdout(predicate::str::contains("| Theft | linear |"));
}

#[test]
fn test_cli_json_format() {
    let output = cmd()
        .args(["-f", "json", "--observations", "-c", "Theft", "-c", "Fraud", &table(), "--headers", &headers()])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["models"]["models"].as_array().unwrap().len(), 2);
    assert_eq!(value["observations"].as_array().unwrap().len(), 24);
    assert_eq!(value["ranking"]["entries"][0]["category"], "Theft");
}

#[test]
fn test_cli_csv_long_table() {
    cmd()
        .args(["-f", "csv", &table(), "--headers", &headers(), "--from", "2018"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("year,category,value\n2018,Total,1549916\n"));
}

#[test]
fn test_cli_csv_trend() {
    cmd()
        .args(["-f", "csv", "--trend", "-c", "Drug offences", &table(), "--headers", &headers()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("category,year,observed,fitted\nDrug offences,2008,89501,"));
}

#[test]
fn test_cli_output_file() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("report.txt");

    cmd()
        .args(["-o", output.to_str().unwrap()])
        .args([table().as_str(), "--headers", &headers()])
        .assert()
        .success();

    assert!(output.exists());
    assert!(std::fs::read_to_string(output).unwrap().contains("Sexual offences"));
}

#[test]
fn test_cli_header_mismatch() {
    cmd()
        .args([table().as_str(), "--headers", &get_fixture_path("headers_short.txt")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("7"));
}

#[test]
fn test_cli_unknown_category() {
    cmd()
        .args([table().as_str(), "--headers", &headers(), "-c", "Arson"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Arson"));
}

#[test]
fn test_cli_no_table() {
    cmd()
        .args([get_fixture_path("no_table.html").as_str(), "--headers", &headers()])
        .assert()
        .failure();
}

#[test]
fn test_cli_invalid_file() {
    cmd().args(["nonexistent.html", "--headers", &headers()]).assert().failure();
}

#[test]
fn test_cli_missing_header_file() {
    cmd().args([table().as_str(), "--headers", "nonexistent.txt"]).assert().failure();
}

#[test]
fn test_cli_invalid_level() {
    cmd()
        .args([table().as_str(), "--headers", &headers(), "--level", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("confidence level"));
}

#[test]
fn test_cli_strict_mode() {
    cmd()
        .args([table().as_str(), "--headers", &headers(), "--strict", "--from", "2019", "--family", "linear"])
        .assert()
        .failure();
}

#[test]
fn test_cli_isolated_failures() {
    cmd()
        .args([table().as_str(), "--headers", &headers(), "--from", "2019", "--family", "linear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed fits"));
}

#[test]
fn test_cli_verbose() {
    cmd()
        .args(["-v", &table(), "--headers", &headers()])
        .assert()
        .success()
        .stderr(predicate::str::contains("crimetrend"))
        .stderr(predicate::str::contains("Analysis Details"));
}

#[test]
fn test_cli_invalid_format() {
    cmd()
        .args(["-f", "xml", &table(), "--headers", &headers()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid format"));
}
