//! Page fetching from URLs, files, and stdin.
//!
//! The statistics page is normally retrieved over HTTP(S), but a saved copy
//! can be read from disk or piped in, which keeps runs reproducible.

use std::fs;
use std::path::PathBuf;
#[cfg(feature = "fetch")]
use std::time::Duration;

#[cfg(feature = "fetch")]
use reqwest::Client;
#[cfg(feature = "fetch")]
use url::Url;

use crate::{CrimetrendError, Result};

/// HTTP client configuration for fetching the statistics page.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: 30, user_agent: "Mozilla/5.0 (compatible; crimetrend/1.0)".to_string() }
    }
}

/// Fetches HTML content from a URL.
///
/// Performs a single GET request with no retry. Redirects are followed;
/// a non-success status is reported as [`CrimetrendError::HttpStatus`].
#[cfg(feature = "fetch")]
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<String> {
    let parsed_url = Url::parse(url).map_err(|e| CrimetrendError::InvalidUrl(e.to_string()))?;

    if !matches!(parsed_url.scheme(), "http" | "https") {
        return Err(CrimetrendError::InvalidUrl(format!(
            "unsupported scheme {:?} (expected http or https)",
            parsed_url.scheme()
        )));
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(CrimetrendError::Http)?;

    tracing::debug!(url = %parsed_url, timeout = config.timeout, "fetching page");

    let response = client
        .get(parsed_url.clone())
        .header("User-Agent", &config.user_agent)
        .header("Accept", "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                CrimetrendError::Timeout { timeout: config.timeout }
            } else {
                CrimetrendError::Http(e)
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(CrimetrendError::HttpStatus { status: status.as_u16(), url: parsed_url.to_string() });
    }

    let content = response.text().await?;
    tracing::debug!(bytes = content.len(), "page fetched");

    Ok(content)
}

/// Reads HTML content from a local file.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(CrimetrendError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(CrimetrendError::from)
    }
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    Ok(buffer)
}
