//! Command implementations and shared HTTP/output helpers.

pub mod games;
pub mod import;
pub mod insights;
pub mod leaderboard;
pub mod notifications;
pub mod patterns;
pub mod records;
pub mod refresh;

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Request timeout for every call.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Types that can print themselves for the `--human` flag.
pub trait HumanReadable {
    fn print_human(&self);
}

/// Error body returned by the server.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    error: ErrorDetails,
}

#[derive(Debug, serde::Deserialize)]
struct ErrorDetails {
    code: String,
    message: String,
}

/// Server rejected the request.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Structured API error.
    #[error("{status} {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Non-JSON error response.
    #[error("{status}: {body}")]
    Http { status: u16, body: String },
}

/// Build the shared HTTP client.
pub fn build_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?;
    Ok(client)
}

/// Join the API prefix onto the base URL.
pub fn api_url(base_url: &str, path: &str) -> String {
    format!("{}/api/v1{}", base_url.trim_end_matches('/'), path)
}

/// Send a request and decode a JSON response, mapping error bodies.
pub async fn make_request<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let err = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => CliError::Api {
                status: status.as_u16(),
                code: parsed.error.code,
                message: parsed.error.message,
            },
            Err(_) => CliError::Http {
                status: status.as_u16(),
                body,
            },
        };
        return Err(err.into());
    }

    Ok(response.json::<T>().await?)
}

/// Print as pretty JSON or in human-readable form.
pub fn output<T: Serialize + HumanReadable>(value: &T, human: bool) -> Result<()> {
    if human {
        value.print_human();
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Format a timestamp for display.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Truncate to `max` characters, appending an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

/// Print a section title with an underline.
pub fn print_title(title: &str, width: usize) {
    println!("{}", title.green().bold());
    println!("{}", "=".repeat(width));
    println!();
}
