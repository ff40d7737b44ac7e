//! IMPORT command - Upload game records from a JSON file.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use soldash_core::Record;

use super::{HumanReadable, api_url, make_request, output};

/// Arguments for the import command.
#[derive(Args)]
pub struct ImportArgs {
    /// JSON file holding an array of records or `{"games": [...]}`
    pub file: PathBuf,
}

/// Accepted file layouts.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImportFile {
    Wrapped { games: Vec<Record> },
    Bare(Vec<Record>),
}

impl ImportFile {
    fn into_records(self) -> Vec<Record> {
        match self {
            Self::Wrapped { games } | Self::Bare(games) => games,
        }
    }
}

#[derive(Debug, Serialize)]
struct ImportRequest {
    games: Vec<Record>,
}

/// Response from importing records.
#[derive(Debug, Deserialize, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub total_games: usize,
    pub newly_inserted: usize,
    pub duplicates_skipped: usize,
    pub message: String,
}

impl HumanReadable for ImportResponse {
    fn print_human(&self) {
        let marker = if self.success {
            "✓".green()
        } else {
            "✗".red()
        };
        println!("{} {}", marker, self.message);
        println!("  {} {}", "Submitted:".cyan(), self.total_games);
        println!("  {} {}", "Inserted:".cyan(), self.newly_inserted);
        println!(
            "  {} {}",
            "Duplicates:".cyan(),
            self.duplicates_skipped.to_string().dimmed()
        );
    }
}

fn read_records(args: &ImportArgs) -> Result<Vec<Record>> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let parsed: ImportFile = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid record file", args.file.display()))?;
    Ok(parsed.into_records())
}

/// Execute the import command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: ImportArgs,
) -> Result<()> {
    let games = read_records(&args)?;
    if games.is_empty() {
        bail!("{} contains no records", args.file.display());
    }

    let url = api_url(base_url, "/import");
    let response: ImportResponse =
        make_request(client.post(&url).json(&ImportRequest { games })).await?;

    output(&response, human)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_layouts_parse() {
        let record = r#"{"id":1,"value":2.0,"winning_key":3,"actor":"a","position_percentile":15.0,"bucket":2}"#;

        let wrapped: ImportFile = serde_json::from_str(&format!(r#"{{"games":[{}]}}"#, record)).unwrap();
        assert_eq!(wrapped.into_records().len(), 1);

        let bare: ImportFile = serde_json::from_str(&format!("[{}]", record)).unwrap();
        assert_eq!(bare.into_records()[0].actor, "a");
    }
}
