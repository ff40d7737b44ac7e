//! GAMES command - List the most recent records.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use soldash_core::Record;

use super::{HumanReadable, api_url, format_timestamp, make_request, output, print_title, truncate};

/// Arguments for the games command.
#[derive(Args)]
pub struct GamesArgs {
    /// Number of records to fetch (1-1000)
    #[arg(short, long, default_value_t = 50)]
    pub limit: usize,
}

/// Records, most recent first.
#[derive(Debug, Deserialize, Serialize)]
#[serde(transparent)]
pub struct GamesResponse(pub Vec<Record>);

/// One table row; shared with the records command.
pub(crate) fn print_record_row(record: &Record) {
    let time = record
        .timestamp
        .as_ref()
        .map(format_timestamp)
        .unwrap_or_default();
    println!(
        "  {:>8}  {:<16} {:>10.3}  {:>6.2}%  D{:<2}  {}",
        record.id.to_string().bold(),
        truncate(&record.actor, 16),
        record.value,
        record.position_percentile,
        record.bucket,
        time.dimmed()
    );
}

pub(crate) fn print_record_header() {
    println!(
        "  {:>8}  {:<16} {:>10}  {:>7}  {:<3}  {}",
        "ID".cyan(),
        "Winner".cyan(),
        "Pot".cyan(),
        "Ticket".cyan(),
        "Dec".cyan(),
        "Time".cyan()
    );
}

impl HumanReadable for GamesResponse {
    fn print_human(&self) {
        print_title("Recent Games", 80);

        if self.0.is_empty() {
            println!("  {}", "(No games imported)".dimmed());
            return;
        }

        print_record_header();
        for record in &self.0 {
            print_record_row(record);
        }
        println!();
        println!("  {} {}", "Total:".cyan(), self.0.len());
    }
}

/// Execute the games command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: GamesArgs,
) -> Result<()> {
    let url = api_url(base_url, "/games");
    let response: GamesResponse =
        make_request(client.get(&url).query(&[("limit", args.limit)])).await?;

    output(&response, human)
}
