//! RECORDS command - Query the record set with window, filters, and paging.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use soldash_core::Record;

use super::games::{print_record_header, print_record_row};
use super::{HumanReadable, api_url, make_request, output, print_title};

/// Arguments for the records command.
#[derive(Args)]
pub struct RecordsArgs {
    /// Window: "all" or the N most recent records
    #[arg(short, long, default_value = "all")]
    pub window: String,

    /// Case-insensitive winner substring
    #[arg(short, long)]
    pub search: Option<String>,

    /// Decile filter: "all" or 1-10
    #[arg(short, long, default_value = "all")]
    pub bucket: String,

    /// Sort mode: recent, oldest, highest, lowest
    #[arg(long, default_value = "recent")]
    pub sort: String,

    /// Page number (1-based)
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,
}

/// A record with its timing label.
#[derive(Debug, Deserialize, Serialize)]
pub struct RecordView {
    #[serde(flatten)]
    pub record: Record,
    pub timing: String,
}

/// One page of records.
#[derive(Debug, Deserialize, Serialize)]
pub struct RecordsResponse {
    pub items: Vec<RecordView>,
    pub total_count: usize,
    pub total_pages: usize,
    pub page: usize,
}

impl HumanReadable for RecordsResponse {
    fn print_human(&self) {
        print_title("Records", 80);

        if self.items.is_empty() {
            println!("  {}", "(No records match)".dimmed());
            return;
        }

        print_record_header();
        for view in &self.items {
            print_record_row(&view.record);
        }
        println!();
        println!(
            "  {} {} of {}  ({} matching)",
            "Page:".cyan(),
            self.page,
            self.total_pages,
            self.total_count
        );
    }
}

/// Execute the records command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: RecordsArgs,
) -> Result<()> {
    let url = api_url(base_url, "/records");
    let page = args.page.to_string();
    let mut query = vec![
        ("window", args.window.as_str()),
        ("bucket", args.bucket.as_str()),
        ("sort", args.sort.as_str()),
        ("page", page.as_str()),
    ];
    if let Some(search) = args.search.as_deref() {
        query.push(("search", search));
    }

    let response: RecordsResponse = make_request(client.get(&url).query(&query)).await?;

    output(&response, human)
}
