//! REFRESH command - Run the refresh pipeline on the server.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use soldash_core::{Decile, NotificationEvent, StabilityVerdict};

use super::notifications::print_event;
use super::patterns::stability_label;
use super::{HumanReadable, api_url, make_request, output, print_title};

/// Arguments for the refresh command.
#[derive(Args)]
pub struct RefreshArgs {}

#[derive(Debug, Deserialize, Serialize)]
pub struct Metrics {
    pub hot_bucket: Decile,
    pub suggested_timing: u8,
    pub stability: StabilityVerdict,
}

/// Response from a refresh.
#[derive(Debug, Deserialize, Serialize)]
pub struct RefreshResponse {
    pub sequence: u64,
    pub applied: bool,
    pub using_fallback_data: bool,
    pub advisory: Option<String>,
    pub metrics: Option<Metrics>,
    pub stability: Option<StabilityVerdict>,
    pub events: Vec<NotificationEvent>,
    pub unread_count: usize,
}

impl HumanReadable for RefreshResponse {
    fn print_human(&self) {
        print_title(&format!("Refresh #{}", self.sequence), 60);

        if !self.applied {
            println!("  {}", "Superseded by a newer refresh".yellow());
            return;
        }
        if let Some(advisory) = &self.advisory {
            println!("  {} {}", "!".yellow().bold(), advisory.yellow());
            println!();
        }

        if let Some(metrics) = &self.metrics {
            println!("  {} D{}", "Hot decile:".cyan(), metrics.hot_bucket);
            println!("  {} {}%", "Suggested timing:".cyan(), metrics.suggested_timing);
            println!("  {} {}", "Stability:".cyan(), stability_label(metrics.stability));
        }

        println!();
        if self.events.is_empty() {
            println!("  {}", "(No changes)".dimmed());
        } else {
            for event in &self.events {
                print_event(event);
            }
        }
        println!();
        println!("  {} {}", "Unread:".cyan(), self.unread_count);
    }
}

/// Execute the refresh command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    _args: RefreshArgs,
) -> Result<()> {
    let url = api_url(base_url, "/refresh");
    let response: RefreshResponse = make_request(client.post(&url)).await?;

    output(&response, human)
}
