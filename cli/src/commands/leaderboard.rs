//! LEADERBOARD command - Top winners by total pot value.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use soldash_core::LeaderboardEntry;

use super::{HumanReadable, api_url, make_request, output, print_title, truncate};

/// Arguments for the leaderboard command.
#[derive(Args)]
pub struct LeaderboardArgs {
    /// Window: "all" or the N most recent records
    #[arg(short, long, default_value = "all")]
    pub window: String,

    /// Number of entries (1-100)
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(transparent)]
pub struct LeaderboardResponse(pub Vec<LeaderboardEntry>);

impl HumanReadable for LeaderboardResponse {
    fn print_human(&self) {
        print_title("Leaderboard", 60);

        if self.0.is_empty() {
            println!("  {}", "(No winners yet)".dimmed());
            return;
        }

        for (rank, entry) in self.0.iter().enumerate() {
            let favourite = entry
                .bucket_breakdown
                .iter()
                .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
                .map(|(d, _)| format!("D{}", d))
                .unwrap_or_default();
            println!(
                "  {:>3}. {:<18} {:>10.3}  {:>4} wins  {}",
                rank + 1,
                truncate(&entry.actor, 18).bold(),
                entry.total_value,
                entry.count,
                favourite.dimmed()
            );
        }
    }
}

/// Execute the leaderboard command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: LeaderboardArgs,
) -> Result<()> {
    let url = api_url(base_url, "/leaderboard");
    let limit = args.limit.to_string();
    let response: LeaderboardResponse = make_request(
        client
            .get(&url)
            .query(&[("window", args.window.as_str()), ("limit", limit.as_str())]),
    )
    .await?;

    output(&response, human)
}
