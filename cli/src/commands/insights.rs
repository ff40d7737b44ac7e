//! INSIGHTS command - Hot/cold zones, recommendation, and trend.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use soldash_core::{Decile, StabilityVerdict};

use super::patterns::stability_label;
use super::{HumanReadable, api_url, make_request, output, print_title};

/// Arguments for the insights command.
#[derive(Args)]
pub struct InsightsArgs {
    /// Number of recent records to analyze (1-100)
    #[arg(short, long, default_value_t = 10)]
    pub count: usize,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PatternInsights {
    pub hot_zones: Vec<Decile>,
    pub cold_zones: Vec<Decile>,
    pub most_common_range: String,
    pub least_common_range: String,
    pub sample_size: usize,
    pub recommendation: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ShiftAnalysis {
    pub most_common_10: Decile,
    pub most_common_30: Decile,
    pub most_common_50: Decile,
    pub consistent: bool,
    pub trend: String,
    pub trend_description: String,
    pub stability: StabilityVerdict,
}

/// Response from the insights endpoint.
#[derive(Debug, Deserialize, Serialize)]
pub struct InsightsResponse {
    pub pattern_insights: PatternInsights,
    pub shift_analysis: ShiftAnalysis,
}

fn join_deciles(deciles: &[Decile]) -> String {
    if deciles.is_empty() {
        return "none".to_string();
    }
    deciles
        .iter()
        .map(|d| format!("D{}", d))
        .collect::<Vec<_>>()
        .join(", ")
}

impl HumanReadable for InsightsResponse {
    fn print_human(&self) {
        let insights = &self.pattern_insights;
        let shift = &self.shift_analysis;

        print_title("Strategic Insights", 70);

        println!("  {} {}", "Sample:".cyan(), insights.sample_size);
        println!("  {} {}", "Hot zones:".cyan(), join_deciles(&insights.hot_zones).red());
        println!("  {} {}", "Cold zones:".cyan(), join_deciles(&insights.cold_zones).blue());
        println!("  {} {}", "Most common:".cyan(), insights.most_common_range);
        println!("  {} {}", "Least common:".cyan(), insights.least_common_range);
        println!();
        println!("  {}", insights.recommendation.bold());
        println!();
        println!("{}", "Pattern Shift".yellow());
        println!("{}", "-".repeat(70));
        println!(
            "  {} D{} / D{} / D{}",
            "Hot (10/30/50):".cyan(),
            shift.most_common_10,
            shift.most_common_30,
            shift.most_common_50
        );
        println!("  {} {}", "Stability:".cyan(), stability_label(shift.stability));
        println!("  {} {}", "Trend:".cyan(), shift.trend_description);
    }
}

/// Execute the insights command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: InsightsArgs,
) -> Result<()> {
    let url = api_url(base_url, "/insights");
    let response: InsightsResponse =
        make_request(client.get(&url).query(&[("count", args.count)])).await?;

    output(&response, human)
}
