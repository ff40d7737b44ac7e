//! PATTERNS command - Decile distribution for recent records.

use std::collections::BTreeMap;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use soldash_core::{BucketedPattern, Decile, PatternSet, StabilityVerdict};

use super::{HumanReadable, api_url, make_request, output, print_title};

/// Width of a 100% bar.
const BAR_WIDTH: usize = 40;

/// Arguments for the patterns command.
#[derive(Args)]
pub struct PatternsArgs {
    /// Number of recent records to analyze (1-100)
    #[arg(short, long, default_value_t = 10)]
    pub count: usize,

    /// Compare the 10/30/50 windows instead
    #[arg(long)]
    pub compare: bool,
}

/// Pattern over the last N records.
#[derive(Debug, Deserialize, Serialize)]
pub struct PatternResponse {
    pub requested: usize,
    #[serde(flatten)]
    pub pattern: BucketedPattern,
    pub hottest_range: String,
    pub coldest_range: String,
    pub suggested_timing: u8,
    pub timing: String,
}

/// Patterns across the three windows.
#[derive(Debug, Deserialize, Serialize)]
pub struct CompareResponse {
    #[serde(flatten)]
    pub patterns: PatternSet,
    pub stability: StabilityVerdict,
}

fn print_bars(percentages: &BTreeMap<Decile, f64>, hottest: Decile) {
    for (decile, percent) in percentages {
        let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
        let bar = "█".repeat(filled.min(BAR_WIDTH));
        let bar = if *decile == hottest {
            bar.red().bold()
        } else {
            bar.normal()
        };
        println!("  D{:<2} {:>6.2}% {}", decile, percent, bar);
    }
}

impl HumanReadable for PatternResponse {
    fn print_human(&self) {
        print_title(&format!("Pattern: last {} games", self.requested), 60);

        if self.pattern.sample_size == 0 {
            println!("  {}", "(No games imported)".dimmed());
            return;
        }

        print_bars(&self.pattern.percentages, self.pattern.hottest_bucket);
        println!();
        println!("  {} {}", "Sample:".cyan(), self.pattern.sample_size);
        println!("  {} {}", "Hottest:".cyan(), self.hottest_range);
        println!("  {} {}", "Coldest:".cyan(), self.coldest_range);
        println!(
            "  {} {}% of pot ({})",
            "Suggested timing:".cyan(),
            self.suggested_timing,
            self.timing
        );
    }
}

/// Colored stability label.
pub(crate) fn stability_label(verdict: StabilityVerdict) -> colored::ColoredString {
    match verdict {
        StabilityVerdict::Stable => verdict.to_string().green().bold(),
        StabilityVerdict::SemiStable => verdict.to_string().yellow().bold(),
        StabilityVerdict::Unstable => verdict.to_string().red().bold(),
    }
}

impl HumanReadable for CompareResponse {
    fn print_human(&self) {
        print_title("Pattern Comparison", 60);

        for (label, pattern) in [
            ("Last 10", &self.patterns.last_10),
            ("Last 30", &self.patterns.last_30),
            ("Last 50", &self.patterns.last_50),
        ] {
            println!(
                "  {:<8} hot D{:<2} cold D{:<2} ({} games)",
                label.cyan(),
                pattern.hottest_bucket,
                pattern.coldest_bucket,
                pattern.sample_size
            );
        }
        println!();
        println!("  {} {}", "Stability:".cyan(), stability_label(self.stability));
    }
}

/// Execute the patterns command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: PatternsArgs,
) -> Result<()> {
    if args.compare {
        let url = api_url(base_url, "/patterns/compare");
        let response: CompareResponse = make_request(client.get(&url)).await?;
        return output(&response, human);
    }

    let url = api_url(base_url, "/patterns");
    let response: PatternResponse =
        make_request(client.get(&url).query(&[("count", args.count)])).await?;

    output(&response, human)
}
