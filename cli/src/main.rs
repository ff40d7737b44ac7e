//! Command-line interface for the SolDash analytics service.
//!
//! - import: Upload game records from a JSON file
//! - games: List the most recent games
//! - records: Filtered, sorted, paginated record table
//! - patterns: Decile distribution, or the 10/30/50 comparison
//! - insights: Hot/cold zones and pattern shift
//! - leaderboard: Top winners by total pot value
//! - refresh: Run change detection on the server
//! - notifications: Show (and mark read) the notification log
//!
//! Configuration via environment:
//! - SOLDASH_URL: Base URL of the SolDash server (default: http://localhost:8001)

mod commands;

use clap::{Parser, Subcommand};

use commands::{
    games::GamesArgs, import::ImportArgs, insights::InsightsArgs, leaderboard::LeaderboardArgs,
    notifications::NotificationsArgs, patterns::PatternsArgs, records::RecordsArgs,
    refresh::RefreshArgs,
};

/// SolDash CLI
///
/// Query game analytics from the command line. Prints JSON by default;
/// pass --human for formatted output.
#[derive(Parser)]
#[command(name = "soldash")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output human-readable formatted text instead of JSON
    #[arg(long, global = true)]
    human: bool,

    /// SolDash server URL
    #[arg(
        long,
        env = "SOLDASH_URL",
        default_value = "http://localhost:8001",
        global = true
    )]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import game records from a JSON file
    Import(ImportArgs),

    /// List the most recent games
    Games(GamesArgs),

    /// Browse records with filters, sorting and paging
    Records(RecordsArgs),

    /// Show the decile pattern for recent games
    Patterns(PatternsArgs),

    /// Show strategic insights and pattern shift
    Insights(InsightsArgs),

    /// Show the top winners
    Leaderboard(LeaderboardArgs),

    /// Refresh patterns and detect changes
    Refresh(RefreshArgs),

    /// Show the notification log
    Notifications(NotificationsArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let client = match commands::build_client() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Import(args) => {
            commands::import::execute(&client, &cli.url, cli.human, args).await
        }
        Commands::Games(args) => commands::games::execute(&client, &cli.url, cli.human, args).await,
        Commands::Records(args) => {
            commands::records::execute(&client, &cli.url, cli.human, args).await
        }
        Commands::Patterns(args) => {
            commands::patterns::execute(&client, &cli.url, cli.human, args).await
        }
        Commands::Insights(args) => {
            commands::insights::execute(&client, &cli.url, cli.human, args).await
        }
        Commands::Leaderboard(args) => {
            commands::leaderboard::execute(&client, &cli.url, cli.human, args).await
        }
        Commands::Refresh(args) => {
            commands::refresh::execute(&client, &cli.url, cli.human, args).await
        }
        Commands::Notifications(args) => {
            commands::notifications::execute(&client, &cli.url, cli.human, args).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
