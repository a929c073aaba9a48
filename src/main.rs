use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{CommandFactory, Parser, Subcommand};
use subtally::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Evaluate renewals as of this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Use the configured fallback rates instead of fetching live ones
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for subtally::AppCommand {
    fn from(cmd: Commands) -> subtally::AppCommand {
        match cmd {
            Commands::Summary => subtally::AppCommand::Summary,
            Commands::Insights => subtally::AppCommand::Insights,
            Commands::List => subtally::AppCommand::List,
            Commands::Upcoming { limit } => subtally::AppCommand::Upcoming { limit },
            Commands::Digest { dry_run } => subtally::AppCommand::Digest { dry_run },
            Commands::Trials => subtally::AppCommand::Trials,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display burn rate, projections and cash-flow runway
    Summary,
    /// Display redundant categories, cancelled savings and category spend
    Insights,
    /// List all subscriptions with their monthly cost
    List,
    /// Display the next renewals
    Upcoming {
        /// Number of renewals to show
        #[arg(short, long, default_value_t = 4)]
        limit: usize,
    },
    /// Send renewal and trial reminders that are due
    Digest {
        /// Print reminders without recording them as sent
        #[arg(long)]
        dry_run: bool,
    },
    /// Display trials that are about to convert
    Trials,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let now = cli
        .today
        .map(|date| date.and_time(Utc::now().time()).and_utc());
    let options = subtally::RunOptions {
        now,
        offline: cli.offline,
    };

    let result = match cli.command {
        Some(Commands::Setup) => subtally::cli::setup::setup(),
        Some(cmd) => subtally::run_command(cmd.into(), cli.config_path.as_deref(), &options).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
