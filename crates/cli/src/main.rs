//! StoreLens CLI - migrations, sample data and ad hoc agent queries.
//!
//! # Usage
//!
//! ```bash
//! # Apply the analytics schema
//! storelens migrate
//!
//! # Replace the dataset with freshly generated sample data
//! storelens seed --users 100 --products 50 --seed 42
//!
//! # Ask the agents a question
//! storelens query "Show me the revenue report for 2 weeks"
//! storelens query "How engaged are users?" --agent user_behavior_agent
//!
//! # Inspect the agents and the dataset
//! storelens capabilities
//! storelens stats
//! ```
//!
//! All commands read `API_DATABASE_URL` (or `DATABASE_URL`) and the cost
//! assumptions from the environment, the same way the API server does.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "storelens")]
#[command(author, version, about = "StoreLens CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Clear the dataset and load generated sample data
    Seed {
        /// Number of shoppers to generate
        #[arg(long, default_value_t = 100)]
        users: usize,

        /// Number of catalog entries to generate
        #[arg(long, default_value_t = 50)]
        products: usize,

        /// RNG seed; the same seed reproduces the same dataset
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Answer a natural-language question with the agents
    Query {
        /// The question
        text: String,

        /// `auto`, `user_behavior_agent` or `financial_reporting_agent`
        #[arg(short, long, default_value = "auto")]
        agent: String,
    },
    /// Print the registered agents and their tools as JSON
    Capabilities,
    /// Print row counts per table
    Stats,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storelens_cli=info,storelens_api=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed {
            users,
            products,
            seed,
        } => commands::seed::run(users, products, seed).await?,
        Commands::Query { text, agent } => commands::query::run(&text, &agent).await?,
        Commands::Capabilities => commands::query::capabilities().await?,
        Commands::Stats => commands::stats::run().await?,
    }
    Ok(())
}
