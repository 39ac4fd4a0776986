// ABOUTME: Erstiwe CLI - administrative command-line tool for the registration backend
// ABOUTME: Handles token batches, registrations, opt-outs, waitlist, reports, and export
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Issue 120 tokens for the current year
//! erstiwe-cli tokens generate 120
//!
//! # Register from a JSON payload
//! erstiwe-cli register --payload registrant.json
//!
//! # Opt out and promote the longest-waiting entrant
//! erstiwe-cli opt-out k3j9x0aa --email ada@example.org
//!
//! # Write the JSON snapshots of 2024
//! erstiwe-cli export --year 2024
//! ```

mod commands;
mod helpers;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use erstiwe_registration::{
    config::{DatabaseUrl, ServerConfig},
    database::Database,
    errors::{AppError, AppResult},
    export::Exporter,
    logging::LoggingConfig,
    notifications,
    registration::TokenManager,
    services::RegistrationService,
};
use tracing::info;

type Result<T> = AppResult<T>;

#[derive(Parser)]
#[command(
    name = "erstiwe-cli",
    about = "Erstiwe registration management CLI",
    long_about = "Command-line tool for issuing tokens, recording registrations and opt-outs, managing the waitlist, and exporting year snapshots."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Event year override
    #[arg(long, global = true)]
    event_year: Option<i32>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Token management commands
    Tokens {
        #[command(subcommand)]
        action: TokenCommand,
    },

    /// Register against a free token
    Register {
        /// JSON file holding the registration payload
        #[arg(long)]
        payload: PathBuf,
    },

    /// Opt out a token and offer its replacement to the waitlist
    OptOut {
        /// Token to opt out
        token: String,

        /// Only opt out if the token belongs to this email
        #[arg(long)]
        email: Option<String>,
    },

    /// Waitlist commands
    Waitlist {
        #[command(subcommand)]
        action: WaitlistCommand,
    },

    /// List registered participants
    Registrants {
        /// Year (defaults to the event year)
        #[arg(long)]
        year: Option<i32>,
    },

    /// List registrants holding a replacement token
    Successors {
        /// Year (defaults to the event year)
        #[arg(long)]
        year: Option<i32>,
    },

    /// Count registered participants
    Count {
        /// Year (defaults to the event year)
        #[arg(long)]
        year: Option<i32>,
    },

    /// Write JSON snapshots of registrants, waitlist, and successors
    Export {
        /// Year (defaults to the event year)
        #[arg(long)]
        year: Option<i32>,

        /// Output directory override
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum TokenCommand {
    /// Generate a batch of free tokens
    Generate {
        /// Number of tokens
        count: usize,
    },

    /// Show a token record
    Show {
        /// Token value
        token: String,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum WaitlistCommand {
    /// Add an email to the waitlist
    Add {
        /// Email address
        email: String,
    },

    /// List the waitlist, longest-waiting first
    List {
        /// Year (defaults to the event year)
        #[arg(long)]
        year: Option<i32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env().with_stderr();
    if cli.verbose {
        logging.level = "debug".into();
    }
    logging
        .init()
        .map_err(|e| AppError::internal(format!("Logging setup failed: {e}")))?;

    let mut config = ServerConfig::from_env()?;
    if let Some(url) = &cli.database_url {
        config.database.url = DatabaseUrl::parse_url(url)?;
    }
    if let Some(year) = cli.event_year {
        config.event.current_year = year;
    }
    info!("{}", config.summary());

    let database = Database::new(&config.database).await?;
    let manager = TokenManager::new(database.clone(), &config.event);
    let notifier = notifications::from_config(&config.notifications)
        .map_err(|e| AppError::config(e.to_string()))?;
    let service = RegistrationService::new(manager.clone(), notifier);

    let outcome = match cli.command {
        Command::Tokens { action } => match action {
            TokenCommand::Generate { count } => commands::tokens::generate(&service, count).await,
            TokenCommand::Show { token } => commands::tokens::show(&manager, &token).await,
        },
        Command::Register { payload } => commands::lifecycle::register(&service, &payload).await,
        Command::OptOut { token, email } => {
            commands::lifecycle::opt_out(&service, &token, email.as_deref()).await
        }
        Command::Waitlist { action } => match action {
            WaitlistCommand::Add { email } => commands::waitlist::add(&service, &email).await,
            WaitlistCommand::List { year } => commands::waitlist::list(&manager, year).await,
        },
        Command::Registrants { year } => commands::reports::registrants(&manager, year).await,
        Command::Successors { year } => commands::reports::successors(&manager, year).await,
        Command::Count { year } => commands::reports::count(&manager, year).await,
        Command::Export { year, dir } => {
            let mut export = config.export.clone();
            if let Some(dir) = dir {
                export.directory = dir;
            }
            commands::reports::export(&Exporter::new(export), &manager, year).await
        }
    };

    database.close().await;
    outcome
}
