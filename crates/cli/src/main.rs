//! Pear CLI - Database migrations and webhook tooling.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! pear-cli migrate
//!
//! # Print signature headers for a webhook body
//! pear-cli sign --body 'command=%2Fpear&text=rust&user_id=U1'
//!
//! # Show the seeds a user has picked
//! pear-cli history U024BE7LH
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `sign` - Compute Slack request signature headers
//! - `history` - List a user's fulfilled seeds

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pear-cli")]
#[command(author, version, about = "Pear bot CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Compute Slack signature headers for a request body
    Sign {
        /// Unix timestamp to sign at (default: now)
        #[arg(short, long)]
        timestamp: Option<i64>,

        /// Raw request body, exactly as it will be sent
        #[arg(short, long)]
        body: String,
    },
    /// List the seeds a user has picked
    History {
        /// Slack user ID
        user: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

#[allow(clippy::print_stdout)]
async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Sign { timestamp, body } => {
            let headers = commands::sign::run(timestamp, &body)?;
            println!("{}", commands::sign::curl_headers(&headers));
        }
        Commands::History { user } => {
            println!("{}", commands::history::run(&user).await?);
        }
    }
    Ok(())
}
