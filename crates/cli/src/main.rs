//! Pomelo CLI - Shop client for the Pomelo backend.
//!
//! # Usage
//!
//! ```bash
//! # Start a login: prints the authorization URL to open in a browser
//! pomelo login
//!
//! # Finish the login with the code from the callback
//! pomelo login --code <AUTHORIZATION_CODE>
//! # ...or paste the whole callback URL
//! pomelo login --callback "http://localhost:3000/callback?code=..."
//!
//! # Browse and buy
//! pomelo products
//! pomelo buy 3:2 7:1
//! pomelo orders
//!
//! # Session
//! pomelo me
//! pomelo welcome
//! pomelo logout
//! ```
//!
//! Configuration comes from `POMELO_*` environment variables (or a `.env`
//! file); see `pomelo_client::config::ClientConfig`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use pomelo_client::config::ClientConfig;
use pomelo_client::session::SessionManager;

mod commands;

#[derive(Parser)]
#[command(name = "pomelo")]
#[command(author, version, about = "Pomelo shop client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in via the auth server (prints the URL, then exchanges the code)
    Login {
        /// Authorization code from the callback
        #[arg(short, long)]
        code: Option<String>,

        /// Full callback URL to extract the code from
        #[arg(long, conflicts_with = "code")]
        callback: Option<String>,
    },
    /// Show the logged-in user's profile
    Me,
    /// List the product catalog
    Products,
    /// List your orders
    Orders,
    /// Place an order for `PRODUCT_ID:QUANTITY` pairs
    Buy {
        /// Items to order, e.g. `3:2 7:1`
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Fetch your welcome message
    Welcome,
    /// Log out and clear cached credentials
    Logout,
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

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let mut manager = SessionManager::new(&config)?;

    match cli.command {
        Commands::Login { code, callback } => {
            commands::session::login(&mut manager, code, callback).await?;
        }
        Commands::Me => commands::session::me(&mut manager).await?,
        Commands::Products => commands::shop::products(&mut manager).await?,
        Commands::Orders => commands::shop::orders(&mut manager).await?,
        Commands::Buy { items } => commands::shop::buy(&mut manager, &items).await?,
        Commands::Welcome => commands::shop::welcome(&mut manager).await?,
        Commands::Logout => commands::session::logout(&mut manager)?,
    }
    Ok(())
}
