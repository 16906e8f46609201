//! StylePreview CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! sp-cli migrate
//!
//! # Create the demo salon and its operator
//! sp-cli seed
//!
//! # Create an admin user
//! sp-cli user create -e admin@example.com -n "Admin Name" -r admin --password 'secret'
//!
//! # Create an operator for an existing salon
//! sp-cli user create -e owner@example.com -n "Owner" -r salon --salon-slug demo --password 'secret'
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the demo salon
//! - `user create` - Create admin or salon users

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sp-cli")]
#[command(author, version, about = "StylePreview CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the demo salon and operator account
    Seed,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`admin` or `salon`)
        #[arg(short, long, default_value = "salon")]
        role: String,

        /// Slug of the salon a `salon` user operates
        #[arg(long)]
        salon_slug: Option<String>,

        /// Initial password
        #[arg(long)]
        password: String,
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

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::demo_salon().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                role,
                salon_slug,
                password,
            } => {
                commands::user::create_user(
                    &email,
                    &name,
                    &role,
                    salon_slug.as_deref(),
                    &password,
                )
                .await?;
            }
        },
    }
    Ok(())
}
