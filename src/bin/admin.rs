//! CLI administration tool for shortly.
//!
//! Issues and revokes the API tokens that resolve to owner identities,
//! without going through the HTTP surface.
//!
//! # Usage
//!
//! ```bash
//! # Create a new API token for owner 1
//! cargo run --bin admin -- token create --owner 1
//!
//! # List all tokens
//! cargo run --bin admin -- token list
//!
//! # Revoke a token by id
//! cargo run --bin admin -- token revoke 3
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `TOKEN_SIGNING_SECRET` (required): must match the server's secret
//!
//! Only the keyed hash of a token is stored; the raw value is displayed
//! once at creation and cannot be recovered later.

use shortly::application::services::AuthService;
use shortly::domain::repositories::TokenRepository;
use shortly::infrastructure::persistence::PgTokenRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use rand::{Rng, distr::Alphanumeric};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shortly.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token
    Create {
        /// Owner id the token resolves to
        #[arg(short, long)]
        owner: i64,

        /// Token name (e.g., "Production API", "Mobile App")
        #[arg(short, long)]
        name: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token by id
    Revoke {
        /// Token id to revoke
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let signing_secret =
        std::env::var("TOKEN_SIGNING_SECRET").context("TOKEN_SIGNING_SECRET must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    let repo = Arc::new(PgTokenRepository::new(Arc::new(pool)));
    let auth = AuthService::new(repo.clone(), signing_secret);

    match cli.command {
        Commands::Token { action } => match action {
            TokenAction::Create { owner, name, yes } => {
                create_token(repo, &auth, owner, name, yes).await?;
            }
            TokenAction::List => {
                list_tokens(repo).await?;
            }
            TokenAction::Revoke { id } => {
                revoke_token(repo, id).await?;
            }
        },
    }

    Ok(())
}

/// Generates a random 48-character token value.
fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

/// Creates a new API token with interactive prompts.
async fn create_token(
    repo: Arc<PgTokenRepository>,
    auth: &AuthService,
    owner: i64,
    name: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "Create API Token".bright_blue().bold());
    println!();

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text("Production API")
            .interact_text()?,
    };

    let token_value = generate_token();

    println!("{}", "Token details:".bright_white().bold());
    println!("  Owner: {}", owner.to_string().cyan());
    println!("  Name:  {}", token_name.cyan());
    println!("  Token: {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let token_hash = auth.hash_token(&token_value);

    repo.create_token(owner, &token_name, &token_hash)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create token: {}", e))?;

    println!("{}", "Token created.".green().bold());
    println!();
    println!("{}", "Add this to your requests:".bright_white());
    println!(
        "  {}: Bearer {}",
        "Authorization".bright_cyan(),
        token_value.bright_yellow()
    );

    Ok(())
}

/// Lists all API tokens with status indicators.
async fn list_tokens(repo: Arc<PgTokenRepository>) -> Result<()> {
    let tokens = repo
        .list_tokens()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {}", e))?;

    if tokens.is_empty() {
        println!("{}", "No tokens found.".yellow());
        return Ok(());
    }

    println!("{}", "API Tokens".bright_blue().bold());
    println!();

    for token in tokens {
        let status = if token.is_revoked() {
            "revoked".red()
        } else {
            "active".green()
        };

        let last_used = token
            .last_used_at
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "  [{}] {} (owner {}) - {} - last used: {}",
            token.id,
            token.name.cyan(),
            token.owner_id,
            status,
            last_used
        );
    }

    Ok(())
}

/// Revokes a token by id.
async fn revoke_token(repo: Arc<PgTokenRepository>, id: i64) -> Result<()> {
    let revoked = repo
        .revoke_token(id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke token: {}", e))?;

    if revoked {
        println!("{}", format!("Token {} revoked.", id).green());
    } else {
        println!(
            "{}",
            format!("No active token with id {} found.", id).yellow()
        );
    }

    Ok(())
}
