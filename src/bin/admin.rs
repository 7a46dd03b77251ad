//! CLI administration tool for subdomain-registry.
//!
//! Runs registry operations directly against PostgreSQL, without going through
//! the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Record hostnames
//! cargo run --bin admin -- insert www.example.com api.example.com
//!
//! # List the subdomains of a domain
//! cargo run --bin admin -- lookup example.com --full
//!
//! # Suffixes a name is registered under
//! cargo run --bin admin -- tld example
//!
//! # Rebuild the uniqueness projections and show statistics
//! cargo run --bin admin -- project
//! cargo run --bin admin -- stats
//!
//! # Database tools
//! cargo run --bin admin -- db check
//! cargo run --bin admin -- db migrate
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `DATABASE_URL` (or `DB_*`), `MAX_DOCUMENT_SIZE`,
//! `STORAGE_TIMEOUT_SECONDS`, optional `REDIS_URL`.

use subdomain_registry::config::{self, Config, StorageBackend};
use subdomain_registry::infrastructure::persistence::{PgShardRepository, PgUniqueRepository};
use subdomain_registry::server::{connect_cache, connect_database};
use subdomain_registry::state::AppState;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing subdomain-registry.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Record one or more hostnames
    Insert {
        #[arg(required = true)]
        hostnames: Vec<String>,
    },

    /// List the subdomains recorded for a domain
    Lookup {
        domain: String,

        /// Print full hostnames instead of labels
        #[arg(short, long)]
        full: bool,
    },

    /// List the suffixes a second-level name is recorded under
    Tld { label: String },

    /// Run the uniqueness projector once
    Project,

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Apply pending migrations
    Migrate {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    if config.storage_backend != StorageBackend::Postgres {
        anyhow::bail!("admin works against PostgreSQL only; unset STORAGE_BACKEND=memory");
    }

    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL must be set")?;
    let pool = connect_database(&config, &database_url).await?;

    match cli.command {
        Commands::Db { action } => handle_db_action(action, &pool).await?,
        command => {
            let state = build_state(&config, pool).await;
            handle_command(command, &state).await?;
        }
    }

    Ok(())
}

async fn build_state(config: &Config, pool: PgPool) -> AppState {
    let pool = Arc::new(pool);
    AppState::new(
        Arc::new(PgShardRepository::new(pool.clone())),
        Arc::new(PgUniqueRepository::new(pool)),
        connect_cache(config).await,
        config.store_limits(),
    )
}

/// Dispatches registry commands.
async fn handle_command(command: Commands, state: &AppState) -> Result<()> {
    match command {
        Commands::Insert { hostnames } => insert(state, hostnames).await,
        Commands::Lookup { domain, full } => lookup(state, &domain, full).await,
        Commands::Tld { label } => tld(state, &label).await,
        Commands::Project => project(state).await,
        Commands::Stats => stats(state).await,
        Commands::Db { .. } => Ok(()),
    }
}

async fn insert(state: &AppState, hostnames: Vec<String>) -> Result<()> {
    println!("{}", "📥 Insert".bright_blue().bold());
    println!();

    let results = state.shard_service.insert_many(&hostnames).await;
    let mut failed = 0;

    for (hostname, result) in hostnames.iter().zip(results) {
        match result {
            Ok(outcome) => println!(
                "  {:<40} {} {}",
                hostname.cyan(),
                outcome.status.as_str().green(),
                format!("(shard {})", outcome.shard).bright_black()
            ),
            Err(e) => {
                failed += 1;
                println!("  {:<40} {}", hostname.cyan(), e.to_string().red());
            }
        }
    }

    println!();
    if failed > 0 {
        anyhow::bail!("{} of {} hostnames failed", failed, hostnames.len());
    }
    Ok(())
}

/// Prints every label of a domain, one per line.
async fn lookup(state: &AppState, domain: &str, full: bool) -> Result<()> {
    let items = if full {
        state.shard_service.lookup_full(domain).await?
    } else {
        state.shard_service.lookup(domain).await?
    };
    let shards = state.shard_service.shard_count(domain).await?;

    if items.is_empty() {
        println!("{}", format!("  Nothing recorded for {}", domain).yellow());
        return Ok(());
    }

    for item in &items {
        if item.is_empty() {
            println!("  {}", "(apex)".bright_black());
        } else {
            println!("  {}", item);
        }
    }

    println!();
    println!(
        "  Total: {} in {} shard(s)",
        items.len().to_string().bright_white().bold(),
        shards.to_string().bright_white().bold()
    );

    Ok(())
}

async fn tld(state: &AppState, label: &str) -> Result<()> {
    let suffixes = state.shard_service.tld_lookup(label).await?;

    if suffixes.is_empty() {
        println!("{}", format!("  No suffixes recorded for {}", label).yellow());
        return Ok(());
    }

    for suffix in &suffixes {
        println!("  {}.{}", label, suffix.cyan());
    }

    Ok(())
}

async fn project(state: &AppState) -> Result<()> {
    println!("{}", "🔄 Running uniqueness projection...".bright_blue());

    let summary = state
        .projector_service
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Projection failed: {}", e))?;

    println!();
    println!("  Documents scanned: {}", summary.documents_scanned.to_string().bright_white());
    println!("  Labels scanned:    {}", summary.labels_scanned.to_string().bright_white());
    println!("  New TLDs:          {}", summary.new_tlds.to_string().bright_green().bold());
    println!("  New domains:       {}", summary.new_domains.to_string().bright_green().bold());
    println!("  New hostnames:     {}", summary.new_full_domains.to_string().bright_green().bold());
    println!("  New subs:          {}", summary.new_subs.to_string().bright_green().bold());
    println!("  Took:              {} ms", summary.duration_ms);
    println!();

    Ok(())
}

/// Displays collection sizes.
async fn stats(state: &AppState) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let report = state.stats_service.report().await?;

    println!(
        "  Shard documents: {}",
        report.total_documents.to_string().bright_green().bold()
    );
    println!(
        "  Unique TLDs:     {}",
        report.unique_tlds.to_string().bright_green().bold()
    );
    println!(
        "  Unique domains:  {}",
        report.unique_domains.to_string().bright_green().bold()
    );
    println!(
        "  Unique hosts:    {}",
        report.unique_full_domains.to_string().bright_green().bold()
    );
    println!(
        "  Unique subs:     {}",
        report.unique_subs.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Migrate { yes } => {
            let migrator = sqlx::migrate!("./migrations");

            println!("{}", "🗄️  Migrations".bright_blue().bold());
            for migration in migrator.iter() {
                println!(
                    "  {} {}",
                    migration.version.to_string().bright_black(),
                    migration.description.cyan()
                );
            }
            println!();

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("Apply pending migrations?")
                    .default(true)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            migrator
                .run(pool)
                .await
                .context("Failed to apply migrations")?;

            println!("{}", "✅ Migrations applied".green().bold());
        }
    }

    Ok(())
}
