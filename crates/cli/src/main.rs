//! `trackr` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`    — run migrations and start the API server.
//! - `migrate`  — run pending database migrations.
//! - `seed`     — populate an empty database with demo data.

use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use db::{DbPool, PoolConfig};
use workshop::seed::{self, SeedConfig, SeedOutcome};

#[derive(Parser)]
#[command(name = "trackr", about = "Vehicle repair workshop tracker", version)]
struct Cli {
    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct DatabaseArgs {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://trackr.db?mode=rwc")]
    database_url: String,

    #[arg(long, env = "MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,

    /// Seconds an operation may wait for a pooled connection.
    #[arg(long, env = "ACQUIRE_TIMEOUT_SECS", default_value_t = 30)]
    acquire_timeout_secs: u64,

    /// Seconds a write may wait for the database lock.
    #[arg(long, env = "BUSY_TIMEOUT_SECS", default_value_t = 30)]
    busy_timeout_secs: u64,
}

impl DatabaseArgs {
    async fn connect(&self) -> anyhow::Result<DbPool> {
        let config = PoolConfig {
            max_connections: self.max_connections,
            acquire_timeout: Duration::from_secs(self.acquire_timeout_secs),
            busy_timeout: Duration::from_secs(self.busy_timeout_secs),
        };
        db::pool::create_pool(&self.database_url, &config)
            .await
            .with_context(|| format!("failed to connect to {}", self.database_url))
    }

    async fn connect_and_migrate(&self) -> anyhow::Result<DbPool> {
        let pool = self.connect().await?;
        db::pool::run_migrations(&pool)
            .await
            .context("migration failed")?;
        Ok(pool)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
        bind: String,

        /// Requests running longer than this are answered with 408.
        #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
        request_timeout_secs: u64,

        /// Fixed RNG seed for `POST /testing/dataseed`.
        #[arg(long, env = "SEED_RNG")]
        seed_rng: Option<u64>,

        #[command(flatten)]
        db: DatabaseArgs,
    },
    /// Run pending database migrations.
    Migrate {
        #[command(flatten)]
        db: DatabaseArgs,
    },
    /// Seed an empty database with demo data.
    Seed {
        /// Fixed RNG seed, for reproducible data.
        #[arg(long, env = "SEED_RNG")]
        seed_rng: Option<u64>,

        #[arg(long, default_value_t = 3)]
        customers: usize,

        #[command(flatten)]
        db: DatabaseArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Command::Serve {
            bind,
            request_timeout_secs,
            seed_rng,
            db,
        } => {
            let pool = db.connect_and_migrate().await?;
            let mut state = api::AppState::new(pool);
            state.seed_rng = seed_rng;

            info!("Starting API server on {bind}");
            api::serve(&bind, state, Duration::from_secs(request_timeout_secs))
                .await
                .context("server error")?;
        }
        Command::Migrate { db } => {
            info!("Running migrations against {}", db.database_url);
            db.connect_and_migrate().await?;
            info!("Migrations applied successfully");
        }
        Command::Seed {
            seed_rng,
            customers,
            db,
        } => {
            let pool = db.connect_and_migrate().await?;
            let config = SeedConfig {
                customers,
                ..SeedConfig::default()
            };

            match seed::seed(&pool, &mut seed::rng_for(seed_rng), &config).await? {
                SeedOutcome::Seeded(report) => info!(?report, "Data seeded successfully"),
                SeedOutcome::Skipped => info!("Data already present, nothing seeded"),
            }
        }
    }

    Ok(())
}
