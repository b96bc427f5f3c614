use std::net::Ipv4Addr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use salesboard::api::{self, AppState};
use salesboard::config::Config;
use salesboard_core::feed::HttpFeed;
use salesboard_core::ingestion::{self, SeedOutcome};
use salesboard_core::repository::PostgresRepository;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Salesboard sales reporting API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP API server
    Serve(MigrationArgs),
    /// Run database migrations
    Migrate,
    /// Replace stored sales with a fresh pull from the feed
    Seed(MigrationArgs),
}

#[derive(Args, Debug, Default)]
struct MigrationArgs {
    /// Skip running migrations before starting
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Serve(args) => serve(&config, args).await,
        Command::Migrate => {
            connect_repository(&config, MigrationArgs::default()).await?;
            info!("Database migrations applied");
            Ok(())
        }
        Command::Seed(args) => {
            let repository = connect_repository(&config, args).await?;
            let feed = HttpFeed::new(config.feed_url.clone(), config.feed_timeout)
                .context("failed to build feed client")?;
            match ingestion::seed(&repository, &feed).await? {
                SeedOutcome::NoData => warn!(url = %config.feed_url, "Feed was empty; nothing seeded"),
                SeedOutcome::Seeded { inserted } => info!(inserted, "Sale records seeded"),
            }
            Ok(())
        }
    }
}

async fn serve(config: &Config, args: MigrationArgs) -> Result<()> {
    let repository = connect_repository(config, args).await?;
    let feed = HttpFeed::new(config.feed_url.clone(), config.feed_timeout)
        .context("failed to build feed client")?;

    let state = Arc::new(AppState::new(Arc::new(repository), Arc::new(feed)));
    let router = api::router(state);

    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn connect_repository(config: &Config, args: MigrationArgs) -> Result<PostgresRepository> {
    let repository = PostgresRepository::connect(&config.database_url, config.max_connections)
        .await
        .context("failed to connect to Postgres")?;

    if args.skip_migrations {
        warn!("Skipping migrations at user request");
    } else {
        repository
            .run_migrations()
            .await
            .context("failed to run database migrations")?;
    }

    Ok(repository)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
