use std::path::PathBuf;

use anyhow::Context;
use axum::extract::FromRef;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod auth;
mod cache;
mod commands;
mod config;
mod controllers;
mod db;
mod error;
mod ids;
mod models;
mod types;

use cache::AnyCache;
use config::Config;
use db::Database;
pub(crate) use error::ApiResult;

#[derive(Parser)]
#[command(version, about = "Pastebin API with a read-through cache")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(short, long, env = "OWNBIN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve,
    /// Re-key pastes whose storage key differs from their id.
    RekeyLegacy,
}

#[derive(Clone, FromRef)]
pub struct App {
    pub config: Config,
    pub database: Database,
    pub cache: AnyCache,
}

impl App {
    pub async fn load(config: Config) -> anyhow::Result<Self> {
        let database = Database::connect(&config.database)
            .await
            .context("failed to connect to database")?;
        database
            .migrate()
            .await
            .context("failed to create database schema")?;
        let cache = AnyCache::from_config(&config.cache);

        Ok(App {
            config,
            database,
            cache,
        })
    }
}

#[cfg(test)]
impl App {
    pub async fn for_tests() -> Self {
        let config = Config::parse(
            r#"
            port = 0

            [database]
            url = "sqlite::memory:"

            [cache]
            capacity = 16
            ttl_secs = 60

            [limits]
            max_paste_size = 1024
            "#,
        )
        .unwrap();
        let cache = AnyCache::from_config(&config.cache);

        App {
            config,
            database: Database::in_memory().await,
            cache,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(config::default_path);
    let config = Config::load(&config_path)?;

    let app = App::load(config).await?;

    match cli.command {
        Command::Serve => commands::serve::run(app).await,
        Command::RekeyLegacy => commands::rekey_legacy::run(app).await,
    }
}
