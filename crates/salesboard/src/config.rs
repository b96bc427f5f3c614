use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use salesboard_core::db::DEFAULT_MAX_CONNECTIONS;
use salesboard_core::feed::{Url, DEFAULT_FEED_URL};

pub const DEFAULT_PORT: u16 = 3700;
pub const DEFAULT_FEED_TIMEOUT_SECS: u64 = 30;

/// Runtime settings, read from the process environment (and `.env`, when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub feed_url: Url,
    pub feed_timeout: Duration,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .or_else(|| lookup("SALESBOARD_DATABASE_URL"))
            .context("DATABASE_URL (or SALESBOARD_DATABASE_URL) must be set")?;

        let port = match lookup("PORT").or_else(|| lookup("port")) {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got '{raw}'"))?,
            None => DEFAULT_PORT,
        };

        let feed_url = lookup("SALESBOARD_FEED_URL").unwrap_or_else(|| DEFAULT_FEED_URL.to_string());
        let feed_url = Url::parse(&feed_url)
            .with_context(|| format!("SALESBOARD_FEED_URL is not a valid URL: '{feed_url}'"))?;

        let feed_timeout = match lookup("SALESBOARD_FEED_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse().with_context(|| {
                format!("SALESBOARD_FEED_TIMEOUT_SECS must be a whole number of seconds, got '{raw}'")
            })?),
            None => Duration::from_secs(DEFAULT_FEED_TIMEOUT_SECS),
        };

        let max_connections = match lookup("SALESBOARD_MAX_CONNECTIONS") {
            Some(raw) => raw.trim().parse().with_context(|| {
                format!("SALESBOARD_MAX_CONNECTIONS must be a positive integer, got '{raw}'")
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            port,
            feed_url,
            feed_timeout,
            max_connections,
        })
    }
}
