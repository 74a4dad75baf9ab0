// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use chrono::FixedOffset;

const DEFAULT_DATABASE_URL: &str = "sqlite://database/sqlite.db";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_UTC_OFFSET: &str = "+00:00";

/// Server settings, read from the environment.
///
/// - `DATABASE_URL`: SQLite connection URL (default: `sqlite://database/sqlite.db`)
/// - `HOST`: bind address (default: `0.0.0.0`)
/// - `PORT`: bind port (default: `5000`)
/// - `TASKS_UTC_OFFSET`: offset at which calendar days start, e.g. `+02:00` (default: `+00:00`)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub utc_offset: FixedOffset,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let database_url = get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let host = get("HOST")
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
            .parse::<IpAddr>()
            .context("HOST must be an IP address")?;

        let port = match get("PORT") {
            Some(port) => port.parse::<u16>().with_context(|| {
                format!("PORT must be a number between 0 and 65535, got {}", port)
            })?,
            None => DEFAULT_PORT,
        };

        let offset = get("TASKS_UTC_OFFSET").unwrap_or_else(|| DEFAULT_UTC_OFFSET.to_string());
        let utc_offset = offset
            .parse::<FixedOffset>()
            .with_context(|| format!("TASKS_UTC_OFFSET must look like +02:00, got {}", offset))?;

        Ok(Self {
            database_url,
            host,
            port,
            utc_offset,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
