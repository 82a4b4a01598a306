use std::env;

use anyhow::{anyhow, Context};
use chrono_tz::Tz;
use tracing::info;

use crate::utils::clock::Clock;

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongo_uri: String,
    pub database_name: String,
    /// Timezone poll end dates are interpreted in.
    pub timezone: Tz,
}

impl Settings {
    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let mongo_uri =
            env::var("MONGO_URI").context("MONGO_URI not found in environment variables")?;
        let database_name = var_or("DATABASE_NAME", "community");
        let raw_tz = var_or("POLL_TIMEZONE", "UTC");
        let timezone = raw_tz
            .parse::<Tz>()
            .map_err(|e| anyhow!("Invalid POLL_TIMEZONE {raw_tz:?}: {e}"))?;

        Ok(Self {
            mongo_uri,
            database_name,
            timezone,
        })
    }

    pub fn clock(&self) -> Clock {
        Clock::new(self.timezone)
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

