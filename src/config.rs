//! Runtime configuration from the environment (and `.env` via dotenvy)

use std::net::SocketAddr;

use thiserror::Error;

use crate::services::otp::{DEFAULT_HASH_COST, MAX_HASH_COST, MIN_HASH_COST};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub otp_hash_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; `from_env` passes the process env
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = non_empty(&lookup, "DATABASE_URL")?;
        let jwt_secret = non_empty(&lookup, "JWT_SECRET")?;

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let otp_hash_cost = match lookup("OTP_HASH_COST") {
            None => DEFAULT_HASH_COST,
            Some(raw) => raw.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
                name: "OTP_HASH_COST",
                reason: e.to_string(),
            })?,
        };
        if !(MIN_HASH_COST..=MAX_HASH_COST).contains(&otp_hash_cost) {
            return Err(ConfigError::Invalid {
                name: "OTP_HASH_COST",
                reason: format!(
                    "{} outside {}..={}",
                    otp_hash_cost, MIN_HASH_COST, MAX_HASH_COST
                ),
            });
        }

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            otp_hash_cost,
        })
    }
}

fn non_empty<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}
