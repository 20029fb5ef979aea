//! Configuration loading
//!
//! Connection settings come from a [`ConfigSource`] at process start,
//! normally the process environment:
//!
//! | key                       | meaning                          | default          |
//! |---------------------------|----------------------------------|------------------|
//! | `DB_ENDPOINT`             | endpoint address                 | required         |
//! | `DB_USER`                 | user name                        | current OS user  |
//! | `DB_SECRET`               | authentication secret            | none             |
//! | `DB_NAME`                 | database name                    | none             |
//! | `DB_APPLICATION_NAME`     | application name for server logs | `dbconnect`      |
//! | `DB_CONNECT_TIMEOUT_SECS` | TCP connect timeout, seconds     | none             |
//!
//! Empty values count as unset.

use crate::connection::ConnectionConfig;
use crate::{Error, Result};
use std::collections::HashMap;
use std::time::Duration;

/// Endpoint key
pub const ENDPOINT_KEY: &str = "DB_ENDPOINT";
/// User key
pub const USER_KEY: &str = "DB_USER";
/// Secret key
pub const SECRET_KEY: &str = "DB_SECRET";
/// Database name key
pub const DATABASE_KEY: &str = "DB_NAME";
/// Application name key
pub const APPLICATION_NAME_KEY: &str = "DB_APPLICATION_NAME";
/// Connect timeout key
pub const CONNECT_TIMEOUT_KEY: &str = "DB_CONNECT_TIMEOUT_SECS";

/// Where configuration values come from
pub trait ConfigSource {
    /// Look up a raw value
    fn get(&self, key: &str) -> Option<String>;
}

/// Process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl ConfigSource for HashMap<&str, &str> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).map(|v| v.to_string())
    }
}

fn lookup(source: &impl ConfigSource, key: &str) -> Option<String> {
    source
        .get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Build a connection configuration from `source`
///
/// # Errors
///
/// [`Error::Config`] if the endpoint is missing or the timeout is not a
/// whole number of seconds.
pub fn load(source: &impl ConfigSource) -> Result<ConnectionConfig> {
    let endpoint = lookup(source, ENDPOINT_KEY)
        .ok_or_else(|| Error::Config(format!("{} is not set", ENDPOINT_KEY)))?;
    let user = lookup(source, USER_KEY).unwrap_or_else(whoami::username);

    let mut builder = ConnectionConfig::builder(endpoint, user);
    if let Some(secret) = lookup(source, SECRET_KEY) {
        builder = builder.secret(secret);
    }
    if let Some(database) = lookup(source, DATABASE_KEY) {
        builder = builder.database(database);
    }
    if let Some(name) = lookup(source, APPLICATION_NAME_KEY) {
        builder = builder.application_name(name);
    }
    if let Some(timeout) = lookup(source, CONNECT_TIMEOUT_KEY) {
        let secs = timeout.parse::<u64>().map_err(|_| {
            Error::Config(format!(
                "{} must be a whole number of seconds, got '{}'",
                CONNECT_TIMEOUT_KEY, timeout
            ))
        })?;
        builder = builder.connect_timeout(Duration::from_secs(secs));
    }

    let config = builder.build();
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

/// Build a connection configuration from the process environment
pub fn from_env() -> Result<ConnectionConfig> {
    load(&EnvSource)
}
