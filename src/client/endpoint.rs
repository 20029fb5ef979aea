//! Endpoint parsing
//!
//! Supports formats:
//! * postgres://[user[:password]@][host][:port][/database][?params]
//! * key/value DSN: `host=db.example.test port=5432 dbname=postgres`
//! * bare `host[:port][/database]`, with `[v6addr]` for IPv6
//! * absolute path: Unix socket directory

use crate::{Error, Result};
use std::str::FromStr;
use tokio_postgres::config::Host;

/// Default Postgres port
pub const DEFAULT_PORT: u16 = 5432;

/// How the endpoint string was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointFormat {
    /// `postgres://` or `postgresql://` URL
    Url,
    /// libpq key/value DSN
    KeyValue,
    /// Bare `host[:port][/database]`
    HostPort,
    /// Unix socket directory
    SocketDir,
}

/// Parsed endpoint
///
/// Wraps the driver configuration the endpoint describes. Its `Display`
/// lists hosts and ports only, so it is safe to log.
#[derive(Debug, Clone)]
pub struct Endpoint {
    format: EndpointFormat,
    config: tokio_postgres::Config,
}

impl Endpoint {
    /// Parse endpoint string
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::Config("endpoint is empty".into()));
        }

        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            return Self::parse_driver(s, EndpointFormat::Url);
        }

        if let Some((scheme, _)) = s.split_once("://") {
            return Err(Error::Config(format!(
                "unsupported endpoint scheme '{}': expected postgres:// or postgresql://",
                scheme
            )));
        }

        if s.contains('=') {
            return Self::parse_driver(s, EndpointFormat::KeyValue);
        }

        if s.starts_with('/') {
            let mut config = tokio_postgres::Config::new();
            config.host(s).port(DEFAULT_PORT);
            return Ok(Self {
                format: EndpointFormat::SocketDir,
                config,
            });
        }

        Self::parse_host_port(s)
    }

    fn parse_driver(s: &str, format: EndpointFormat) -> Result<Self> {
        let config = tokio_postgres::Config::from_str(s)
            .map_err(|e| Error::Config(format!("invalid endpoint: {}", e)))?;
        Ok(Self { format, config })
    }

    fn parse_host_port(s: &str) -> Result<Self> {
        // Format: host[:port][/database]
        let (host_port, database) = match s.split_once('/') {
            Some((hp, db)) => (hp, Some(db)),
            None => (s, None),
        };

        let (host, port) = if let Some(rest) = host_port.strip_prefix('[') {
            let (host, after) = rest
                .split_once(']')
                .ok_or_else(|| Error::Config("unterminated IPv6 address".into()))?;
            let port = match after.strip_prefix(':') {
                Some(port) => Some(port),
                None if after.is_empty() => None,
                None => {
                    return Err(Error::Config(format!(
                        "unexpected characters after IPv6 address: '{}'",
                        after
                    )))
                }
            };
            (host, port)
        } else {
            match host_port.split_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (host_port, None),
            }
        };

        if host.is_empty() {
            return Err(Error::Config("endpoint has no host".into()));
        }

        let port = match port {
            Some(port) => port
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("invalid port '{}'", port)))?,
            None => DEFAULT_PORT,
        };

        let mut config = tokio_postgres::Config::new();
        config.host(host).port(port);
        if let Some(database) = database.filter(|db| !db.is_empty()) {
            config.dbname(database);
        }

        Ok(Self {
            format: EndpointFormat::HostPort,
            config,
        })
    }

    /// How the endpoint was written
    pub fn format(&self) -> EndpointFormat {
        self.format
    }

    /// Driver configuration described by the endpoint
    pub fn driver_config(&self) -> &tokio_postgres::Config {
        &self.config
    }

    /// `host:port` pairs, in connection order
    pub fn addresses(&self) -> Vec<String> {
        let ports = self.config.get_ports();
        self.config
            .get_hosts()
            .iter()
            .enumerate()
            .map(|(i, host)| {
                let port = ports
                    .get(i)
                    .or_else(|| ports.first())
                    .copied()
                    .unwrap_or(DEFAULT_PORT);
                match host {
                    Host::Tcp(host) if host.contains(':') => format!("[{}]:{}", host, port),
                    Host::Tcp(host) => format!("{}:{}", host, port),
                    #[cfg(unix)]
                    Host::Unix(dir) => format!("{}/.s.PGSQL.{}", dir.display(), port),
                }
            })
            .collect()
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let addresses = self.addresses();
        if addresses.is_empty() {
            write!(f, "<no host>")
        } else {
            write!(f, "{}", addresses.join(","))
        }
    }
}
