//! Connection configuration and the owned connection handle

use super::state::HandleState;
use crate::client::Endpoint;
use crate::{Error, Result};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_postgres::config::SslMode;
use tokio_postgres::{Client, NoTls};
use tracing::Instrument;

/// Application name reported to the server when none is configured
pub const DEFAULT_APPLICATION_NAME: &str = "dbconnect";

/// Connection configuration
///
/// Holds the endpoint, the authenticating user and the secret, plus a few
/// optional session settings. Values are not validated here: a malformed
/// endpoint surfaces as a failure of [`Connection::connect`].
///
/// Settings given here take precedence over the same settings embedded in
/// the endpoint string (e.g. the user of a `postgres://user@host` URL).
#[derive(Clone)]
pub struct ConnectionConfig {
    /// Endpoint address (URL, key/value DSN, or `host[:port][/database]`)
    pub endpoint: String,
    /// Username
    pub user: String,
    /// Authentication secret (optional)
    pub secret: Option<String>,
    /// Database name (defaults to the endpoint's, then to the user name)
    pub database: Option<String>,
    /// Application name for Postgres logs
    pub application_name: Option<String>,
    /// TCP connection timeout (default: none)
    pub connect_timeout: Option<Duration>,
}

impl ConnectionConfig {
    /// Create new configuration with defaults
    ///
    /// For the application name and connect timeout, use `builder()` instead.
    pub fn new(endpoint: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            user: user.into(),
            secret: None,
            database: None,
            application_name: None,
            connect_timeout: None,
        }
    }

    /// Create a builder for advanced configuration
    ///
    /// # Examples
    ///
    /// ```
    /// use dbconnect::ConnectionConfig;
    /// use std::time::Duration;
    ///
    /// let config = ConnectionConfig::builder("db.example.test", "postgres")
    ///     .secret("s3cret")
    ///     .connect_timeout(Duration::from_secs(10))
    ///     .build();
    /// assert_eq!(config.connect_timeout, Some(Duration::from_secs(10)));
    /// ```
    pub fn builder(
        endpoint: impl Into<String>,
        user: impl Into<String>,
    ) -> ConnectionConfigBuilder {
        ConnectionConfigBuilder {
            config: Self::new(endpoint, user),
        }
    }

    /// Set secret
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Set database name
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Resolve the endpoint and overlay this configuration onto it
    pub(crate) fn to_driver_config(&self) -> Result<(Endpoint, tokio_postgres::Config)> {
        let endpoint = Endpoint::parse(&self.endpoint)?;
        let mut pg = endpoint.driver_config().clone();

        pg.user(self.user.as_str());
        if let Some(secret) = &self.secret {
            pg.password(secret.as_str());
        }
        if let Some(database) = &self.database {
            pg.dbname(database.as_str());
        }
        pg.application_name(
            self.application_name
                .as_deref()
                .unwrap_or(DEFAULT_APPLICATION_NAME),
        );
        if let Some(timeout) = self.connect_timeout {
            pg.connect_timeout(timeout);
        }
        // NoTls only, so never attempt SSLRequest negotiation
        pg.ssl_mode(SslMode::Disable);

        Ok((endpoint, pg))
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("endpoint", &self.endpoint)
            .field("user", &self.user)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("application_name", &self.application_name)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Builder for creating `ConnectionConfig` with optional settings
#[derive(Debug, Clone)]
pub struct ConnectionConfigBuilder {
    config: ConnectionConfig,
}

impl ConnectionConfigBuilder {
    /// Set the secret
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.config.secret = Some(secret.into());
        self
    }

    /// Set the database name
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.config.database = Some(database.into());
        self
    }

    /// Set application name for Postgres logs
    ///
    /// Default: `dbconnect`
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.config.application_name = Some(name.into());
        self
    }

    /// Set TCP connection timeout
    ///
    /// Default: None (no timeout)
    pub fn connect_timeout(mut self, duration: Duration) -> Self {
        self.config.connect_timeout = Some(duration);
        self
    }

    /// Build the configuration
    pub fn build(self) -> ConnectionConfig {
        self.config
    }
}

/// An open session to the database, owned by whoever opened it
///
/// The session I/O runs in a driver task spawned on the current tokio
/// runtime; [`close`](Connection::close) stops it and waits for it to finish.
pub struct Connection {
    client: Option<Client>,
    driver: Option<JoinHandle<()>>,
    state: HandleState,
    endpoint: String,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.endpoint)
            .field("state", &self.state)
            .finish()
    }
}

impl Connection {
    /// Open a session
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// * [`Error::Config`] if the endpoint cannot be interpreted
    /// * [`Error::ConnectionFailure`] if the server is unreachable or rejects
    ///   the credentials
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let started = Instant::now();
        crate::metrics::counters::connect_attempted();

        let result = async {
            let mut state = HandleState::Unopened;
            let (endpoint, pg) = config.to_driver_config()?;
            tracing::Span::current().record("endpoint", tracing::field::display(&endpoint));

            let (client, connection) = pg.connect(NoTls).await?;
            let driver = tokio::spawn(async move {
                if let Err(e) = connection.await {
                    tracing::warn!(error = %e, "connection driver terminated");
                }
            });

            state.transition(HandleState::Open)?;
            tracing::info!("connection established");

            Ok::<_, Error>(Self {
                client: Some(client),
                driver: Some(driver),
                state,
                endpoint: endpoint.to_string(),
            })
        }
        .instrument(tracing::info_span!(
            "connect",
            user = %config.user,
            endpoint = tracing::field::Empty
        ))
        .await;

        match &result {
            Ok(_) => crate::metrics::histograms::connect_duration(
                started.elapsed().as_millis() as u64,
            ),
            Err(e) => crate::metrics::counters::connect_failed(e.category()),
        }
        result
    }

    /// Get current handle state
    pub fn state(&self) -> HandleState {
        self.state
    }

    /// Whether the handle is still usable
    pub fn is_open(&self) -> bool {
        self.state.is_open() && self.client.as_ref().is_some_and(|c| !c.is_closed())
    }

    /// Endpoint this handle is connected to (hosts and ports only, no credentials)
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Close the connection
    ///
    /// Dropping the driver client makes the driver send Terminate and shut
    /// the socket down; this waits for that to finish. Closing an already
    /// closed handle does nothing.
    pub async fn close(&mut self) {
        if self.state == HandleState::Closed {
            return;
        }

        drop(self.client.take());
        if let Some(driver) = self.driver.take() {
            if let Err(e) = driver.await {
                tracing::debug!(error = %e, "driver task did not finish cleanly");
            }
        }

        if let Err(e) = self.state.transition(HandleState::Closed) {
            tracing::debug!(error = %e, "unexpected state while closing");
            self.state = HandleState::Closed;
        }
        crate::metrics::counters::connection_closed();
        tracing::info!(endpoint = %self.endpoint, "connection closed");
    }
}
