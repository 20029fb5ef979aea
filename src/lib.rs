//! dbconnect: open a single connection to a hosted Postgres database,
//! report the outcome, and release it.
//!
//! The wire protocol is handled by `tokio-postgres`. This crate owns the
//! pieces around it:
//!
//! * configuration, loaded from the environment (never embedded)
//! * endpoint interpretation (URL, key/value DSN, or bare host)
//! * the connection handle lifecycle (unopened, open, closed)
//! * the connect/close helper that reports failures instead of raising them
//!
//! # Examples
//!
//! ```no_run
//! # async fn example() {
//! use dbconnect::{ConnectionConfig, ConnectionHelper};
//!
//! let config = ConnectionConfig::new("postgres://db.example.test:5432/postgres", "postgres")
//!     .secret("s3cret");
//!
//! let mut helper = ConnectionHelper::stdout();
//! let mut handle = helper.connect(&config).await;
//! if handle.is_some() {
//!     helper.report_success();
//! }
//! helper.close(&mut handle).await;
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
mod metrics;

pub use client::{close, connect, ConnectionHelper, Endpoint, EndpointFormat};
pub use connection::{Connection, ConnectionConfig, ConnectionConfigBuilder, HandleState};
pub use error::{Error, Result};
