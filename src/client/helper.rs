//! Connection helper
//!
//! Opens a handle and reports the outcome. Failures never escape: they are
//! written to the output sink, logged, and turned into `None`.

use crate::connection::{Connection, ConnectionConfig};
use std::io::{self, Write};

/// Status line written after a successful connect
pub const SUCCESS_MESSAGE: &str = "connection successful";

/// Connect/close helper writing status lines to `W`
///
/// # Examples
///
/// ```no_run
/// # async fn example() {
/// use dbconnect::{ConnectionConfig, ConnectionHelper};
///
/// let config = ConnectionConfig::new("db.example.test", "postgres").secret("bad-secret");
/// let mut helper = ConnectionHelper::new(Vec::new());
///
/// let mut handle = helper.connect(&config).await;
/// assert!(handle.is_none());
/// helper.close(&mut handle).await; // no-op
///
/// let output = String::from_utf8(helper.into_inner()).unwrap();
/// assert!(output.starts_with("error: "));
/// # }
/// ```
#[derive(Debug)]
pub struct ConnectionHelper<W: Write> {
    out: W,
}

impl ConnectionHelper<io::Stdout> {
    /// Helper reporting to standard output
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConnectionHelper<W> {
    /// Helper reporting to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Open a connection, or report why it could not be opened
    ///
    /// Returns `None` on any failure (unreachable server, rejected
    /// credentials, malformed endpoint). The failure description is written
    /// to the output as `error: <description>`.
    pub async fn connect(&mut self, config: &ConnectionConfig) -> Option<Connection> {
        match Connection::connect(config).await {
            Ok(conn) => Some(conn),
            Err(e) => {
                tracing::error!(error = %e, kind = e.category(), "could not connect");
                self.write_line(&format!("error: {}", e));
                None
            }
        }
    }

    /// Write the success status line
    pub fn report_success(&mut self) {
        self.write_line(SUCCESS_MESSAGE);
    }

    /// Release the handle if there is one
    ///
    /// Leaves `None` behind, so calling it again is a no-op.
    pub async fn close(&mut self, handle: &mut Option<Connection>) {
        if let Some(mut conn) = handle.take() {
            conn.close().await;
        }
    }

    /// Consume the helper, returning the output sink
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        // A broken output sink must not turn into a failure
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            tracing::debug!(error = %e, "could not write status line");
        }
    }
}

/// Open a connection, reporting failures on standard output
pub async fn connect(config: &ConnectionConfig) -> Option<Connection> {
    ConnectionHelper::stdout().connect(config).await
}

/// Release a handle if present; a no-op otherwise
pub async fn close(handle: &mut Option<Connection>) {
    if let Some(mut conn) = handle.take() {
        conn.close().await;
    }
}
