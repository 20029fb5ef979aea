//! Connection management
//!
//! This module handles:
//! * Connection configuration (endpoint, credentials, session settings)
//! * The owned connection handle and its driver task
//! * Handle state machine enforcement

mod conn;
mod state;

pub use conn::{Connection, ConnectionConfig, ConnectionConfigBuilder, DEFAULT_APPLICATION_NAME};
pub use state::HandleState;
