//! Client-facing API
//!
//! * Endpoint interpretation
//! * The connect/close helper with its report-and-continue failure policy

mod endpoint;
mod helper;

pub use endpoint::{Endpoint, EndpointFormat, DEFAULT_PORT};
pub use helper::{close, connect, ConnectionHelper, SUCCESS_MESSAGE};
