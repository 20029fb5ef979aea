//! Connection handle state machine

use crate::{Error, Result};

/// Lifecycle state of a connection handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandleState {
    /// Not connected yet
    #[default]
    Unopened,

    /// Session established, usable
    Open,

    /// Released, never usable again
    Closed,
}

impl HandleState {
    /// Check if transition is valid
    pub fn can_transition_to(&self, next: HandleState) -> bool {
        use HandleState::*;

        matches!(
            (self, next),
            (Unopened, Open) | (Unopened, Closed) | (Open, Closed)
        )
    }

    /// Transition to new state
    pub fn transition(&mut self, next: HandleState) -> Result<()> {
        if !self.can_transition_to(next) {
            return Err(Error::InvalidState {
                expected: format!("valid transition from {}", self),
                actual: next.to_string(),
            });
        }
        *self = next;
        Ok(())
    }

    /// Whether the handle can still be used
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl std::fmt::Display for HandleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unopened => write!(f, "unopened"),
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}
