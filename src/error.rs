//! Session error types.
//!
//! The simulation itself is total: out-of-range values are clamped, never
//! rejected.  What remains are broken preconditions at the session boundary,
//! which are surfaced through [`SessionError`] and propagated with `?`.  The
//! Bevy host lets them escape fallible systems, where Bevy's error handler
//! stops the app.

use crate::world::EntityId;
use std::fmt;

/// Top-level error enum for the starship sandbox.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// A session was constructed without a drawing surface to render into.
    MissingSurface,

    /// The player ship was looked up during update or render and is gone.
    /// The session never removes its ship, so this is a broken invariant.
    ShipNotFound {
        /// Identity that failed to resolve.
        id: EntityId,
    },

    /// A configuration value is outside the range the simulation accepts.
    InvalidConfig {
        /// Name of the config field (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f64,
        /// Human-readable description of the accepted range.
        expected: &'static str,
    },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::MissingSurface => {
                write!(f, "cannot start a session without a drawing surface")
            }
            SessionError::ShipNotFound { id } => {
                write!(f, "ship '{}' is missing from the session", id)
            }
            SessionError::InvalidConfig {
                name,
                value,
                expected,
            } => write!(
                f,
                "config value '{}' = {} is outside accepted range {}",
                name, value, expected
            ),
        }
    }
}

impl std::error::Error for SessionError {}

/// Convenience alias: a `Result` using `SessionError` as the error type.
pub type SessionResult<T> = Result<T, SessionError>;
