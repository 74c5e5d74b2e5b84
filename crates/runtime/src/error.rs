//! Cursor errors

use std::any::Any;
use std::io;

/// Errors reported by [`crate::Cursor::advance`].
#[derive(Debug)]
pub enum CursorError {
    /// `advance` was called after the cursor was released
    Released,
    /// The producer strand could not be spawned
    Spawn(io::Error),
}

impl std::fmt::Display for CursorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CursorError::Released => write!(f, "cursor advanced after release"),
            CursorError::Spawn(e) => write!(f, "failed to spawn producer strand: {}", e),
        }
    }
}

impl std::error::Error for CursorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CursorError::Spawn(e) => Some(e),
            CursorError::Released => None,
        }
    }
}

impl From<io::Error> for CursorError {
    fn from(e: io::Error) -> Self {
        CursorError::Spawn(e)
    }
}

/// Format a panic payload into an error message
pub fn format_panic_payload(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
