//! Domain-specific error types for the display driver.
//!
//! All fallible operations return `Result<T, FlaschenError>`.
//! Out-of-bounds pixel writes are not errors; they are dropped silently.

use thiserror::Error;

/// The canonical error type for the display driver.
#[derive(Debug, Error)]
pub enum FlaschenError {
    // ── Construction Errors ──────────────────────────────────────
    /// A canvas was requested with a zero width or height.
    #[error("invalid canvas dimension: {width}x{height}")]
    InvalidDimension { width: usize, height: usize },

    /// The compositing layer is outside `0..=15`.
    #[error("invalid layer {0}: expected 0..=15")]
    InvalidLayer(u8),

    // ── Transport Errors ─────────────────────────────────────────
    /// The socket could not be created, bound or connected.
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// A datagram could not be handed to the OS mid-flush.
    ///
    /// Tiles after `tile` were not sent.
    #[error("send failed on tile {tile}: {source}")]
    Send {
        tile: usize,
        #[source]
        source: std::io::Error,
    },

    // ── Protocol Errors ──────────────────────────────────────────
    /// A received datagram is not a valid wire frame.
    #[error("malformed wire frame: {0}")]
    Decode(&'static str),

    // ── Application Errors ───────────────────────────────────────
    /// A colour token could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// An animation control action is not valid in the current state.
    #[error("cannot {action} while {from}")]
    InvalidTransition { from: String, action: &'static str },

    /// The settings file could not be read or written.
    #[error("settings error: {0}")]
    Settings(String),

    /// Catch-all for errors that do not fit another variant.
    #[error("{0}")]
    Other(String),
}

// ── Convenient From implementations ──────────────────────────────

impl From<String> for FlaschenError {
    fn from(s: String) -> Self {
        FlaschenError::Other(s)
    }
}

impl From<&str> for FlaschenError {
    fn from(s: &str) -> Self {
        FlaschenError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for FlaschenError {
    fn from(e: serde_json::Error) -> Self {
        FlaschenError::Settings(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = FlaschenError::InvalidDimension {
            width: 0,
            height: 35,
        };
        assert!(e.to_string().contains("0x35"));

        let e = FlaschenError::Send {
            tile: 3,
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        };
        assert!(e.to_string().contains("tile 3"));
        assert!(e.to_string().contains("refused"));
    }

    #[test]
    fn from_string() {
        let e: FlaschenError = "something broke".into();
        assert!(matches!(e, FlaschenError::Other(_)));
    }

    #[test]
    fn from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrNotAvailable, "no route");
        let e: FlaschenError = io_err.into();
        assert!(matches!(e, FlaschenError::Connection(_)));
    }
}
