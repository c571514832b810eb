//! Unified error types for the station firmware.
//!
//! The taxonomy is deliberately small: a *bring-up* failure is fatal to
//! the one task that hit it (no retry this session) and never crosses a
//! task boundary; transient bus failures are logged at the call site and
//! the previously published snapshot is retained, so they never surface
//! here.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Device absent or bus/pin setup failed at probe time.
    /// Fatal to the owning task; reported once, never retried.
    BringUp(&'static str),
    /// Configuration is invalid or could not be parsed.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BringUp(msg) => write!(f, "bring-up: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
