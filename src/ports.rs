//! Port traits — the boundary between acquisition logic and the platform.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ acquisition task (domain)
//! ```
//!
//! Bus access and delays use the `embedded-hal` 1.0 traits directly
//! (`embedded_hal::i2c::I2c`, `embedded_hal::delay::DelayNs`); the traits
//! here cover what the HAL does not: a monotonic millisecond clock, the
//! real-time-clock chip, and a byte-stream source for the NMEA decoder.
//! Tasks consume them via generics, so the acquisition core never touches
//! hardware directly and runs unchanged under the host test doubles.

use core::fmt;

// ───────────────────────────────────────────────────────────────
// Monotonic clock
// ───────────────────────────────────────────────────────────────

/// Millisecond-granularity monotonic clock.
///
/// The value wraps at `u32::MAX`; consumers must compare instants with
/// `wrapping_sub`, never with `<`.
pub trait Monotonic {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Real-time clock
// ───────────────────────────────────────────────────────────────

/// Calendar date/time as held by the RTC chip (local time, no zone info).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RtcDateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtcError {
    /// The RTC chip did not acknowledge the transfer.
    Bus,
    /// The supplied date/time has an out-of-range field.
    InvalidDateTime,
}

impl fmt::Display for RtcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "RTC bus error"),
            Self::InvalidDateTime => write!(f, "invalid date/time"),
        }
    }
}

/// Get/set access to the battery-backed real-time clock.
pub trait Rtc {
    fn set_datetime(&mut self, dt: &RtcDateTime) -> Result<(), RtcError>;
    fn datetime(&mut self) -> Result<RtcDateTime, RtcError>;
}

// ───────────────────────────────────────────────────────────────
// Byte stream (UART receive)
// ───────────────────────────────────────────────────────────────

/// Non-blocking byte-stream receive, as provided by a UART peripheral.
pub trait ByteSource {
    /// Copy whatever is buffered into `buf` and return the byte count.
    /// Returns 0 when nothing is pending; never blocks.
    fn read(&mut self, buf: &mut [u8]) -> usize;
}
