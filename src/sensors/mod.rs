//! I2C sensor drivers for the Port A environmental cluster.
//!
//! Three devices share the bus: an SHT3x (humidity/temperature), a
//! QMP6988 (barometric pressure, with its own temperature channel used
//! for compensation only) and a VL53L0X time-of-flight ranger. Drivers
//! hold their own address and derived state but never own the bus — the
//! acquisition task passes `&mut impl I2c` per call, so a single task
//! serialises all traffic without a bus-sharing layer.

use core::fmt;

pub mod qmp6988;
pub mod sht3x;
pub mod vl53l0x;

pub use qmp6988::Qmp6988;
pub use sht3x::Sht3x;
pub use vl53l0x::Vl53l0x;

/// One cycle's worth of environmental readings, published as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnvSnapshot {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub pressure_hpa: f32,
}

/// Driver-level failure, generic over the bus error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// The underlying I2C transfer failed.
    I2c(E),
    /// No device with the expected identity answered at any known address.
    DeviceAbsent,
    /// The device never signalled data-ready within the poll budget.
    Timeout,
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I2c(e) => write!(f, "I2C transfer failed: {e:?}"),
            Self::DeviceAbsent => write!(f, "device not found on bus"),
            Self::Timeout => write!(f, "device timed out"),
        }
    }
}

impl<E: fmt::Debug> std::error::Error for Error<E> {}
