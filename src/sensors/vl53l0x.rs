//! VL53L0X time-of-flight distance sensor driver.
//!
//! Minimal single-shot flow: kick a ranging measurement, poll the result
//! register for data-ready, then burst-read the 12-byte result block.
//! Only range status 11 ("range valid") yields a sample; everything else
//! (sigma fail, signal fail, phase fail, hardware fail) comes back as
//! `None` and the caller decides what to hold on screen.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::debug;

use super::Error;

pub const ADDR: u8 = 0x29;

const REG_SYSRANGE_START: u8 = 0x00;
const REG_RESULT: u8 = 0x14;
const RESULT_LEN: usize = 12;

/// The only range status that carries a trustworthy distance.
const STATUS_RANGE_VALID: u8 = 11;

/// One decoded result block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSample {
    /// Ambient photon count rate (MCPS, 9.7 fixed point as read).
    pub ambient_rate: u16,
    /// Return signal count rate.
    pub signal_rate: u16,
    /// Measured distance in millimetres.
    pub distance_mm: u16,
}

impl RangeSample {
    /// Decode the result block. Returns `None` unless the device reports
    /// range status 11; a sample with any other status carries a distance
    /// that must not be used.
    pub fn decode(block: &[u8; RESULT_LEN]) -> Option<Self> {
        let status = (block[0] & 0x78) >> 3;
        if status != STATUS_RANGE_VALID {
            debug!("vl53l0x: range status {status}, discarding");
            return None;
        }
        Some(Self {
            ambient_rate: u16::from_be_bytes([block[6], block[7]]),
            signal_rate: u16::from_be_bytes([block[8], block[9]]),
            distance_mm: u16::from_be_bytes([block[10], block[11]]),
        })
    }
}

/// VL53L0X on a shared I2C bus.
#[derive(Debug)]
pub struct Vl53l0x {
    address: u8,
    poll_interval_ms: u32,
    poll_attempts: u32,
}

impl Vl53l0x {
    pub fn new(poll_interval_ms: u32, poll_attempts: u32) -> Self {
        Self {
            address: ADDR,
            poll_interval_ms,
            poll_attempts,
        }
    }

    /// Presence check: the start register must acknowledge a read.
    pub fn probe<B: I2c>(&self, bus: &mut B) -> Result<(), Error<B::Error>> {
        let mut byte = [0u8; 1];
        bus.write_read(self.address, &[REG_SYSRANGE_START], &mut byte)
            .map_err(|_| Error::DeviceAbsent)?;
        Ok(())
    }

    /// Run one single-shot ranging measurement.
    ///
    /// `Ok(None)` means the measurement completed but did not produce a
    /// valid range; `Err(Timeout)` means data-ready never asserted within
    /// the poll budget.
    pub fn range<B, D>(
        &self,
        bus: &mut B,
        delay: &mut D,
    ) -> Result<Option<RangeSample>, Error<B::Error>>
    where
        B: I2c,
        D: DelayNs,
    {
        bus.write(self.address, &[REG_SYSRANGE_START, 0x01])
            .map_err(Error::I2c)?;

        let mut ready = false;
        for _ in 0..self.poll_attempts {
            let mut status = [0u8; 1];
            bus.write_read(self.address, &[REG_RESULT], &mut status)
                .map_err(Error::I2c)?;
            if status[0] & 0x01 != 0 {
                ready = true;
                break;
            }
            delay.delay_ms(self.poll_interval_ms);
        }
        if !ready {
            return Err(Error::Timeout);
        }

        let mut block = [0u8; RESULT_LEN];
        bus.write_read(self.address, &[REG_RESULT], &mut block)
            .map_err(Error::I2c)?;
        Ok(RangeSample::decode(&block))
    }
}
