//! SHT3x humidity/temperature sensor driver.
//!
//! Single-shot, high-repeatability, clock-stretching disabled. Each
//! measurement is a trigger write, a settle delay, then a 6-byte read:
//! temperature word + CRC, humidity word + CRC. CRC failures are logged
//! and the reading is still accepted — a single flipped bit on a slow
//! shared bus should not blank a whole cycle.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::warn;

use super::Error;

pub const ADDR: u8 = 0x44;

/// Single-shot measurement, high repeatability, no clock stretching.
const CMD_MEASURE: [u8; 2] = [0x2C, 0x06];

/// Humidity and temperature from one single-shot measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// SHT3x on a shared I2C bus.
#[derive(Debug)]
pub struct Sht3x {
    address: u8,
    settle_ms: u32,
}

impl Sht3x {
    pub fn new(settle_ms: u32) -> Self {
        Self {
            address: ADDR,
            settle_ms,
        }
    }

    /// Cheap presence check: the sensor has no identity register, so
    /// probing is a measurement that must complete.
    pub fn probe<B, D>(&self, bus: &mut B, delay: &mut D) -> Result<(), Error<B::Error>>
    where
        B: I2c,
        D: DelayNs,
    {
        self.measure(bus, delay).map(|_| ())
    }

    /// Trigger one measurement and read it back.
    pub fn measure<B, D>(&self, bus: &mut B, delay: &mut D) -> Result<Reading, Error<B::Error>>
    where
        B: I2c,
        D: DelayNs,
    {
        bus.write(self.address, &CMD_MEASURE).map_err(Error::I2c)?;
        delay.delay_ms(self.settle_ms);

        let mut data = [0u8; 6];
        bus.read(self.address, &mut data).map_err(Error::I2c)?;

        if crc8(&data[0..2]) != data[2] {
            warn!("sht3x: temperature CRC mismatch, accepting reading anyway");
        }
        if crc8(&data[3..5]) != data[5] {
            warn!("sht3x: humidity CRC mismatch, accepting reading anyway");
        }

        let t_raw = u16::from_be_bytes([data[0], data[1]]);
        let rh_raw = u16::from_be_bytes([data[3], data[4]]);
        Ok(Reading {
            temperature_c: f32::from(t_raw) / 65535.0 * 175.0 - 45.0,
            humidity_pct: f32::from(rh_raw) / 65535.0 * 100.0,
        })
    }
}

/// Sensirion CRC-8: polynomial 0x31, init 0xFF, no reflection, no xorout.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0xFFu8;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
    }
    crc
}
