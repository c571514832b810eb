//! BM8563 real-time clock adapter.
//!
//! The BM8563 (PCF8563-compatible) sits on the internal I2C bus at 0x51
//! and stores calendar time in BCD across registers 0x02..=0x08. The
//! driver is generic over `embedded_hal::i2c::I2c`, so the register and
//! BCD plumbing is exercised by host tests against a scripted bus.

use embedded_hal::i2c::I2c;

use crate::ports::{Rtc, RtcDateTime, RtcError};

pub const ADDR: u8 = 0x51;

/// First of the seven time registers (seconds).
const REG_SECONDS: u8 = 0x02;

/// Seconds register bit 7 is the voltage-low flag, hours/days carry
/// unused upper bits; these masks strip them on read.
const MASK: [u8; 7] = [0x7F, 0x7F, 0x3F, 0x3F, 0x07, 0x1F, 0xFF];

pub struct Bm8563<B> {
    bus: B,
    address: u8,
}

impl<B: I2c> Bm8563<B> {
    pub fn new(bus: B) -> Self {
        Self { bus, address: ADDR }
    }
}

impl<B: I2c> Rtc for Bm8563<B> {
    fn set_datetime(&mut self, dt: &RtcDateTime) -> Result<(), RtcError> {
        if dt.year < 2000
            || dt.year > 2099
            || dt.month == 0
            || dt.month > 12
            || dt.day == 0
            || dt.day > 31
            || dt.hour > 23
            || dt.minute > 59
            || dt.second > 59
        {
            return Err(RtcError::InvalidDateTime);
        }
        // Weekday register is written but never read back; zero is fine.
        let frame = [
            REG_SECONDS,
            to_bcd(dt.second),
            to_bcd(dt.minute),
            to_bcd(dt.hour),
            to_bcd(dt.day),
            0x00,
            to_bcd(dt.month),
            to_bcd((dt.year - 2000) as u8),
        ];
        self.bus
            .write(self.address, &frame)
            .map_err(|_| RtcError::Bus)
    }

    fn datetime(&mut self) -> Result<RtcDateTime, RtcError> {
        let mut regs = [0u8; 7];
        self.bus
            .write_read(self.address, &[REG_SECONDS], &mut regs)
            .map_err(|_| RtcError::Bus)?;
        for (r, m) in regs.iter_mut().zip(MASK) {
            *r &= m;
        }
        Ok(RtcDateTime {
            second: from_bcd(regs[0]),
            minute: from_bcd(regs[1]),
            hour: from_bcd(regs[2]),
            day: from_bcd(regs[3]),
            month: from_bcd(regs[5]),
            year: 2000 + u16::from(from_bcd(regs[6])),
        })
    }
}

fn to_bcd(v: u8) -> u8 {
    ((v / 10) << 4) | (v % 10)
}

fn from_bcd(v: u8) -> u8 {
    (v >> 4) * 10 + (v & 0x0F)
}
