//! QMP6988 barometric pressure/temperature sensor driver.
//!
//! The chip ships 25 bytes of factory calibration in OTP registers; every
//! raw 24-bit ADC count has to be run through a fixed-point polynomial
//! built from those bytes. The whole chain is integer-only (i64
//! intermediates) so the output is bit-identical across targets — no FPU
//! drift, no libm dependency in the hot path.
//!
//! Pipeline: [`Calibration::decode`] (pure, table-driven bit layout) →
//! [`IkCoefficients::derive`] (pure, exact vendor multiply/add constants) →
//! [`IkCoefficients::compensate`] (pure) — wrapped by the bus-facing
//! [`Qmp6988`] which owns the address and the derived coefficients.
//!
//! A `Qmp6988` value only exists after a successful probe + calibration
//! read, so compensation can never run against an uncalibrated device.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, info};

use super::Error;

/// The chip answers at one of two addresses depending on the SDO strap.
pub const ADDR_PRIMARY: u8 = 0x70;
pub const ADDR_SECONDARY: u8 = 0x56;

const REG_CHIP_ID: u8 = 0xD1;
const CHIP_ID: u8 = 0x5C;
const REG_RESET: u8 = 0xE0;
const REG_IIR_CONFIG: u8 = 0xF1;
const REG_CTRL_MEAS: u8 = 0xF4;
const REG_DATA: u8 = 0xF7;
const REG_CALIBRATION: u8 = 0xA0;
pub const CALIBRATION_LEN: usize = 25;

/// Soft-reset magic: 0xE6 then 0x00 to the reset register, 20 ms apart.
const RESET_SEQUENCE: [u8; 2] = [0xE6, 0x00];

const POWER_MODE_NORMAL: u8 = 0x03;
const FILTER_COEFF_4: u8 = 0x02;
const OVERSAMPLING_8X: u8 = 0x04;
const OVERSAMPLING_1X: u8 = 0x01;

/// Raw ADC counts are unsigned 24-bit; the signed offset is taken from
/// mid-scale (2^23).
const RAW_MIDPOINT: u32 = 1 << 23;

const SETTLE_MS: u32 = 20;

// ───────────────────────────────────────────────────────────────
// Calibration block decode
// ───────────────────────────────────────────────────────────────

/// Location of a 20-bit coefficient: two full bytes plus one nibble of
/// byte 24 (`a0` takes the low nibble, `b00` the high one).
#[derive(Debug, Clone, Copy)]
struct Packed20 {
    hi: usize,
    mid: usize,
    high_nibble: bool,
}

const LAYOUT_B00: Packed20 = Packed20 { hi: 0, mid: 1, high_nibble: true };
const LAYOUT_A0: Packed20 = Packed20 { hi: 18, mid: 19, high_nibble: false };

/// Byte offsets of the big-endian 16-bit coefficients within the block.
const OFF_BT1: usize = 2;
const OFF_BT2: usize = 4;
const OFF_BP1: usize = 6;
const OFF_B11: usize = 8;
const OFF_BP2: usize = 10;
const OFF_B12: usize = 12;
const OFF_B21: usize = 14;
const OFF_BP3: usize = 16;
const OFF_A1: usize = 20;
const OFF_A2: usize = 22;

fn be16(block: &[u8; CALIBRATION_LEN], off: usize) -> i16 {
    i16::from_be_bytes([block[off], block[off + 1]])
}

fn packed20(block: &[u8; CALIBRATION_LEN], layout: Packed20) -> i32 {
    let nibble = if layout.high_nibble {
        (block[24] & 0xF0) >> 4
    } else {
        block[24] & 0x0F
    };
    let raw = (u32::from(block[layout.hi]) << 12)
        | (u32::from(block[layout.mid]) << 4)
        | u32::from(nibble);
    // Sign-extend 20 bits.
    ((raw << 12) as i32) >> 12
}

/// The 12 signed factory coefficients, exactly as stored on the chip.
///
/// Only constructed by [`Calibration::decode`], so all fields are always
/// populated together — a partially calibrated state is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    pub a0: i32,
    pub a1: i16,
    pub a2: i16,
    pub b00: i32,
    pub bt1: i16,
    pub bt2: i16,
    pub bp1: i16,
    pub b11: i16,
    pub bp2: i16,
    pub b12: i16,
    pub b21: i16,
    pub bp3: i16,
}

impl Calibration {
    /// Decode the 25-byte OTP block. Pure; layout per the tables above.
    pub fn decode(block: &[u8; CALIBRATION_LEN]) -> Self {
        Self {
            a0: packed20(block, LAYOUT_A0),
            a1: be16(block, OFF_A1),
            a2: be16(block, OFF_A2),
            b00: packed20(block, LAYOUT_B00),
            bt1: be16(block, OFF_BT1),
            bt2: be16(block, OFF_BT2),
            bp1: be16(block, OFF_BP1),
            b11: be16(block, OFF_B11),
            bp2: be16(block, OFF_BP2),
            b12: be16(block, OFF_B12),
            b21: be16(block, OFF_B21),
            bp3: be16(block, OFF_BP3),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Derived ("ik") fixed-point coefficients
// ───────────────────────────────────────────────────────────────

/// Fixed-point working coefficients, derived once per device.
///
/// The multiply/add constants are exact integers from the vendor's
/// compensation reference; the Q-format of each product is tracked in
/// the comments of [`convert_temperature`]/[`convert_pressure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IkCoefficients {
    pub a0: i32,  // 20Q4
    pub b00: i32, // 20Q4
    pub a1: i32,  // 31Q23
    pub a2: i32,  // 30Q47
    pub bt1: i64, // 28Q15
    pub bt2: i64, // 34Q38
    pub bp1: i64, // 31Q20
    pub b11: i64, // 28Q34
    pub bp2: i64, // 29Q43
    pub b12: i64, // 29Q53
    pub b21: i64, // 29Q60
    pub bp3: i64, // 28Q65
}

impl IkCoefficients {
    /// Apply the fixed linear transforms. Pure and deterministic: the same
    /// calibration always yields the same coefficients.
    pub fn derive(cal: &Calibration) -> Self {
        Self {
            a0: cal.a0,
            b00: cal.b00,
            a1: (3608 * i64::from(cal.a1) - 1_731_677_965) as i32,
            a2: (16889 * i64::from(cal.a2) - 87_619_360) as i32,
            bt1: 2982 * i64::from(cal.bt1) + 107_370_906,
            bt2: 329_854 * i64::from(cal.bt2) + 108_083_093,
            bp1: 19923 * i64::from(cal.bp1) + 1_133_836_764,
            b11: 2406 * i64::from(cal.b11) + 118_215_883,
            bp2: 3079 * i64::from(cal.bp2) - 181_579_595,
            b12: 6846 * i64::from(cal.b12) + 85_590_281,
            b21: 13836 * i64::from(cal.b21) + 79_333_336,
            bp3: 2915 * i64::from(cal.bp3) + 157_155_561,
        }
    }

    /// Compensate one raw sample pair.
    ///
    /// Returns `(temperature in °C·256, pressure in Pa·16)`; callers scale
    /// to float and normalise Pa→hPa themselves.
    pub fn compensate(&self, raw_pressure: u32, raw_temperature: u32) -> (i16, i32) {
        let dp = raw_pressure.wrapping_sub(RAW_MIDPOINT) as i32;
        let dt = raw_temperature.wrapping_sub(RAW_MIDPOINT) as i32;
        let tx = convert_temperature(self, dt);
        (tx, convert_pressure(self, dp, tx))
    }
}

/// Temperature polynomial: two degree-2 terms in `dt`, aligned to a common
/// Q-format by the per-term shifts, normalised by 32767, truncated to Q0.
/// Output is °C·256.
pub fn convert_temperature(ik: &IkCoefficients, dt: i32) -> i16 {
    let dt = i64::from(dt);
    let wk1 = i64::from(ik.a1) * dt; // 31Q23+24-1=54 (54Q23)
    let mut wk2 = (i64::from(ik.a2) * dt) >> 14; // 30Q47+24-1=53 (39Q33)
    wk2 = (wk2 * dt) >> 10; // 39Q33+24-1=62 (52Q23)
    wk2 = ((wk1 + wk2) / 32767) >> 19; // 54,52->55Q23 (20Q04)
    ((i64::from(ik.a0) + wk2) >> 4) as i16 // 21Q4 -> 17Q0
}

/// Pressure polynomial: weighted sum of eight cross-terms of (`tx`, `dp`),
/// each shifted to a common Q-format before summation, normalised by 32767
/// and offset by `b00`. Output is Pa·16.
pub fn convert_pressure(ik: &IkCoefficients, dp: i32, tx: i16) -> i32 {
    let dp = i64::from(dp);
    let tx = i64::from(tx);

    let mut wk1 = ik.bt1 * tx; // 28Q15+16-1=43 (43Q15)
    let mut wk2 = (ik.bp1 * dp) >> 5; // 31Q20+24-1=54 (49Q15)
    wk1 += wk2; // 43,49->50Q15

    wk2 = (ik.bt2 * tx) >> 1; // 34Q38+16-1=49 (48Q37)
    wk2 = (wk2 * tx) >> 8; // 48Q37+16-1=63 (55Q29)
    let mut wk3 = wk2; // 55Q29
    wk2 = (ik.b11 * tx) >> 4; // 28Q34+16-1=43 (39Q30)
    wk2 = (wk2 * dp) >> 1; // 39Q30+24-1=62 (61Q29)
    wk3 += wk2; // 55,61->62Q29
    wk2 = (ik.bp2 * dp) >> 13; // 29Q43+24-1=52 (39Q30)
    wk2 = (wk2 * dp) >> 1; // 39Q30+24-1=62 (61Q29)
    wk3 += wk2; // 62,61->63Q29
    wk1 += wk3 >> 14; // Q29 >> 14 -> Q15

    wk2 = ik.b12 * tx; // 29Q53+16-1=45 (45Q53)
    wk2 = (wk2 * tx) >> 22; // 45Q53+16-1=61 (39Q31)
    wk2 = (wk2 * dp) >> 1; // 39Q31+24-1=62 (61Q30)
    wk3 = wk2; // 61Q30
    wk2 = (ik.b21 * tx) >> 6; // 29Q60+16-1=45 (39Q54)
    wk2 = (wk2 * dp) >> 23; // 39Q54+24-1=62 (39Q31)
    wk2 = (wk2 * dp) >> 1; // 39Q31+24-1=62 (61Q30)
    wk3 += wk2; // 61,61->62Q30
    wk2 = (ik.bp3 * dp) >> 12; // 28Q65+24-1=51 (39Q53)
    wk2 = (wk2 * dp) >> 23; // 39Q53+24-1=62 (39Q30)
    wk2 *= dp; // 39Q30+24-1=62 (62Q30)
    wk3 += wk2; // 62,62->63Q30
    wk1 += wk3 >> 15; // Q30 >> 15 = Q15

    wk1 /= 32767;
    wk1 >>= 11; // -> Q4
    wk1 += i64::from(ik.b00); // Q4 + 20Q4
    wk1 as i32
}

// ───────────────────────────────────────────────────────────────
// Bus-facing driver
// ───────────────────────────────────────────────────────────────

/// One raw sample pair, straight off the result registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub pressure: u32,
    pub temperature: u32,
}

/// Compensated measurement in physical units (pressure still native Pa;
/// the caller normalises to hPa).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub temperature_c: f32,
    pub pressure_pa: f32,
}

/// A probed, calibrated QMP6988 on a shared I2C bus.
#[derive(Debug)]
pub struct Qmp6988 {
    address: u8,
    ik: IkCoefficients,
}

impl Qmp6988 {
    /// Probe both possible addresses, verify the chip identity, soft-reset,
    /// read + derive the calibration and configure continuous sampling.
    ///
    /// Fails with [`Error::DeviceAbsent`] when no address answers with the
    /// right identity; the compensation engine is then never initialised.
    pub fn probe<B, D>(bus: &mut B, delay: &mut D) -> Result<Self, Error<B::Error>>
    where
        B: I2c,
        D: DelayNs,
    {
        for &address in &[ADDR_PRIMARY, ADDR_SECONDARY] {
            let mut id = [0u8; 1];
            if bus.write_read(address, &[REG_CHIP_ID], &mut id).is_err() {
                debug!("qmp6988: no response at {address:#04x}");
                continue;
            }
            if id[0] != CHIP_ID {
                debug!("qmp6988: unexpected chip id {:#04x} at {address:#04x}", id[0]);
                continue;
            }

            for &step in &RESET_SEQUENCE {
                bus.write(address, &[REG_RESET, step]).map_err(Error::I2c)?;
                delay.delay_ms(SETTLE_MS);
            }

            let mut block = [0u8; CALIBRATION_LEN];
            bus.write_read(address, &[REG_CALIBRATION], &mut block)
                .map_err(Error::I2c)?;
            let cal = Calibration::decode(&block);
            let ik = IkCoefficients::derive(&cal);
            debug!("qmp6988: calibration {cal:?}");

            let dev = Self { address, ik };
            dev.configure(bus, delay)?;
            info!("qmp6988: ready at {address:#04x}");
            return Ok(dev);
        }
        Err(Error::DeviceAbsent)
    }

    /// Continuous mode, IIR filter 4, oversampling P=8x / T=1x.
    fn configure<B, D>(&self, bus: &mut B, delay: &mut D) -> Result<(), Error<B::Error>>
    where
        B: I2c,
        D: DelayNs,
    {
        self.update_ctrl_meas(bus, 0xFC, POWER_MODE_NORMAL)?;
        delay.delay_ms(SETTLE_MS);

        bus.write(self.address, &[REG_IIR_CONFIG, FILTER_COEFF_4 & 0x03])
            .map_err(Error::I2c)?;
        delay.delay_ms(SETTLE_MS);

        self.update_ctrl_meas(bus, 0xE3, OVERSAMPLING_8X << 2)?;
        delay.delay_ms(SETTLE_MS);
        self.update_ctrl_meas(bus, 0x1F, OVERSAMPLING_1X << 5)?;
        delay.delay_ms(SETTLE_MS);
        Ok(())
    }

    /// Read-modify-write of the measurement-control register.
    fn update_ctrl_meas<B: I2c>(
        &self,
        bus: &mut B,
        keep_mask: u8,
        set_bits: u8,
    ) -> Result<(), Error<B::Error>> {
        let mut current = [0u8; 1];
        bus.write_read(self.address, &[REG_CTRL_MEAS], &mut current)
            .map_err(Error::I2c)?;
        let next = (current[0] & keep_mask) | set_bits;
        bus.write(self.address, &[REG_CTRL_MEAS, next])
            .map_err(Error::I2c)
    }

    /// 6-byte burst read spanning the pressure and temperature result
    /// registers (each a 24-bit big-endian count).
    pub fn read_raw<B: I2c>(&self, bus: &mut B) -> Result<RawSample, Error<B::Error>> {
        let mut data = [0u8; 6];
        bus.write_read(self.address, &[REG_DATA], &mut data)
            .map_err(Error::I2c)?;
        Ok(RawSample {
            pressure: u32::from(data[0]) << 16 | u32::from(data[1]) << 8 | u32::from(data[2]),
            temperature: u32::from(data[3]) << 16 | u32::from(data[4]) << 8 | u32::from(data[5]),
        })
    }

    /// Read and compensate one sample.
    pub fn measure<B: I2c>(&self, bus: &mut B) -> Result<Measurement, Error<B::Error>> {
        let raw = self.read_raw(bus)?;
        let (tx, p16) = self.ik.compensate(raw.pressure, raw.temperature);
        Ok(Measurement {
            temperature_c: f32::from(tx) / 256.0,
            pressure_pa: p16 as f32 / 16.0,
        })
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn coefficients(&self) -> &IkCoefficients {
        &self.ik
    }
}
