//! Shared test doubles: a scripted I2C bus and a no-op delay.

// Each integration test binary compiles its own copy; not every binary
// uses every helper.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{self, I2c, Operation};

use envstation::sensors::sht3x;

/// The one error the mock bus produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

impl i2c::Error for BusFault {
    fn kind(&self) -> i2c::ErrorKind {
        i2c::ErrorKind::Other
    }
}

/// Scripted I2C bus.
///
/// Responses are queued per (device address, register); a register here
/// is the first byte of the preceding write in the same transaction,
/// matching how every driver in the crate addresses its devices. Plain
/// reads (no register write) queue per address. The last queued response
/// is sticky and repeats forever; a queued `None` is a bus fault.
#[derive(Default)]
pub struct MockBus {
    register_responses: HashMap<(u8, u8), VecDeque<Option<Vec<u8>>>>,
    read_responses: HashMap<u8, VecDeque<Option<Vec<u8>>>>,
    absent: HashSet<u8>,
    /// Every write the bus saw, including the register byte.
    pub writes: Vec<(u8, Vec<u8>)>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for a register read of `addr`.
    pub fn respond(&mut self, addr: u8, reg: u8, bytes: &[u8]) {
        self.register_responses
            .entry((addr, reg))
            .or_default()
            .push_back(Some(bytes.to_vec()));
    }

    /// Queue a bus fault for a register read of `addr`.
    pub fn respond_fault(&mut self, addr: u8, reg: u8) {
        self.register_responses
            .entry((addr, reg))
            .or_default()
            .push_back(None);
    }

    /// Queue a response for a plain (register-less) read of `addr`.
    pub fn respond_read(&mut self, addr: u8, bytes: &[u8]) {
        self.read_responses
            .entry(addr)
            .or_default()
            .push_back(Some(bytes.to_vec()));
    }

    /// Queue a fault for a plain read of `addr`.
    pub fn respond_read_fault(&mut self, addr: u8) {
        self.read_responses.entry(addr).or_default().push_back(None);
    }

    /// The device at `addr` NACKs every transaction.
    pub fn absent(&mut self, addr: u8) {
        self.absent.insert(addr);
    }

    fn next(queue: Option<&mut VecDeque<Option<Vec<u8>>>>) -> Result<Vec<u8>, BusFault> {
        let queue = queue.ok_or(BusFault)?;
        let response = queue.pop_front().ok_or(BusFault)?;
        if queue.is_empty() {
            queue.push_back(response.clone()); // sticky last response
        }
        response.ok_or(BusFault)
    }
}

impl i2c::ErrorType for MockBus {
    type Error = BusFault;
}

impl I2c for MockBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.absent.contains(&address) {
            return Err(BusFault);
        }
        let mut register: Option<u8> = None;
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    self.writes.push((address, bytes.to_vec()));
                    register = bytes.first().copied();
                }
                Operation::Read(buf) => {
                    let response = match register {
                        Some(reg) => {
                            Self::next(self.register_responses.get_mut(&(address, reg)))?
                        }
                        None => Self::next(self.read_responses.get_mut(&address))?,
                    };
                    let n = buf.len().min(response.len());
                    buf[..n].copy_from_slice(&response[..n]);
                    for b in &mut buf[n..] {
                        *b = 0;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Delay that burns no time; the logic under test never depends on real
/// elapsed wall time.
pub struct NoopDelay;

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// The calibration block shared by the compensation tests. Decodes to a
/// coefficient set whose derived values are pinned in the fixture tests.
pub const CAL_BLOCK: [u8; 25] = [
    0x00, 0x82, 0x1A, 0xA6, 0xF5, 0x34, 0x4B, 0x69, 0x14, 0x68, 0xCA, 0x11, 0x2B, 0xEB, 0xEA,
    0xF8, 0x32, 0x74, 0xFE, 0xF2, 0xF6, 0x0E, 0xFE, 0x5F, 0x8A,
];

/// A well-formed SHT3x result frame with valid CRCs.
pub fn sht3x_frame(t_raw: u16, rh_raw: u16) -> [u8; 6] {
    let t = t_raw.to_be_bytes();
    let rh = rh_raw.to_be_bytes();
    [
        t[0],
        t[1],
        sht3x::crc8(&t),
        rh[0],
        rh[1],
        sht3x::crc8(&rh),
    ]
}

/// A VL53L0X result block with the given range status and distance.
pub fn tof_block(status: u8, distance_mm: u16) -> [u8; 12] {
    let mut block = [0u8; 12];
    block[0] = ((status << 3) & 0x78) | 0x01; // bit 0 doubles as data-ready
    let d = distance_mm.to_be_bytes();
    block[10] = d[0];
    block[11] = d[1];
    block
}

/// Script a full healthy QMP6988 at the primary address: identity,
/// calibration, control-register reads and one raw sample.
pub fn script_qmp6988(bus: &mut MockBus, raw_pressure: u32, raw_temperature: u32) {
    bus.respond(0x70, 0xD1, &[0x5C]);
    bus.respond(0x70, 0xA0, &CAL_BLOCK);
    bus.respond(0x70, 0xF4, &[0x00]);
    let p = raw_pressure.to_be_bytes();
    let t = raw_temperature.to_be_bytes();
    bus.respond(0x70, 0xF7, &[p[1], p[2], p[3], t[1], t[2], t[3]]);
}
