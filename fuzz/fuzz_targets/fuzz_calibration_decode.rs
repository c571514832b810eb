//! Fuzz target: calibration decode + full compensation chain.
//!
//! First 25 bytes form the OTP block, the next 6 a raw sample. The
//! integer pipeline must be total: no panic, no overflow, for any
//! bit pattern the bus could hand over.
//!
//! cargo fuzz run fuzz_calibration_decode

#![no_main]

use envstation::sensors::qmp6988::{Calibration, IkCoefficients};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 31 {
        return;
    }
    let mut block = [0u8; 25];
    block.copy_from_slice(&data[..25]);

    let cal = Calibration::decode(&block);
    let ik = IkCoefficients::derive(&cal);

    let raw = |i: usize| {
        u32::from(data[25 + i * 3]) << 16
            | u32::from(data[26 + i * 3]) << 8
            | u32::from(data[27 + i * 3])
    };
    let (tx, p16) = ik.compensate(raw(0), raw(1));
    // Deterministic and total.
    assert_eq!((tx, p16), ik.compensate(raw(0), raw(1)));
});
