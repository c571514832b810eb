//! End-to-end barometer compensation: OTP bytes in, physical units out.
//!
//! The expected values are pinned from a reference run of the vendor
//! integer algorithm; any change to the decode layout, the derivation
//! constants or the polynomial shifts trips these.

mod common;

use common::CAL_BLOCK;
use envstation::sensors::qmp6988::{Calibration, IkCoefficients};

fn derived() -> IkCoefficients {
    IkCoefficients::derive(&Calibration::decode(&CAL_BLOCK))
}

#[test]
fn cold_low_pressure_sample() {
    // raw pressure 0x837AB0, raw temperature 0x81D2C0
    let (tx, p16) = derived().compensate(0x0083_7AB0, 0x0081_D2C0);
    assert_eq!(tx, -1027);
    assert_eq!(p16, 159_878);
    // Scaled: °C·256 and Pa·16.
    assert!((f32::from(tx) / 256.0 - -4.011_718_75).abs() < 1e-6);
    assert!((p16 as f32 / 16.0 - 9992.375).abs() < 1e-3);
}

#[test]
fn counts_below_midscale_give_negative_offsets() {
    let (tx, p16) = derived().compensate(0x0012_3456, 0x0065_4321);
    assert_eq!(tx, 10765); // 42.05078125 °C
    assert_eq!(p16, -6_964_416);
}

#[test]
fn compensation_is_pure() {
    let ik = derived();
    assert_eq!(
        ik.compensate(0x0083_7AB0, 0x0081_D2C0),
        ik.compensate(0x0083_7AB0, 0x0081_D2C0)
    );
}

#[test]
fn midscale_counts_reduce_to_the_temperature_terms() {
    // dt = dp = 0: temperature is exactly a0>>4; pressure keeps only the
    // temperature-driven terms plus b00.
    let ik = derived();
    let (tx, p16) = ik.compensate(1 << 23, 1 << 23);
    assert_eq!(i32::from(tx), ik.a0 >> 4);
    assert_eq!(tx, -270);
    assert_eq!(p16, 1574);
}
