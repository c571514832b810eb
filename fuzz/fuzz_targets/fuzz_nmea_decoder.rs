//! Fuzz target: the streaming NMEA decoder.
//!
//! Feeds arbitrary byte streams and checks that the decoder never
//! panics and that anything it commits is internally consistent.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Committed coordinates are finite
//! - Committed time/date fields are in calendar range
//!
//! cargo fuzz run fuzz_nmea_decoder

#![no_main]

use envstation::gps::nmea::NmeaDecoder;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut dec = NmeaDecoder::new();
    for &b in data {
        dec.feed(b);
    }

    if let Some((lat, lng)) = dec.location() {
        assert!(lat.is_finite());
        assert!(lng.is_finite());
    }
    if let Some(t) = dec.time() {
        assert!(t.hour < 24 && t.minute < 60 && t.second < 60);
    }
    if let Some(d) = dec.date() {
        assert!((1..=12).contains(&d.month) && (1..=31).contains(&d.day));
        assert!((2000..=2099).contains(&d.year));
    }
});
