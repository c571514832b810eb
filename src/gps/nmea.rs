//! Streaming NMEA 0183 decoder.
//!
//! Byte-at-a-time: feed whatever the UART handed over, get `true` back
//! whenever a sentence passes its checksum and commits. Only GGA and RMC
//! are decoded (position/altitude/satellites and validity/date); other
//! sentence types are checksum-verified and dropped.
//!
//! Every observable field has its own `Option` validity: a field is
//! `Some` once any accepted sentence carried it and keeps its last value
//! until the next sentence that carries it. There is no global "has fix"
//! flag here — callers combine the field validities they care about.

use heapless::Vec;

/// UTC time-of-day from a sentence (sub-second part dropped).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// UTC calendar date from RMC (two-digit years pivot to 2000+).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sentence {
    Gga,
    Rmc,
    Other,
}

/// Fields staged while the current sentence is still unverified. Only a
/// matching checksum moves them into the committed set.
#[derive(Debug, Default)]
struct Staged {
    latitude: Option<f64>,
    south: bool,
    longitude: Option<f64>,
    west: bool,
    altitude_m: Option<f32>,
    satellites: Option<u32>,
    time: Option<Time>,
    date: Option<Date>,
    rmc_active: bool,
}

#[derive(Debug)]
pub struct NmeaDecoder {
    term: Vec<u8, 16>,
    term_index: u8,
    sentence: Sentence,
    parity: u8,
    in_checksum: bool,
    /// A term overflowed the buffer; the whole sentence is poisoned.
    overflowed: bool,
    staged: Staged,

    location: Option<(f64, f64)>,
    altitude_m: Option<f32>,
    satellites: Option<u32>,
    time: Option<Time>,
    date: Option<Date>,

    accepted: u32,
    checksum_failures: u32,
}

impl Default for NmeaDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl NmeaDecoder {
    pub fn new() -> Self {
        Self {
            term: Vec::new(),
            term_index: 0,
            sentence: Sentence::Other,
            parity: 0,
            in_checksum: false,
            overflowed: false,
            staged: Staged::default(),
            location: None,
            altitude_m: None,
            satellites: None,
            time: None,
            date: None,
            accepted: 0,
            checksum_failures: 0,
        }
    }

    /// Consume one byte. Returns `true` when this byte completed a
    /// sentence that passed its checksum and committed.
    pub fn feed(&mut self, byte: u8) -> bool {
        match byte {
            b'$' => {
                self.term.clear();
                self.term_index = 0;
                self.sentence = Sentence::Other;
                self.parity = 0;
                self.in_checksum = false;
                self.overflowed = false;
                self.staged = Staged::default();
                false
            }
            b',' => {
                self.parity ^= byte;
                self.end_term();
                false
            }
            b'*' => {
                self.end_term();
                self.in_checksum = true;
                false
            }
            b'\r' | b'\n' => self.end_sentence(),
            _ => {
                if !self.in_checksum {
                    self.parity ^= byte;
                }
                // An over-long term would truncate to a value that can
                // still parse (and the parity covers the dropped bytes),
                // so the sentence must not commit.
                if self.term.push(byte).is_err() {
                    self.overflowed = true;
                }
                false
            }
        }
    }

    pub fn location(&self) -> Option<(f64, f64)> {
        self.location
    }

    pub fn altitude_m(&self) -> Option<f32> {
        self.altitude_m
    }

    pub fn satellites(&self) -> Option<u32> {
        self.satellites
    }

    pub fn time(&self) -> Option<Time> {
        self.time
    }

    pub fn date(&self) -> Option<Date> {
        self.date
    }

    /// Sentences that passed their checksum since construction.
    pub fn accepted(&self) -> u32 {
        self.accepted
    }

    /// Sentences dropped: checksum mismatch or an over-long term.
    pub fn checksum_failures(&self) -> u32 {
        self.checksum_failures
    }

    fn end_term(&mut self) {
        let term = core::mem::take(&mut self.term);
        self.process_term(self.term_index, &term);
        self.term_index = self.term_index.saturating_add(1);
    }

    fn end_sentence(&mut self) -> bool {
        if !self.in_checksum || self.term.is_empty() {
            return false;
        }
        let expected = core::str::from_utf8(&self.term)
            .ok()
            .and_then(|s| u8::from_str_radix(s, 16).ok());
        self.term.clear();
        self.in_checksum = false;
        match expected {
            Some(sum) if sum == self.parity && !self.overflowed => {
                self.commit();
                self.accepted = self.accepted.wrapping_add(1);
                true
            }
            _ => {
                self.checksum_failures = self.checksum_failures.wrapping_add(1);
                false
            }
        }
    }

    fn process_term(&mut self, index: u8, term: &[u8]) {
        if index == 0 {
            self.sentence = match term {
                b"GPGGA" | b"GNGGA" => Sentence::Gga,
                b"GPRMC" | b"GNRMC" => Sentence::Rmc,
                _ => Sentence::Other,
            };
            return;
        }
        match (self.sentence, index) {
            (Sentence::Gga, 1) | (Sentence::Rmc, 1) => self.staged.time = parse_time(term),
            (Sentence::Rmc, 2) => self.staged.rmc_active = term == b"A",
            (Sentence::Gga, 2) | (Sentence::Rmc, 3) => {
                self.staged.latitude = parse_coordinate(term);
            }
            (Sentence::Gga, 3) | (Sentence::Rmc, 4) => self.staged.south = term == b"S",
            (Sentence::Gga, 4) | (Sentence::Rmc, 5) => {
                self.staged.longitude = parse_coordinate(term);
            }
            (Sentence::Gga, 5) | (Sentence::Rmc, 6) => self.staged.west = term == b"W",
            (Sentence::Gga, 7) => self.staged.satellites = parse_number::<u32>(term),
            (Sentence::Gga, 9) => self.staged.altitude_m = parse_number::<f32>(term),
            (Sentence::Rmc, 9) => self.staged.date = parse_date(term),
            _ => {}
        }
    }

    /// Move staged fields into the committed set. Fields this sentence
    /// did not carry keep their previous committed value.
    fn commit(&mut self) {
        let staged = core::mem::take(&mut self.staged);
        let positional = self.sentence != Sentence::Rmc || staged.rmc_active;

        if let Some(t) = staged.time {
            self.time = Some(t);
        }
        if positional {
            if let (Some(lat), Some(lng)) = (staged.latitude, staged.longitude) {
                self.location = Some((
                    if staged.south { -lat } else { lat },
                    if staged.west { -lng } else { lng },
                ));
            }
            if let Some(d) = staged.date {
                self.date = Some(d);
            }
        }
        if let Some(alt) = staged.altitude_m {
            self.altitude_m = Some(alt);
        }
        if let Some(sats) = staged.satellites {
            self.satellites = Some(sats);
        }
    }
}

fn parse_number<T: core::str::FromStr>(term: &[u8]) -> Option<T> {
    core::str::from_utf8(term).ok()?.parse().ok()
}

/// hhmmss with an optional fractional part, which is dropped.
fn parse_time(term: &[u8]) -> Option<Time> {
    if term.len() < 6 || !term[..6].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let two = |i: usize| (term[i] - b'0') * 10 + (term[i + 1] - b'0');
    let t = Time {
        hour: two(0),
        minute: two(2),
        second: two(4),
    };
    (t.hour < 24 && t.minute < 60 && t.second < 60).then_some(t)
}

/// ddmmyy; the two-digit year maps into 2000..=2099.
fn parse_date(term: &[u8]) -> Option<Date> {
    if term.len() != 6 || !term.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let two = |i: usize| (term[i] - b'0') * 10 + (term[i + 1] - b'0');
    let d = Date {
        year: 2000 + u16::from(two(4)),
        month: two(2),
        day: two(0),
    };
    ((1..=12).contains(&d.month) && (1..=31).contains(&d.day)).then_some(d)
}

/// NMEA (d)ddmm.mmmm to unsigned decimal degrees.
fn parse_coordinate(term: &[u8]) -> Option<f64> {
    let value: f64 = parse_number(term)?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let degrees = (value / 100.0).trunc();
    let minutes = value - degrees * 100.0;
    (minutes < 60.0).then_some(degrees + minutes / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
    const RMC: &str = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";

    fn feed_str(dec: &mut NmeaDecoder, s: &str) -> u32 {
        let mut committed = 0;
        for b in s.bytes() {
            if dec.feed(b) {
                committed += 1;
            }
        }
        committed
    }

    #[test]
    fn gga_commits_location_altitude_and_satellites() {
        let mut dec = NmeaDecoder::new();
        assert_eq!(feed_str(&mut dec, GGA), 0);
        assert_eq!(feed_str(&mut dec, "\r\n"), 1);

        let (lat, lng) = dec.location().unwrap();
        assert!((lat - 48.1173).abs() < 1e-6);
        assert!((lng - 11.516_666_7).abs() < 1e-6);
        assert_eq!(dec.altitude_m(), Some(545.4));
        assert_eq!(dec.satellites(), Some(8));
        assert_eq!(
            dec.time(),
            Some(Time { hour: 12, minute: 35, second: 19 })
        );
        assert_eq!(dec.date(), None);
    }

    #[test]
    fn rmc_commits_date_and_location() {
        let mut dec = NmeaDecoder::new();
        assert_eq!(feed_str(&mut dec, RMC), 0);
        assert_eq!(feed_str(&mut dec, "\r\n"), 1);

        assert!(dec.location().is_some());
        // Two-digit years pivot into 2000..=2099.
        assert_eq!(
            dec.date(),
            Some(Date { year: 2094, month: 3, day: 23 })
        );
        assert_eq!(dec.altitude_m(), None); // RMC carries no altitude
    }

    #[test]
    fn checksum_mismatch_commits_nothing() {
        let mut dec = NmeaDecoder::new();
        let corrupted = GGA.replace("4807.038", "4907.038"); // checksum now wrong
        assert_eq!(feed_str(&mut dec, &corrupted), 0);
        assert_eq!(feed_str(&mut dec, "\r\n"), 0);
        assert_eq!(dec.location(), None);
        assert_eq!(dec.checksum_failures(), 1);
        assert_eq!(dec.accepted(), 0);
    }

    #[test]
    fn southern_and_western_hemispheres_negate() {
        let mut dec = NmeaDecoder::new();
        // Same fields as GGA but S/W; checksum recomputed.
        let sentence = "$GPGGA,123519,4807.038,S,01131.000,W,1,08,0.9,545.4,M,46.9,M,,*48\r\n";
        assert_eq!(feed_str(&mut dec, sentence), 1);
        let (lat, lng) = dec.location().unwrap();
        assert!(lat < 0.0);
        assert!(lng < 0.0);
    }

    #[test]
    fn rmc_void_status_withholds_position_but_keeps_time() {
        let mut dec = NmeaDecoder::new();
        let void = "$GPRMC,123519,V,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*7D\r\n";
        assert_eq!(feed_str(&mut dec, void), 1);
        assert_eq!(dec.location(), None);
        assert_eq!(dec.date(), None);
        assert!(dec.time().is_some());
    }

    #[test]
    fn fields_are_retained_across_sentences_that_lack_them() {
        let mut dec = NmeaDecoder::new();
        feed_str(&mut dec, GGA);
        feed_str(&mut dec, "\r\n");
        let altitude_before = dec.altitude_m();
        feed_str(&mut dec, RMC);
        feed_str(&mut dec, "\r\n");
        // RMC has no altitude or satellite count; both survive.
        assert_eq!(dec.altitude_m(), altitude_before);
        assert_eq!(dec.satellites(), Some(8));
        assert!(dec.date().is_some());
    }

    #[test]
    fn garbage_between_sentences_is_ignored() {
        let mut dec = NmeaDecoder::new();
        for &b in b"\xFF\x00garbage,,,*zz\r\n" {
            assert!(!dec.feed(b));
        }
        assert_eq!(feed_str(&mut dec, GGA), 0);
        assert_eq!(feed_str(&mut dec, "\r\n"), 1);
        assert!(dec.location().is_some());
    }

    #[test]
    fn truncated_sentence_restarts_cleanly_on_next_dollar() {
        let mut dec = NmeaDecoder::new();
        feed_str(&mut dec, "$GPGGA,123519,4807.038,N,011"); // cut mid-field
        assert_eq!(feed_str(&mut dec, GGA), 0);
        assert_eq!(feed_str(&mut dec, "\r\n"), 1);
        let (lat, _) = dec.location().unwrap();
        assert!((lat - 48.1173).abs() < 1e-6);
    }

    #[test]
    fn overlong_term_poisons_the_whole_sentence() {
        // 18 digits of satellites overflow the term buffer; the
        // truncation is invisible to the parity, so the checksum still
        // matches and the truncated value must not commit.
        let mut dec = NmeaDecoder::new();
        let padded =
            "$GPGGA,123519,4807.038,N,01131.000,E,1,000000000000000008,0.9,545.4,M,46.9,M,,*47\r\n";
        assert_eq!(feed_str(&mut dec, padded), 0);
        assert_eq!(dec.satellites(), None);
        assert_eq!(dec.location(), None);
        assert_eq!(dec.accepted(), 0);

        // The poison clears with the next sentence start.
        assert_eq!(feed_str(&mut dec, GGA), 0);
        assert_eq!(feed_str(&mut dec, "\r\n"), 1);
        assert_eq!(dec.satellites(), Some(8));
    }

    #[test]
    fn unknown_sentence_types_commit_nothing() {
        let mut dec = NmeaDecoder::new();
        // Valid checksum, uninteresting type.
        let gsv = "$GPGSV,3,1,11,03,03,111,00,04,15,270,00,06,01,010,00,13,06,292,00*74\r\n";
        assert_eq!(feed_str(&mut dec, gsv), 1);
        assert_eq!(dec.location(), None);
        assert_eq!(dec.satellites(), None);
    }

    #[test]
    fn coordinate_conversion_splits_degrees_and_minutes() {
        assert!((parse_coordinate(b"4807.038").unwrap() - 48.1173).abs() < 1e-9);
        assert!((parse_coordinate(b"01131.000").unwrap() - 11.516_666_666_7).abs() < 1e-9);
        assert_eq!(parse_coordinate(b"0000.000"), Some(0.0));
        assert_eq!(parse_coordinate(b""), None);
        assert_eq!(parse_coordinate(b"48o7.038"), None);
        // Minutes field must stay below 60.
        assert_eq!(parse_coordinate(b"4877.000"), None);
    }

    #[test]
    fn time_and_date_parsers_validate_ranges() {
        assert_eq!(parse_time(b"235959"), Some(Time { hour: 23, minute: 59, second: 59 }));
        assert_eq!(parse_time(b"123519.00"), Some(Time { hour: 12, minute: 35, second: 19 }));
        assert_eq!(parse_time(b"245959"), None);
        assert_eq!(parse_time(b"1235"), None);
        assert_eq!(parse_date(b"230394"), Some(Date { year: 2094, month: 3, day: 23 }));
        assert_eq!(parse_date(b"010123"), Some(Date { year: 2023, month: 1, day: 1 }));
        assert_eq!(parse_date(b"320194"), None);
        assert_eq!(parse_date(b"011394"), None);
        assert_eq!(parse_date(b"23039"), None);
    }
}
