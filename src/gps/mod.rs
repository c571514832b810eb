//! GPS fix model, timestamp assembly and RTC sync debounce.
//!
//! The NMEA decoder ([`nmea`]) exposes per-field `Option` validity; this
//! module turns a decoder snapshot into the [`GpsFix`] published to the
//! stores, converts date+time to a unix timestamp with the configured
//! timezone shift applied, and rate-limits RTC writes.

use chrono::{Duration, NaiveDate};

pub mod nmea;

pub use nmea::NmeaDecoder;

/// Latest GPS state as published to consumers.
///
/// When `valid` is false all positional fields are zero; `unix_time`
/// keeps its last known value so wall-clock consumers keep working
/// through fix dropouts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_m: f32,
    pub satellites: u32,
    pub unix_time: u64,
    pub valid: bool,
}

/// Unix timestamp (seconds) for a decoded date + time-of-day, shifted by
/// `timezone_min` minutes. Returns `None` for calendar-impossible input.
pub fn fix_timestamp(date: nmea::Date, time: nmea::Time, timezone_min: i32) -> Option<u64> {
    let naive = NaiveDate::from_ymd_opt(i32::from(date.year), u32::from(date.month), u32::from(date.day))?
        .and_hms_opt(
            u32::from(time.hour),
            u32::from(time.minute),
            u32::from(time.second),
        )?;
    let shifted = naive + Duration::minutes(i64::from(timezone_min));
    u64::try_from(shifted.and_utc().timestamp()).ok()
}

/// Debounce for RTC writes sourced from GPS time.
///
/// The receiver reports time every second, but the RTC only needs a
/// correction occasionally and only when the fix geometry is good. A
/// write is allowed when more than `min_satellites` are in view and
/// either no write has happened yet or at least `min_interval_ms` have
/// elapsed since the last one. Instants wrap at `u32::MAX`, so elapsed
/// time uses `wrapping_sub`.
#[derive(Debug)]
pub struct TimeSync {
    min_interval_ms: u32,
    min_satellites: u32,
    last_sync_ms: Option<u32>,
}

impl TimeSync {
    pub fn new(min_interval_ms: u32, min_satellites: u32) -> Self {
        Self {
            min_interval_ms,
            min_satellites,
            last_sync_ms: None,
        }
    }

    /// Decide whether to write the RTC now; records the instant when it
    /// says yes.
    pub fn should_sync(&mut self, now_ms: u32, satellites: u32) -> bool {
        if satellites <= self.min_satellites {
            return false;
        }
        let due = match self.last_sync_ms {
            None => true,
            Some(last) => now_ms.wrapping_sub(last) >= self.min_interval_ms,
        };
        if due {
            self.last_sync_ms = Some(now_ms);
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::nmea::{Date, Time};
    use super::*;

    #[test]
    fn timestamp_for_known_date() {
        // 1994-03-23 12:35:19 UTC.
        let date = Date { year: 1994, month: 3, day: 23 };
        let time = Time { hour: 12, minute: 35, second: 19 };
        assert_eq!(fix_timestamp(date, time, 0), Some(764_426_119));
    }

    #[test]
    fn timestamp_applies_timezone_shift() {
        let date = Date { year: 1994, month: 3, day: 23 };
        let time = Time { hour: 12, minute: 35, second: 19 };
        assert_eq!(fix_timestamp(date, time, 540), Some(764_426_119 + 540 * 60));
        assert_eq!(fix_timestamp(date, time, -60), Some(764_426_119 - 3600));
    }

    #[test]
    fn timestamp_rejects_impossible_calendar_dates() {
        let time = Time { hour: 0, minute: 0, second: 0 };
        assert_eq!(
            fix_timestamp(Date { year: 2023, month: 2, day: 30 }, time, 0),
            None
        );
        assert_eq!(
            fix_timestamp(Date { year: 2023, month: 13, day: 1 }, time, 0),
            None
        );
    }

    #[test]
    fn first_sync_fires_immediately_with_enough_satellites() {
        let mut sync = TimeSync::new(30 * 60 * 1000, 4);
        assert!(sync.should_sync(1_000, 5));
    }

    #[test]
    fn satellite_threshold_is_strictly_greater_than() {
        let mut sync = TimeSync::new(1000, 4);
        assert!(!sync.should_sync(0, 4));
        assert!(!sync.should_sync(0, 0));
        assert!(sync.should_sync(0, 5));
    }

    #[test]
    fn resync_waits_for_the_full_interval() {
        let mut sync = TimeSync::new(30 * 60 * 1000, 4);
        assert!(sync.should_sync(0, 8));
        assert!(!sync.should_sync(10 * 60 * 1000, 8));
        assert!(!sync.should_sync(30 * 60 * 1000 - 1, 8));
        assert!(sync.should_sync(30 * 60 * 1000, 8));
        // Interval restarts from the last accepted sync.
        assert!(!sync.should_sync(59 * 60 * 1000, 8));
        assert!(sync.should_sync(60 * 60 * 1000, 8));
    }

    #[test]
    fn low_satellite_count_does_not_consume_the_interval() {
        let mut sync = TimeSync::new(1000, 4);
        assert!(sync.should_sync(0, 8));
        assert!(!sync.should_sync(2000, 2));
        // The rejected attempt must not reset the timer.
        assert!(sync.should_sync(2000, 8));
    }

    #[test]
    fn elapsed_time_survives_tick_wraparound() {
        let mut sync = TimeSync::new(1000, 4);
        assert!(sync.should_sync(u32::MAX - 100, 8));
        // 900 ms after wraparound: not due yet.
        assert!(!sync.should_sync(799, 8));
        // 1000 ms after the last sync, despite the wrap.
        assert!(sync.should_sync(899, 8));
    }
}
