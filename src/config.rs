//! System configuration parameters
//!
//! All tunable parameters for the sensor station. Values ship with the
//! constants the original deployment used; they can be overridden from a
//! JSON blob at provisioning time.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SystemConfig {
    // --- Sampling ---
    /// Environmental task cycle interval (milliseconds)
    pub env_read_interval_ms: u32,
    /// GPS/UART poll interval (milliseconds)
    pub gps_poll_interval_ms: u32,

    // --- SHT3x ---
    /// Settle time between measurement trigger and result read (milliseconds)
    pub sht3x_settle_ms: u32,

    // --- VL53L0X ---
    /// Data-ready poll interval (milliseconds)
    pub tof_poll_interval_ms: u32,
    /// Maximum data-ready poll attempts (attempts x interval = hard timeout)
    pub tof_poll_attempts: u32,

    // --- Clock sync ---
    /// Minutes added to GPS UTC before display/RTC write (may be negative)
    pub timezone_min: i32,
    /// Minimum interval between RTC writes from GPS time (milliseconds)
    pub clock_sync_min_interval_ms: u32,
    /// RTC is only written when more satellites than this are in view
    pub clock_sync_min_satellites: u32,
}

impl SystemConfig {
    /// Parse a provisioning-time JSON override. Unknown keys are
    /// rejected so a typo cannot silently fall back to a default.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|_| crate::Error::Config("malformed config JSON"))
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Sampling
            env_read_interval_ms: 1000,
            gps_poll_interval_ms: 200,

            // SHT3x
            sht3x_settle_ms: 200,

            // VL53L0X: 100 x 10 ms = 1 s hard timeout
            tof_poll_interval_ms: 10,
            tof_poll_attempts: 100,

            // Clock sync: at most one RTC write per 30 minutes, > 4 sats
            timezone_min: 0,
            clock_sync_min_interval_ms: 30 * 60 * 1000,
            clock_sync_min_satellites: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = SystemConfig::default();
        assert!(c.env_read_interval_ms > 0);
        assert!(c.gps_poll_interval_ms > 0);
        assert!(c.tof_poll_attempts > 0);
        assert!(c.clock_sync_min_satellites > 0);
    }

    #[test]
    fn tof_timeout_is_one_second() {
        let c = SystemConfig::default();
        assert_eq!(c.tof_poll_interval_ms * c.tof_poll_attempts, 1000);
    }

    #[test]
    fn gps_polls_faster_than_env_cycle() {
        // The UART buffer must be drained faster than sentences arrive,
        // or fixes get dropped.
        let c = SystemConfig::default();
        assert!(c.gps_poll_interval_ms < c.env_read_interval_ms);
    }

    #[test]
    fn partial_json_override_keeps_remaining_defaults() {
        let c = SystemConfig::from_json(r#"{"timezone_min": 540}"#).unwrap();
        assert_eq!(c.timezone_min, 540);
        assert_eq!(c.env_read_interval_ms, 1000);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(SystemConfig::from_json(r#"{"timzone_min": 540}"#).is_err());
        assert!(SystemConfig::from_json("not json").is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let c = SystemConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: SystemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.env_read_interval_ms, c2.env_read_interval_ms);
        assert_eq!(c.timezone_min, c2.timezone_min);
        assert_eq!(c.clock_sync_min_interval_ms, c2.clock_sync_min_interval_ms);
    }
}
