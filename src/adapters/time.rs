//! Monotonic millisecond clock.
//!
//! - **`target_os = "espidf"`** — wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer.
//! - **`not(target_os = "espidf")`** — uses `std::time::Instant` for
//!   host-side testing.
//!
//! Either way the value is truncated to `u32` milliseconds and wraps
//! after ~49.7 days, which is why [`Monotonic`] consumers compare with
//! `wrapping_sub`.

use crate::ports::Monotonic;

pub struct TickClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

#[cfg(target_os = "espidf")]
impl Monotonic for TickClock {
    fn now_ms(&self) -> u32 {
        ((unsafe { esp_idf_svc::sys::esp_timer_get_time() }) / 1000) as u32
    }
}

#[cfg(not(target_os = "espidf"))]
impl Monotonic for TickClock {
    fn now_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}
