//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter | Implements   | Connects to                    |
//! |---------|--------------|--------------------------------|
//! | `i2c`   | (bus setup)  | Port A I2C master              |
//! | `rtc`   | Rtc          | BM8563 on the internal I2C bus |
//! | `time`  | Monotonic    | ESP high-resolution timer      |
//! | `uart`  | ByteSource   | Port C UART (GPS receiver)     |
//! | `wifi`  | (bring-up)   | ESP-IDF WiFi STA               |
//!
//! Everything hardware-facing is gated on `target_os = "espidf"`; the
//! host side gets either an equivalent (`time`) or nothing (`uart`,
//! `wifi`) — host tests use their own doubles for those ports.

pub mod i2c;
pub mod rtc;
pub mod time;
pub mod uart;
pub mod wifi;
