//! Environmental sensor station firmware library.
//!
//! Exposes the acquisition and decoding logic for integration testing
//! and external inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.
//!
//! ```text
//!   Port A I2C ──▶ EnvTask ──┐
//!                            ├──▶ SensorStores ──▶ web payloads
//!   Port C UART ─▶ GpsTask ──┘          │
//!                     │                 └──▶ status
//!                     └──▶ BM8563 RTC (debounced clock sync)
//! ```

#![deny(unused_must_use)]

pub mod config;
pub mod gps;
pub mod ports;
pub mod sensors;
pub mod store;
pub mod tasks;
pub mod web;

mod error;
pub mod pins;

// ESPidf-only implementations are guarded by cfg attributes inside.
pub mod adapters;

pub use error::{Error, Result};
