//! Firmware entry point — ESP-IDF bootstrap and task spawn.
//!
//! Boot order: logger, WiFi (blocking, best-effort), shared stores,
//! then one std thread per acquisition task and the HTTP server on the
//! main thread's stack. Tasks never see each other's hardware; the
//! stores are the only shared state.

use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};

use envstation::adapters::rtc::Bm8563;
use envstation::adapters::time::TickClock;
use envstation::adapters::uart::GpsUart;
use envstation::adapters::{i2c, wifi};
use envstation::config::SystemConfig;
use envstation::pins;
use envstation::store::SensorStores;
use envstation::tasks::{EnvTask, GpsTask};
use envstation::web;

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::IOPin;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

// Baked in at build time; an unset SSID fails credential validation and
// the station runs without the HTTP surface.
const WIFI_SSID: &str = match option_env!("ENVSTATION_WIFI_SSID") {
    Some(ssid) => ssid,
    None => "",
};
const WIFI_PASSWORD: &str = match option_env!("ENVSTATION_WIFI_PASSWORD") {
    Some(password) => password,
    None => "",
};

/// Acquisition threads get their own stacks; the default 3 kB is too
/// tight once the NMEA decoder and logging are on it.
const TASK_STACK_BYTES: usize = 8 * 1024;

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("envstation v{}", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let config = SystemConfig::default();
    let stores = SensorStores::new();

    // WiFi is best-effort: the station keeps sampling and syncing the
    // RTC with no network, it just has no read-out surface.
    let wifi_handle = match wifi::connect(
        peripherals.modem,
        sysloop,
        nvs,
        WIFI_SSID,
        WIFI_PASSWORD,
    ) {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("wifi: offline ({e}); continuing without HTTP");
            None
        }
    };

    // ── Env task: Port A I2C, three sensors ───────────────────
    let port_a = i2c::port_a_bus(
        peripherals.i2c0,
        peripherals.pins.gpio32.downgrade(),
        peripherals.pins.gpio33.downgrade(),
    )?;
    let env_task = EnvTask::new(port_a, FreeRtos, config.clone(), stores.clone());
    std::thread::Builder::new()
        .name("env".into())
        .stack_size(TASK_STACK_BYTES)
        .spawn(move || env_task.run())?;

    // ── GPS task: Port C UART + internal-bus RTC ──────────────
    let uart = GpsUart::new(
        peripherals.uart1,
        peripherals.pins.gpio14.downgrade(),
        peripherals.pins.gpio13.downgrade(),
    )?;
    let internal = i2c::internal_bus(
        peripherals.i2c1,
        peripherals.pins.gpio21.downgrade(),
        peripherals.pins.gpio22.downgrade(),
    )?;
    let gps_task = GpsTask::new(
        uart,
        TickClock::new(),
        Bm8563::new(internal),
        config.clone(),
        stores.clone(),
    );
    std::thread::Builder::new()
        .name("gps".into())
        .stack_size(TASK_STACK_BYTES)
        .spawn(move || gps_task.run())?;

    // ── HTTP surface ──────────────────────────────────────────
    let _server = if wifi_handle.is_some() {
        Some(web::server::start(stores)?)
    } else {
        None
    };

    info!(
        "boot complete (port A sda={} scl={}, port C rx={})",
        pins::PORT_A_SDA_GPIO,
        pins::PORT_A_SCL_GPIO,
        pins::PORT_C_UART_RX_GPIO
    );

    // Handles must outlive main; park instead of returning.
    loop {
        std::thread::park();
    }
}
