//! Acquisition tasks and their lifecycle.
//!
//! Two tasks, one per bus: the env task owns the Port A I2C bus and all
//! three sensors on it; the gps task owns the Port C UART, the NMEA
//! decoder and the RTC. Each publishes into [`SensorStores`] and never
//! touches the other's hardware, so one failing brings down nothing else.
//!
//! Lifecycle per task: `Uninitialized → Probing → (Failed | Running)`.
//! A probe failure is terminal — the task logs, publishes `Failed` and
//! returns; there is no retry loop. Consumers keep reading zero-valued
//! defaults from the stores.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, Timelike};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{error, info, warn};

use crate::config::SystemConfig;
use crate::gps::{fix_timestamp, GpsFix, NmeaDecoder, TimeSync};
use crate::ports::{ByteSource, Monotonic, Rtc, RtcDateTime};
use crate::sensors::{EnvSnapshot, Qmp6988, Sht3x, Vl53l0x};
use crate::store::SensorStores;

/// Task lifecycle state, published to the status stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskState {
    #[default]
    Uninitialized,
    Probing,
    /// Probe failed for the named device; the task has exited.
    Failed(&'static str),
    Running,
}

impl core::fmt::Display for TaskState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Probing => write!(f, "probing"),
            Self::Failed(dev) => write!(f, "failed ({dev})"),
            Self::Running => write!(f, "running"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Environmental task (Port A I2C)
// ───────────────────────────────────────────────────────────────

/// Owns the I2C bus and the three sensors on it.
///
/// The barometer driver only exists after a successful probe, so a cycle
/// can never read an uncalibrated device.
pub struct EnvTask<B, D> {
    bus: B,
    delay: D,
    config: SystemConfig,
    stores: Arc<SensorStores>,
    hygrometer: Sht3x,
    barometer: Option<Qmp6988>,
    ranger: Vl53l0x,
    held_distance_mm: u16,
}

impl<B, D> EnvTask<B, D>
where
    B: I2c,
    D: DelayNs,
{
    pub fn new(bus: B, delay: D, config: SystemConfig, stores: Arc<SensorStores>) -> Self {
        let hygrometer = Sht3x::new(config.sht3x_settle_ms);
        let ranger = Vl53l0x::new(config.tof_poll_interval_ms, config.tof_poll_attempts);
        Self {
            bus,
            delay,
            config,
            stores,
            hygrometer,
            barometer: None,
            ranger,
            held_distance_mm: 0,
        }
    }

    /// Bring up all three devices. Any failure is terminal for the task.
    pub fn probe(&mut self) -> Result<(), crate::Error> {
        self.stores.env_status.publish(TaskState::Probing);

        if let Err(e) = self.hygrometer.probe(&mut self.bus, &mut self.delay) {
            warn!("env: sht3x probe failed: {e}");
            self.stores.env_status.publish(TaskState::Failed("sht3x"));
            return Err(crate::Error::BringUp("sht3x"));
        }
        match Qmp6988::probe(&mut self.bus, &mut self.delay) {
            Ok(dev) => self.barometer = Some(dev),
            Err(e) => {
                warn!("env: qmp6988 probe failed: {e}");
                self.stores.env_status.publish(TaskState::Failed("qmp6988"));
                return Err(crate::Error::BringUp("qmp6988"));
            }
        }
        if let Err(e) = self.ranger.probe(&mut self.bus) {
            warn!("env: vl53l0x probe failed: {e}");
            self.stores.env_status.publish(TaskState::Failed("vl53l0x"));
            return Err(crate::Error::BringUp("vl53l0x"));
        }

        self.stores.env_status.publish(TaskState::Running);
        info!("env: all sensors up");
        Ok(())
    }

    /// One acquisition cycle: read everything, publish everything.
    ///
    /// A transient read failure keeps that field at its previous value
    /// for this publish; the cycle itself always completes.
    pub fn run_cycle(&mut self) {
        let mut env = self.stores.env.snapshot();

        match self.hygrometer.measure(&mut self.bus, &mut self.delay) {
            Ok(reading) => {
                env.temperature_c = reading.temperature_c;
                env.humidity_pct = reading.humidity_pct;
            }
            Err(e) => warn!("env: sht3x read failed: {e}"),
        }

        if let Some(baro) = &self.barometer {
            match baro.measure(&mut self.bus) {
                Ok(m) => env.pressure_hpa = m.pressure_pa / 100.0,
                Err(e) => warn!("env: qmp6988 read failed: {e}"),
            }
        }
        self.stores.env.publish(env);

        match self.ranger.range(&mut self.bus, &mut self.delay) {
            // A reported zero means "nothing in range"; hold the last
            // real distance instead of flashing to zero.
            Ok(Some(sample)) if sample.distance_mm != 0 => {
                self.held_distance_mm = sample.distance_mm;
            }
            Ok(_) => {}
            Err(e) => warn!("env: vl53l0x read failed: {e}"),
        }
        self.stores.distance_mm.publish(self.held_distance_mm);
    }

    /// Probe once, then cycle forever. Intended as a thread body.
    pub fn run(mut self) {
        if self.probe().is_err() {
            error!("env task offline");
            return;
        }
        let interval = Duration::from_millis(u64::from(self.config.env_read_interval_ms));
        loop {
            self.run_cycle();
            std::thread::sleep(interval);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// GPS task (Port C UART)
// ───────────────────────────────────────────────────────────────

/// Owns the UART byte stream, the decoder and the RTC.
pub struct GpsTask<S, C, R> {
    uart: S,
    clock: C,
    rtc: R,
    decoder: NmeaDecoder,
    sync: TimeSync,
    config: SystemConfig,
    stores: Arc<SensorStores>,
    last_unix_time: u64,
}

impl<S, C, R> GpsTask<S, C, R>
where
    S: ByteSource,
    C: Monotonic,
    R: Rtc,
{
    pub fn new(uart: S, clock: C, rtc: R, config: SystemConfig, stores: Arc<SensorStores>) -> Self {
        let sync = TimeSync::new(
            config.clock_sync_min_interval_ms,
            config.clock_sync_min_satellites,
        );
        Self {
            uart,
            clock,
            rtc,
            decoder: NmeaDecoder::new(),
            sync,
            config,
            stores,
            last_unix_time: 0,
        }
    }

    /// The receiver needs no handshake; the task is up once the UART is.
    pub fn probe(&mut self) {
        self.stores.gps_status.publish(TaskState::Probing);
        self.stores.gps_status.publish(TaskState::Running);
        info!("gps: decoding");
    }

    /// Drain the UART buffer through the decoder; publish after every
    /// completed sentence.
    pub fn poll(&mut self) {
        let mut buf = [0u8; 256];
        loop {
            let n = self.uart.read(&mut buf);
            if n == 0 {
                break;
            }
            let mut committed = false;
            for &byte in &buf[..n] {
                committed |= self.decoder.feed(byte);
            }
            if committed {
                self.publish_fix();
            }
        }
    }

    fn publish_fix(&mut self) {
        let dec = &self.decoder;
        if let (Some(date), Some(time)) = (dec.date(), dec.time()) {
            if let Some(ts) = fix_timestamp(date, time, self.config.timezone_min) {
                self.last_unix_time = ts;
            }
        }

        // A fix is usable once both position and altitude have resolved.
        // Through a dropout the positional fields zero out but the wall
        // clock keeps its last value.
        let fix = match (dec.location(), dec.altitude_m()) {
            (Some((latitude, longitude)), Some(altitude_m)) => GpsFix {
                latitude,
                longitude,
                altitude_m,
                satellites: dec.satellites().unwrap_or(0),
                unix_time: self.last_unix_time,
                valid: true,
            },
            _ => GpsFix {
                unix_time: self.last_unix_time,
                ..GpsFix::default()
            },
        };
        self.stores.gps.publish(fix);
        self.maybe_sync_clock();
    }

    /// The RTC needs a trustworthy wall clock, not a position: sync
    /// whenever date+time have resolved and enough satellites are in
    /// view, even if the positional fix is still incomplete.
    fn maybe_sync_clock(&mut self) {
        if self.last_unix_time == 0 {
            return;
        }
        let Some(satellites) = self.decoder.satellites() else {
            return;
        };
        if !self.sync.should_sync(self.clock.now_ms(), satellites) {
            return;
        }
        let Some(dt) = DateTime::from_timestamp(self.last_unix_time as i64, 0) else {
            return;
        };
        // unix_time already carries the timezone shift; the RTC stores
        // local wall time with no zone of its own.
        let wall = RtcDateTime {
            year: dt.year() as u16,
            month: dt.month() as u8,
            day: dt.day() as u8,
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            second: dt.second() as u8,
        };
        match self.rtc.set_datetime(&wall) {
            Ok(()) => info!(
                "gps: rtc set to {:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                wall.year, wall.month, wall.day, wall.hour, wall.minute, wall.second
            ),
            Err(e) => warn!("gps: rtc write failed: {e}"),
        }
    }

    /// Probe, then poll forever. Intended as a thread body.
    pub fn run(mut self) {
        self.probe();
        let interval = Duration::from_millis(u64::from(self.config.gps_poll_interval_ms));
        loop {
            self.poll();
            std::thread::sleep(interval);
        }
    }
}
