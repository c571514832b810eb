//! HTTP read-out surface.
//!
//! Two GET endpoints, both snapshot-only: `/sensors` returns the latest
//! environmental triple, `/gps` the latest fix. The payload builders are
//! pure functions over store snapshots so the wire format is testable on
//! the host; the server itself only exists on target.
//!
//! `/gps` changes shape with fix validity: without a fix the payload
//! collapses to just `{"ut": ...}` so clients can distinguish "no fix"
//! from "fix at 0,0".

use serde_json::{json, Value};

use crate::gps::GpsFix;
use crate::sensors::EnvSnapshot;

pub fn sensors_payload(env: &EnvSnapshot) -> Value {
    json!({
        "temp": env.temperature_c,
        "hum": env.humidity_pct,
        "press": env.pressure_hpa,
    })
}

pub fn gps_payload(fix: &GpsFix) -> Value {
    if fix.valid {
        json!({
            "lat": fix.latitude,
            "lng": fix.longitude,
            "alt": fix.altitude_m,
            "sat": fix.satellites,
            "ut": fix.unix_time,
        })
    } else {
        json!({ "ut": fix.unix_time })
    }
}

#[cfg(target_os = "espidf")]
pub mod server {
    use std::sync::Arc;

    use esp_idf_svc::http::server::{Configuration, EspHttpServer};
    use esp_idf_svc::http::Method;
    use esp_idf_svc::io::Write;
    use log::info;

    use crate::store::SensorStores;

    const JSON_HEADERS: [(&str, &str); 1] = [("Content-Type", "application/json")];

    /// Start the server and register both endpoints. The returned handle
    /// must be kept alive for as long as the endpoints should serve.
    pub fn start(stores: Arc<SensorStores>) -> anyhow::Result<EspHttpServer<'static>> {
        let mut server = EspHttpServer::new(&Configuration::default())?;

        let env_stores = stores.clone();
        server.fn_handler::<anyhow::Error, _>("/sensors", Method::Get, move |req| {
            let body = super::sensors_payload(&env_stores.env.snapshot()).to_string();
            let mut resp = req.into_response(200, Some("OK"), &JSON_HEADERS)?;
            resp.write_all(body.as_bytes())?;
            Ok(())
        })?;

        server.fn_handler::<anyhow::Error, _>("/gps", Method::Get, move |req| {
            let body = super::gps_payload(&stores.gps.snapshot()).to_string();
            let mut resp = req.into_response(200, Some("OK"), &JSON_HEADERS)?;
            resp.write_all(body.as_bytes())?;
            Ok(())
        })?;

        info!("web: serving /sensors and /gps");
        Ok(server)
    }
}
