//! WiFi station bring-up.
//!
//! Blocking connect at boot: the HTTP surface is useless without a
//! network, and everything else runs regardless of whether this
//! succeeds. Credential validation is host-testable; the driver calls
//! are espidf-only.

use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsError {
    InvalidSsid,
    InvalidPassword,
}

impl fmt::Display for CredentialsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
        }
    }
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_credentials(ssid: &str, password: &str) -> Result<(), CredentialsError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(CredentialsError::InvalidSsid);
    }
    if !password.is_empty() && (password.len() < 8 || password.len() > 64) {
        return Err(CredentialsError::InvalidPassword);
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
pub use espidf::connect;

#[cfg(target_os = "espidf")]
mod espidf {
    use anyhow::Context;
    use esp_idf_hal::modem::Modem;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::wifi::{
        AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi,
    };
    use log::info;

    /// Bring the station up and block until it has an IP.
    pub fn connect(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        ssid: &str,
        password: &str,
    ) -> anyhow::Result<BlockingWifi<EspWifi<'static>>> {
        super::validate_credentials(ssid, password).map_err(anyhow::Error::msg)?;

        let mut wifi = BlockingWifi::wrap(
            EspWifi::new(modem, sysloop.clone(), Some(nvs))?,
            sysloop,
        )?;

        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| anyhow::anyhow!("SSID too long"))?,
            password: password
                .try_into()
                .map_err(|_| anyhow::anyhow!("password too long"))?,
            auth_method,
            ..Default::default()
        }))?;

        wifi.start()?;
        wifi.connect().context("association failed")?;
        wifi.wait_netif_up().context("no IP lease")?;

        let ip = wifi.wifi().sta_netif().get_ip_info()?;
        info!("wifi: up at {:?}", ip.ip);
        Ok(wifi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_network_needs_no_password() {
        assert_eq!(validate_credentials("station", ""), Ok(()));
    }

    #[test]
    fn short_wpa2_password_is_rejected() {
        assert_eq!(
            validate_credentials("station", "short"),
            Err(CredentialsError::InvalidPassword)
        );
    }

    #[test]
    fn ssid_length_limits() {
        assert_eq!(validate_credentials("", "password1"), Err(CredentialsError::InvalidSsid));
        let long = "x".repeat(33);
        assert_eq!(
            validate_credentials(&long, "password1"),
            Err(CredentialsError::InvalidSsid)
        );
        let max = "x".repeat(32);
        assert_eq!(validate_credentials(&max, "password1"), Ok(()));
    }

    #[test]
    fn non_printable_ssid_is_rejected() {
        assert_eq!(
            validate_credentials("bad\u{7}name", "password1"),
            Err(CredentialsError::InvalidSsid)
        );
    }
}
