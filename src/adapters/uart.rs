//! Port C UART adapter — the GPS receiver's byte stream.

#[cfg(target_os = "espidf")]
pub use espidf::GpsUart;

#[cfg(target_os = "espidf")]
mod espidf {
    use esp_idf_hal::delay::NON_BLOCK;
    use esp_idf_hal::gpio::AnyIOPin;
    use esp_idf_hal::peripheral::Peripheral;
    use esp_idf_hal::uart::{config::Config, Uart, UartDriver};
    use esp_idf_hal::units::Hertz;
    use log::warn;

    use crate::pins;
    use crate::ports::ByteSource;

    /// Receive-only wrapper over the Port C UART.
    pub struct GpsUart {
        driver: UartDriver<'static>,
    }

    impl GpsUart {
        pub fn new<U: Uart>(
            uart: impl Peripheral<P = U> + 'static,
            tx: AnyIOPin,
            rx: AnyIOPin,
        ) -> anyhow::Result<Self> {
            let config = Config::new().baudrate(Hertz(pins::GPS_UART_BAUD));
            let driver = UartDriver::new(
                uart,
                tx,
                rx,
                Option::<AnyIOPin>::None,
                Option::<AnyIOPin>::None,
                &config,
            )?;
            Ok(Self { driver })
        }
    }

    impl ByteSource for GpsUart {
        fn read(&mut self, buf: &mut [u8]) -> usize {
            match self.driver.read(buf, NON_BLOCK) {
                Ok(n) => n,
                Err(e) => {
                    warn!("uart: read failed: {e}");
                    0
                }
            }
        }
    }
}
