//! Port A I2C master setup.
//!
//! One driver instance, owned by the env task for its whole life. All
//! three sensors share the bus and the task serialises access, so no
//! bus-sharing layer is needed.

#[cfg(target_os = "espidf")]
pub use espidf::{internal_bus, port_a_bus};

#[cfg(target_os = "espidf")]
mod espidf {
    use esp_idf_hal::gpio::AnyIOPin;
    use esp_idf_hal::i2c::{I2c, I2cConfig, I2cDriver};
    use esp_idf_hal::peripheral::Peripheral;
    use esp_idf_hal::units::Hertz;

    use crate::pins;

    /// The Port A bus carrying the SHT3x, QMP6988 and VL53L0X.
    pub fn port_a_bus<I: I2c>(
        i2c: impl Peripheral<P = I> + 'static,
        sda: AnyIOPin,
        scl: AnyIOPin,
    ) -> anyhow::Result<I2cDriver<'static>> {
        let config = I2cConfig::new().baudrate(Hertz(pins::PORT_A_I2C_BAUD_HZ));
        Ok(I2cDriver::new(i2c, sda, scl, &config)?)
    }

    /// The internal bus carrying the BM8563 RTC (and the PMIC, which this
    /// firmware never touches).
    pub fn internal_bus<I: I2c>(
        i2c: impl Peripheral<P = I> + 'static,
        sda: AnyIOPin,
        scl: AnyIOPin,
    ) -> anyhow::Result<I2cDriver<'static>> {
        let config = I2cConfig::new().baudrate(Hertz(pins::INTERNAL_I2C_BAUD_HZ));
        Ok(I2cDriver::new(i2c, sda, scl, &config)?)
    }
}
