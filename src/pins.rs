//! Pin and bus assignments for the M5Stack Core2 expansion ports.

/// Port A (red) I2C — shared by SHT3x, QMP6988 and VL53L0X.
pub const PORT_A_SDA_GPIO: i32 = 32;
pub const PORT_A_SCL_GPIO: i32 = 33;
pub const PORT_A_I2C_BAUD_HZ: u32 = 100_000;

/// Port C (blue) UART — GPS receiver, NMEA at 9600 baud.
pub const PORT_C_UART_RX_GPIO: i32 = 13;
pub const PORT_C_UART_TX_GPIO: i32 = 14;
pub const GPS_UART_BAUD: u32 = 9600;

/// Internal I2C — BM8563 RTC (shared with the PMIC).
pub const INTERNAL_SDA_GPIO: i32 = 21;
pub const INTERNAL_SCL_GPIO: i32 = 22;
pub const INTERNAL_I2C_BAUD_HZ: u32 = 400_000;
