//! Buffered UART receiver
//!
//! The UART interrupt fills a ring buffer in the background. Reads only
//! drain what is already there, so a poll never waits on the line.

use embassy_rp::uart::{self, BufferedUartRx, Error};
use embedded_io::ReadReady;
use strutlight_hal::uart::{DataBits, Parity, StopBits};
use strutlight_hal::{UartConfig, UartRx};

/// Translate a line configuration into the peripheral's config
pub fn peripheral_config(line: &UartConfig) -> uart::Config {
    let mut config = uart::Config::default();
    config.baudrate = line.baudrate;
    config.data_bits = match line.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
    };
    config.parity = match line.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    config.stop_bits = match line.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    config
}

/// Receive half of a buffered UART
pub struct SerialRx {
    rx: BufferedUartRx,
}

impl SerialRx {
    pub fn new(rx: BufferedUartRx) -> Self {
        Self { rx }
    }
}

impl UartRx for SerialRx {
    type Error = Error;

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        if buf.is_empty() || !self.rx.read_ready()? {
            return Ok(0);
        }
        // Data is buffered, so this returns without blocking
        self.rx.blocking_read(buf)
    }
}
