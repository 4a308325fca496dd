//! Serial transport
//!
//! Bytes are pulled from the UART in chunks and fed one at a time through
//! the reassembler. Unconsumed bytes stay in the chunk for the next poll,
//! so stream order is preserved across polls.

use strutlight_hal::UartRx;
use strutlight_protocol::{Message, SerialReassembler};

use super::{Transport, TransportError};

/// UART read chunk size
pub const SERIAL_CHUNK: usize = 64;

/// Delimiter-framed serial transport
///
/// `CAP` is the reassembler scratch capacity and must hold one frame.
pub struct SerialTransport<U, const CAP: usize> {
    uart: U,
    reassembler: SerialReassembler<CAP>,
    chunk: [u8; SERIAL_CHUNK],
    pos: usize,
    end: usize,
    idle_timeout_ms: u32,
    last_byte_ms: u32,
}

impl<U: UartRx, const CAP: usize> SerialTransport<U, CAP> {
    /// Create a transport for frames of `frame_len` bytes
    ///
    /// A partial message is dropped after `idle_timeout_ms` without a new
    /// byte; 0 disables the watchdog.
    pub fn new(uart: U, frame_len: usize, idle_timeout_ms: u32) -> Result<Self, TransportError> {
        Ok(Self {
            uart,
            reassembler: SerialReassembler::new(frame_len)?,
            chunk: [0; SERIAL_CHUNK],
            pos: 0,
            end: 0,
            idle_timeout_ms,
            last_byte_ms: 0,
        })
    }

    /// Underlying receiver
    pub fn uart_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    /// True when no message is half-received
    pub fn is_idle(&self) -> bool {
        self.reassembler.is_idle()
    }

    fn check_idle(&mut self, now_ms: u32) -> Result<Option<Message<'_>>, TransportError> {
        if self.idle_timeout_ms == 0 || self.reassembler.is_idle() {
            return Ok(None);
        }

        if now_ms.wrapping_sub(self.last_byte_ms) >= self.idle_timeout_ms {
            self.reassembler.reset();
            return Err(TransportError::Timeout);
        }

        Ok(None)
    }
}

impl<U: UartRx, const CAP: usize> Transport for SerialTransport<U, CAP> {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn setup(&mut self) -> Result<(), TransportError> {
        // UART is configured by the board before the transport is built
        self.reassembler.reset();
        self.pos = 0;
        self.end = 0;
        Ok(())
    }

    fn poll(&mut self, now_ms: u32) -> Result<Option<Message<'_>>, TransportError> {
        loop {
            if self.pos == self.end {
                let n = self
                    .uart
                    .read_available(&mut self.chunk)
                    .map_err(|_| TransportError::Read)?;
                if n == 0 {
                    return self.check_idle(now_ms);
                }
                self.pos = 0;
                self.end = n.min(SERIAL_CHUNK);
                self.last_byte_ms = now_ms;
            }

            let byte = self.chunk[self.pos];
            self.pos += 1;

            if self.reassembler.feed(byte)?.is_some() {
                return Ok(self.reassembler.completed());
            }
        }
    }
}
