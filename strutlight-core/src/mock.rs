//! In-memory HAL implementations for host tests

use std::collections::VecDeque;
use std::vec::Vec;

use smart_leds::RGB8;
use strutlight_hal::{DatagramSocket, LedOutput, MessageKind, MessageSocket, Received, UartRx};

/// Error returned by every mock when told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

fn copy_out(message: &[u8], buf: &mut [u8]) -> Received {
    let len = message.len().min(buf.len());
    buf[..len].copy_from_slice(&message[..len]);
    if message.len() > buf.len() {
        Received::truncated(len)
    } else {
        Received::complete(len)
    }
}

/// UART fed from a byte queue
#[derive(Debug, Default)]
pub struct MockUart {
    pending: VecDeque<u8>,
    fail: bool,
}

impl MockUart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.pending.extend(bytes.iter().copied());
    }

    pub fn fail_next(&mut self) {
        self.fail = true;
    }
}

impl UartRx for MockUart {
    type Error = MockError;

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, MockError> {
        if self.fail {
            self.fail = false;
            return Err(MockError);
        }

        let mut n = 0;
        while n < buf.len() {
            match self.pending.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}

/// Datagram socket fed from a packet queue
#[derive(Debug, Default)]
pub struct MockDatagramSocket {
    pub bound: Option<u16>,
    packets: VecDeque<Vec<u8>>,
    fail: bool,
}

impl MockDatagramSocket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, packet: &[u8]) {
        self.packets.push_back(packet.to_vec());
    }

    pub fn fail_next(&mut self) {
        self.fail = true;
    }
}

impl DatagramSocket for MockDatagramSocket {
    type Error = MockError;

    fn bind(&mut self, port: u16) -> Result<(), MockError> {
        self.bound = Some(port);
        Ok(())
    }

    fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<Received>, MockError> {
        if self.fail {
            self.fail = false;
            return Err(MockError);
        }
        Ok(self.packets.pop_front().map(|p| copy_out(&p, buf)))
    }
}

/// Message socket fed from a tagged message queue
#[derive(Debug, Default)]
pub struct MockMessageSocket {
    pub listening: Option<u16>,
    messages: VecDeque<(MessageKind, Vec<u8>)>,
    fail: bool,
}

impl MockMessageSocket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: MessageKind, message: &[u8]) {
        self.messages.push_back((kind, message.to_vec()));
    }

    pub fn fail_next(&mut self) {
        self.fail = true;
    }
}

impl MessageSocket for MockMessageSocket {
    type Error = MockError;

    fn listen(&mut self, port: u16) -> Result<(), MockError> {
        self.listening = Some(port);
        Ok(())
    }

    fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<(MessageKind, Received)>, MockError> {
        if self.fail {
            self.fail = false;
            return Err(MockError);
        }
        Ok(self
            .messages
            .pop_front()
            .map(|(kind, m)| (kind, copy_out(&m, buf))))
    }
}

/// LED output that records what it was asked to draw
#[derive(Debug, Default)]
pub struct RecordingOutput {
    pub writes: Vec<(u8, Vec<RGB8>)>,
    pub shows: usize,
    pub fail: bool,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedOutput for RecordingOutput {
    type Error = MockError;

    fn write_segment(&mut self, channel: u8, pixels: &[RGB8]) -> Result<(), MockError> {
        if self.fail {
            return Err(MockError);
        }
        self.writes.push((channel, pixels.to_vec()));
        Ok(())
    }

    fn show(&mut self) -> Result<(), MockError> {
        if self.fail {
            return Err(MockError);
        }
        self.shows += 1;
        Ok(())
    }
}
