//! Datagram (UDP) transport

use strutlight_hal::DatagramSocket;
use strutlight_protocol::{classify_datagram, Message, MessageError};

use super::{Transport, TransportError};

/// One message per datagram, no cross-packet state
///
/// `BUF` is the receive buffer size and must hold a full frame.
pub struct DatagramTransport<S, const BUF: usize> {
    socket: S,
    port: u16,
    frame_len: usize,
    rx: [u8; BUF],
}

impl<S: DatagramSocket, const BUF: usize> DatagramTransport<S, BUF> {
    /// Create a transport listening on `port` for frames of `frame_len` bytes
    pub fn new(socket: S, port: u16, frame_len: usize) -> Result<Self, TransportError> {
        if frame_len > BUF {
            return Err(MessageError::PayloadTooLarge.into());
        }

        Ok(Self {
            socket,
            port,
            frame_len,
            rx: [0; BUF],
        })
    }

    /// Bound port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Underlying socket
    pub fn socket_mut(&mut self) -> &mut S {
        &mut self.socket
    }
}

impl<S: DatagramSocket, const BUF: usize> Transport for DatagramTransport<S, BUF> {
    fn name(&self) -> &'static str {
        "udp"
    }

    fn setup(&mut self) -> Result<(), TransportError> {
        self.socket
            .bind(self.port)
            .map_err(|_| TransportError::Setup)
    }

    fn poll(&mut self, _now_ms: u32) -> Result<Option<Message<'_>>, TransportError> {
        let received = match self.socket.try_recv(&mut self.rx) {
            Ok(Some(received)) => received,
            Ok(None) => return Ok(None),
            Err(_) => return Err(TransportError::Read),
        };

        if received.truncated {
            return Err(MessageError::PayloadTooLarge.into());
        }

        let bytes = self.rx.get(..received.len).ok_or(TransportError::Read)?;
        let message = classify_datagram(bytes, self.frame_len)?;
        Ok(Some(message))
    }
}
