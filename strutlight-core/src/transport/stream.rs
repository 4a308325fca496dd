//! Stream-socket (WebSocket) transport
//!
//! The socket delivers whole messages tagged binary or text. Binary
//! messages carry frames, text messages carry `{...}` commands.

use strutlight_hal::{MessageKind, MessageSocket};
use strutlight_protocol::{classify_stream, Message, MessageError, StreamFraming};

use super::{Transport, TransportError};

/// Message-oriented socket transport
pub struct StreamTransport<S, const BUF: usize> {
    socket: S,
    port: u16,
    frame_len: usize,
    rx: [u8; BUF],
}

impl<S: MessageSocket, const BUF: usize> StreamTransport<S, BUF> {
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

    /// Listening port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Underlying socket
    pub fn socket_mut(&mut self) -> &mut S {
        &mut self.socket
    }
}

fn framing(kind: MessageKind) -> StreamFraming {
    match kind {
        MessageKind::Binary => StreamFraming::Binary,
        MessageKind::Text => StreamFraming::Text,
    }
}

impl<S: MessageSocket, const BUF: usize> Transport for StreamTransport<S, BUF> {
    fn name(&self) -> &'static str {
        "websocket"
    }

    fn setup(&mut self) -> Result<(), TransportError> {
        self.socket
            .listen(self.port)
            .map_err(|_| TransportError::Setup)
    }

    fn poll(&mut self, _now_ms: u32) -> Result<Option<Message<'_>>, TransportError> {
        let (kind, received) = match self.socket.try_recv(&mut self.rx) {
            Ok(Some(pending)) => pending,
            Ok(None) => return Ok(None),
            Err(_) => return Err(TransportError::Read),
        };

        if received.truncated {
            return Err(MessageError::PayloadTooLarge.into());
        }

        let bytes = self.rx.get(..received.len).ok_or(TransportError::Read)?;
        let message = classify_stream(framing(kind), bytes, self.frame_len)?;
        Ok(Some(message))
    }
}
