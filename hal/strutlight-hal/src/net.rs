//! Network receive abstractions
//!
//! Association, reconnection and the socket handshake belong to the
//! implementation. These traits only hand over already-received payloads.

/// Result of a successful non-blocking receive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Received {
    /// Bytes copied into the caller's buffer
    pub len: usize,
    /// The message was longer than the buffer and was cut at `len`
    pub truncated: bool,
}

impl Received {
    /// A message that fit the buffer
    pub const fn complete(len: usize) -> Self {
        Self {
            len,
            truncated: false,
        }
    }

    /// A message cut at the buffer size
    pub const fn truncated(len: usize) -> Self {
        Self {
            len,
            truncated: true,
        }
    }
}

/// Non-blocking datagram socket (UDP)
pub trait DatagramSocket {
    /// Error type for socket operations
    type Error;

    /// Start listening on `port`
    fn bind(&mut self, port: u16) -> Result<(), Self::Error>;

    /// Copy one pending datagram into `buf`
    ///
    /// Returns `Ok(None)` when no datagram is waiting. Must return
    /// immediately.
    fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<Received>, Self::Error>;
}

/// Kind of a message received on a message-framed stream socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageKind {
    /// Binary data message
    Binary,
    /// UTF-8 text message
    Text,
}

/// Non-blocking message-framed stream socket (WebSocket)
///
/// Control frames (ping, pong, close) are handled by the implementation and
/// never surface here.
pub trait MessageSocket {
    /// Error type for socket operations
    type Error;

    /// Start accepting clients on `port`
    fn listen(&mut self, port: u16) -> Result<(), Self::Error>;

    /// Copy one pending data message into `buf`
    ///
    /// Returns `Ok(None)` when no message is waiting. Must return
    /// immediately.
    fn try_recv(&mut self, buf: &mut [u8])
        -> Result<Option<(MessageKind, Received)>, Self::Error>;
}
