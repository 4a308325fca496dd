//! Transport adapters
//!
//! Each adapter wraps one HAL receive primitive and turns raw bytes into at
//! most one [`Message`] per poll. Polls never block: with nothing pending
//! they return `Ok(None)` immediately.

mod datagram;
mod serial;
mod stream;

pub use datagram::DatagramTransport;
pub use serial::{SerialTransport, SERIAL_CHUNK};
pub use stream::StreamTransport;

use strutlight_protocol::{Message, MessageError};

/// Errors reported by a transport poll
///
/// All of them are recoverable: the offending input is discarded and the
/// next poll carries on with fresh input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// The medium failed to deliver bytes
    Read,
    /// The medium could not be opened
    Setup,
    /// Input arrived but did not form a valid message
    Message(MessageError),
    /// A partial serial message went stale and was dropped
    Timeout,
}

impl From<MessageError> for TransportError {
    fn from(e: MessageError) -> Self {
        TransportError::Message(e)
    }
}

/// A source of messages
pub trait Transport {
    /// Short name for diagnostics
    fn name(&self) -> &'static str;

    /// Open the underlying medium (bind, listen). Called once at startup.
    fn setup(&mut self) -> Result<(), TransportError>;

    /// Check for one message without blocking
    ///
    /// The returned message borrows the transport's receive buffer and must
    /// be consumed before the next poll.
    fn poll(&mut self, now_ms: u32) -> Result<Option<Message<'_>>, TransportError>;
}
