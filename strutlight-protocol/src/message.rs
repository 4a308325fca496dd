//! Message types and per-packet classification
//!
//! Datagram and stream-socket transports deliver self-delimited packets, so
//! each packet is classified on its own. The serial transport needs the
//! [`SerialReassembler`](crate::SerialReassembler) instead.

/// Opens a command on every transport
pub const COMMAND_START: u8 = b'{';
/// Closes a command on every transport
pub const COMMAND_END: u8 = b'}';
/// Opens a frame on the serial transport
pub const FRAME_START: u8 = b'[';
/// Closes a frame on the serial transport
pub const FRAME_END: u8 = b']';

/// Bytes per pixel on the wire (R, G, B)
pub const BYTES_PER_PIXEL: usize = 3;

/// Errors that can occur while extracting a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageError {
    /// Frame payload length differs from the pixel buffer's byte length
    SizeMismatch { expected: usize, actual: usize },
    /// Missing, unbalanced or interrupted `{}` / `[]` delimiters
    MalformedDelimiter,
    /// Payload exceeds the space reserved for it
    PayloadTooLarge,
    /// Command text is not usable ASCII/UTF-8
    InvalidText,
}

/// Kind of a message, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageType {
    Command,
    Frame,
}

/// A classified message borrowing its payload from the receive buffer
///
/// Messages are transient: a transport produces one and the dispatcher
/// consumes it before the transport is polled again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Message<'a> {
    /// Command text, delimiters stripped
    Command(&'a [u8]),
    /// Raw pixel bytes for the whole buffer
    Frame(&'a [u8]),
}

impl<'a> Message<'a> {
    /// Payload bytes
    pub fn payload(&self) -> &'a [u8] {
        match self {
            Message::Command(payload) | Message::Frame(payload) => payload,
        }
    }

    /// Kind of this message
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Command(_) => MessageType::Command,
            Message::Frame(_) => MessageType::Frame,
        }
    }
}

/// Framing of a message received on a stream socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamFraming {
    Binary,
    Text,
}

/// Strip `{`/`}` from a packet that is a complete command
fn command_body(bytes: &[u8]) -> Option<&[u8]> {
    match bytes {
        [COMMAND_START, body @ .., COMMAND_END] => Some(body),
        _ => None,
    }
}

/// Classify one datagram
///
/// A packet wrapped in `{`/`}` is a command, even when its length happens to
/// match a frame. Otherwise a packet of exactly `frame_len` bytes is a frame.
pub fn classify_datagram(bytes: &[u8], frame_len: usize) -> Result<Message<'_>, MessageError> {
    if let Some(body) = command_body(bytes) {
        return Ok(Message::Command(body));
    }

    if bytes.len() == frame_len {
        return Ok(Message::Frame(bytes));
    }

    if bytes.first() == Some(&COMMAND_START) {
        return Err(MessageError::MalformedDelimiter);
    }

    Err(MessageError::SizeMismatch {
        expected: frame_len,
        actual: bytes.len(),
    })
}

/// Classify one stream-socket message
///
/// Binary messages carry frames only; text messages carry commands only.
pub fn classify_stream(
    framing: StreamFraming,
    bytes: &[u8],
    frame_len: usize,
) -> Result<Message<'_>, MessageError> {
    match framing {
        StreamFraming::Binary if bytes.len() == frame_len => Ok(Message::Frame(bytes)),
        StreamFraming::Binary => Err(MessageError::SizeMismatch {
            expected: frame_len,
            actual: bytes.len(),
        }),
        StreamFraming::Text => command_body(bytes)
            .map(Message::Command)
            .ok_or(MessageError::MalformedDelimiter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_LEN: usize = 30;

    #[test]
    fn test_datagram_command() {
        let msg = classify_datagram(b"{reset}", FRAME_LEN).unwrap();
        assert_eq!(msg, Message::Command(b"reset"));
        assert_eq!(msg.payload().len(), 5);
    }

    #[test]
    fn test_datagram_empty_command() {
        let msg = classify_datagram(b"{}", FRAME_LEN).unwrap();
        assert_eq!(msg, Message::Command(b""));
    }

    #[test]
    fn test_datagram_single_brace_is_not_a_command() {
        assert_eq!(
            classify_datagram(b"{", FRAME_LEN),
            Err(MessageError::MalformedDelimiter)
        );
    }

    #[test]
    fn test_datagram_frame() {
        let data = [7u8; FRAME_LEN];
        let msg = classify_datagram(&data, FRAME_LEN).unwrap();
        assert_eq!(msg.message_type(), MessageType::Frame);
        assert_eq!(msg.payload(), &data[..]);
    }

    #[test]
    fn test_datagram_frame_shaped_like_command_is_command() {
        let mut data = [0u8; FRAME_LEN];
        data[0] = COMMAND_START;
        data[FRAME_LEN - 1] = COMMAND_END;
        let msg = classify_datagram(&data, FRAME_LEN).unwrap();
        assert_eq!(msg.message_type(), MessageType::Command);
        assert_eq!(msg.payload().len(), FRAME_LEN - 2);
    }

    #[test]
    fn test_datagram_short_frame() {
        let data = [1u8; FRAME_LEN - 1];
        assert_eq!(
            classify_datagram(&data, FRAME_LEN),
            Err(MessageError::SizeMismatch {
                expected: FRAME_LEN,
                actual: FRAME_LEN - 1
            })
        );
    }

    #[test]
    fn test_datagram_unterminated_command() {
        assert_eq!(
            classify_datagram(b"{setBrightness:40", FRAME_LEN),
            Err(MessageError::MalformedDelimiter)
        );
    }

    #[test]
    fn test_datagram_empty() {
        assert_eq!(
            classify_datagram(&[], FRAME_LEN),
            Err(MessageError::SizeMismatch {
                expected: FRAME_LEN,
                actual: 0
            })
        );
    }

    #[test]
    fn test_stream_binary_frame() {
        let data = [9u8; FRAME_LEN];
        let msg = classify_stream(StreamFraming::Binary, &data, FRAME_LEN).unwrap();
        assert_eq!(msg, Message::Frame(&data[..]));
    }

    #[test]
    fn test_stream_binary_wrapped_in_braces_is_still_size_checked() {
        assert_eq!(
            classify_stream(StreamFraming::Binary, b"{turnOff}", FRAME_LEN),
            Err(MessageError::SizeMismatch {
                expected: FRAME_LEN,
                actual: 9
            })
        );
    }

    #[test]
    fn test_stream_text_command() {
        let msg = classify_stream(StreamFraming::Text, b"{setBrightness:80}", FRAME_LEN).unwrap();
        assert_eq!(msg, Message::Command(b"setBrightness:80"));
    }

    #[test]
    fn test_stream_text_without_braces() {
        assert_eq!(
            classify_stream(StreamFraming::Text, b"turnOff", FRAME_LEN),
            Err(MessageError::MalformedDelimiter)
        );
    }
}
