//! Sender-side encoding
//!
//! Builds the byte images a host writes to the controller. Datagram and
//! stream-socket frames need no wrapping; they are sent as the raw pixel
//! bytes.

use crate::message::{MessageError, COMMAND_END, COMMAND_START, FRAME_END, FRAME_START};

/// Write a serial frame `[<payload>]` into `out`
///
/// Returns the number of bytes written.
pub fn encode_serial_frame(payload: &[u8], out: &mut [u8]) -> Result<usize, MessageError> {
    let len = payload.len() + 2;
    if out.len() < len {
        return Err(MessageError::PayloadTooLarge);
    }

    out[0] = FRAME_START;
    out[1..len - 1].copy_from_slice(payload);
    out[len - 1] = FRAME_END;
    Ok(len)
}

/// Write a command `{name}` or `{name:value}` into `out`
///
/// The same image is valid on every transport. Returns the number of bytes
/// written.
pub fn encode_command(
    name: &str,
    value: Option<&str>,
    out: &mut [u8],
) -> Result<usize, MessageError> {
    let is_delimiter = |b: u8| matches!(b, COMMAND_START | COMMAND_END | FRAME_START | FRAME_END);
    if name.is_empty() || name.contains(':') || name.bytes().any(is_delimiter) {
        return Err(MessageError::InvalidText);
    }
    if value.is_some_and(|v| v.bytes().any(is_delimiter)) {
        return Err(MessageError::InvalidText);
    }

    let body_len = name.len() + value.map_or(0, |v| v.len() + 1);
    let len = body_len + 2;
    if out.len() < len {
        return Err(MessageError::PayloadTooLarge);
    }

    let mut pos = 0;
    let mut put = |bytes: &[u8]| {
        out[pos..pos + bytes.len()].copy_from_slice(bytes);
        pos += bytes.len();
    };

    put(&[COMMAND_START]);
    put(name.as_bytes());
    if let Some(value) = value {
        put(b":");
        put(value.as_bytes());
    }
    put(&[COMMAND_END]);

    Ok(len)
}
