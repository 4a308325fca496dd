//! Message dispatcher
//!
//! Routes commands to the command processor and frames to the committer.
//! No validation happens here beyond what the committer enforces.

use strutlight_protocol::{Message, MessageType};

use crate::commit::FrameCommitter;
use crate::pixel::SizeMismatch;

/// Receives command payloads
///
/// What a command does is up to the implementor. The payload is the text
/// between `{` and `}`, delimiters stripped.
pub trait CommandProcessor {
    fn process(&mut self, payload: &[u8]);
}

impl<F: FnMut(&[u8])> CommandProcessor for F {
    fn process(&mut self, payload: &[u8]) {
        self(payload)
    }
}

/// Route one message
///
/// Returns the kind of message handled, or the committer's `SizeMismatch`
/// for a frame of the wrong length.
pub fn dispatch<P, const N: usize>(
    message: Message<'_>,
    committer: &mut FrameCommitter<N>,
    processor: &mut P,
) -> Result<MessageType, SizeMismatch>
where
    P: CommandProcessor + ?Sized,
{
    match message {
        Message::Command(payload) => {
            processor.process(payload);
            Ok(MessageType::Command)
        }
        Message::Frame(payload) => {
            committer.commit(payload)?;
            Ok(MessageType::Frame)
        }
    }
}
