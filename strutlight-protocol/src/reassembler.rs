//! Serial stream reassembly
//!
//! A serial link has no packet boundaries, so commands and frames are
//! wrapped in delimiters and recovered one byte at a time:
//!
//! - `{` starts a command, `}` ends it
//! - `[` starts a frame, `]` ends it
//!
//! An opening delimiter always restarts reassembly, discarding whatever was
//! in progress. Nesting is not supported. Frame payloads are raw pixel bytes
//! and are not escaped, so a pixel byte equal to `{` or `[` cuts the frame.

use heapless::Vec;

use crate::message::{
    Message, MessageError, MessageType, COMMAND_END, COMMAND_START, FRAME_END, FRAME_START,
};

/// Longest command payload accepted on the serial link
pub const MAX_COMMAND_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum ParseState {
    /// Waiting for `{` or `[`
    Idle,
    /// Collecting command text until `}`
    AccumulatingCommand,
    /// Collecting pixel bytes until `]`
    AccumulatingFrame,
}

/// State machine turning a serial byte stream into messages
///
/// `CAP` is the scratch capacity in bytes. It must hold one frame; the
/// frame length itself is fixed at construction from the pixel buffer.
#[derive(Debug, Clone)]
pub struct SerialReassembler<const CAP: usize> {
    state: ParseState,
    scratch: Vec<u8, CAP>,
    /// Payload bytes seen since the opening delimiter, kept or not
    received: usize,
    frame_len: usize,
    command_limit: usize,
    completed: Option<MessageType>,
}

impl<const CAP: usize> SerialReassembler<CAP> {
    /// Create a reassembler for frames of exactly `frame_len` bytes
    ///
    /// Fails with `PayloadTooLarge` when `frame_len` exceeds `CAP`.
    pub fn new(frame_len: usize) -> Result<Self, MessageError> {
        if frame_len > CAP {
            return Err(MessageError::PayloadTooLarge);
        }

        Ok(Self {
            state: ParseState::Idle,
            scratch: Vec::new(),
            received: 0,
            frame_len,
            command_limit: MAX_COMMAND_LEN.min(CAP),
            completed: None,
        })
    }

    /// Frame length this reassembler accepts
    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// True when no message is in progress
    pub fn is_idle(&self) -> bool {
        self.state == ParseState::Idle
    }

    /// Drop any in-progress message
    ///
    /// Returns `true` if a partial message was discarded.
    pub fn reset(&mut self) -> bool {
        let was_busy = !self.is_idle();
        self.state = ParseState::Idle;
        self.scratch.clear();
        self.received = 0;
        self.completed = None;
        was_busy
    }

    fn begin(&mut self, state: ParseState) -> Result<Option<MessageType>, MessageError> {
        let interrupted = self.reset();
        self.state = state;
        if interrupted {
            Err(MessageError::MalformedDelimiter)
        } else {
            Ok(None)
        }
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(kind))` when this byte completed a message, which is
    /// then available from [`completed`](Self::completed) until the next
    /// call. Returns `Err` when this byte caused a partial or invalid
    /// message to be discarded; reassembly continues either way.
    pub fn feed(&mut self, byte: u8) -> Result<Option<MessageType>, MessageError> {
        self.completed = None;

        match byte {
            COMMAND_START => return self.begin(ParseState::AccumulatingCommand),
            FRAME_START => return self.begin(ParseState::AccumulatingFrame),
            _ => {}
        }

        match self.state {
            ParseState::Idle => Ok(None),
            ParseState::AccumulatingCommand if byte == COMMAND_END => {
                self.state = ParseState::Idle;
                if self.received > self.command_limit {
                    return Err(MessageError::PayloadTooLarge);
                }
                self.completed = Some(MessageType::Command);
                Ok(self.completed)
            }
            ParseState::AccumulatingCommand => {
                if self.received < self.command_limit {
                    // Cannot fail: command_limit <= CAP
                    let _ = self.scratch.push(byte);
                }
                self.received = self.received.saturating_add(1);
                Ok(None)
            }
            ParseState::AccumulatingFrame if byte == FRAME_END => {
                self.state = ParseState::Idle;
                if self.received != self.frame_len {
                    return Err(MessageError::SizeMismatch {
                        expected: self.frame_len,
                        actual: self.received,
                    });
                }
                self.completed = Some(MessageType::Frame);
                Ok(self.completed)
            }
            ParseState::AccumulatingFrame => {
                // Excess bytes from a runaway frame are counted, never stored
                if self.received < self.frame_len {
                    let _ = self.scratch.push(byte);
                }
                self.received = self.received.saturating_add(1);
                Ok(None)
            }
        }
    }

    /// The message completed by the most recent [`feed`](Self::feed)
    pub fn completed(&self) -> Option<Message<'_>> {
        match self.completed? {
            MessageType::Command => Some(Message::Command(&self.scratch)),
            MessageType::Frame => Some(Message::Frame(&self.scratch)),
        }
    }

    /// Feed a run of bytes, reporting every completed message and error in
    /// stream order
    ///
    /// Equivalent to calling [`feed`](Self::feed) once per byte.
    pub fn feed_bytes<F>(&mut self, bytes: &[u8], mut on_event: F)
    where
        F: FnMut(Result<Message<'_>, MessageError>),
    {
        for &byte in bytes {
            match self.feed(byte) {
                Ok(Some(_)) => {
                    if let Some(message) = self.completed() {
                        on_event(Ok(message));
                    }
                }
                Ok(None) => {}
                Err(e) => on_event(Err(e)),
            }
        }
    }
}
