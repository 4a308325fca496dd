//! Pipeline counters
//!
//! The core never logs. It counts what happened so the firmware can report
//! it at whatever rate it likes.

use strutlight_protocol::{MessageError, MessageType};

use crate::pixel::SizeMismatch;
use crate::transport::TransportError;

/// Running totals since startup (all counters wrap)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostics {
    /// Commands handed to the command processor
    pub commands: u32,
    /// Frames written to the pixel buffer
    pub frames_committed: u32,
    /// Frames discarded for having the wrong length
    pub frames_rejected: u32,
    /// Input discarded for bad delimiters, text or oversize
    pub malformed: u32,
    /// Transport medium failures
    pub read_errors: u32,
    /// Partial serial messages abandoned by the watchdog
    pub timeouts: u32,
    /// Successful flushes to the strands
    pub flushes: u32,
    /// Flushes that failed
    pub flush_errors: u32,
}

fn bump(counter: &mut u32) {
    *counter = counter.wrapping_add(1);
}

impl Diagnostics {
    pub const fn new() -> Self {
        Self {
            commands: 0,
            frames_committed: 0,
            frames_rejected: 0,
            malformed: 0,
            read_errors: 0,
            timeouts: 0,
            flushes: 0,
            flush_errors: 0,
        }
    }

    /// Count a message that was routed successfully
    pub fn record_handled(&mut self, kind: MessageType) {
        match kind {
            MessageType::Command => bump(&mut self.commands),
            MessageType::Frame => bump(&mut self.frames_committed),
        }
    }

    /// Count a transport error
    pub fn record_error(&mut self, error: &TransportError) {
        match error {
            TransportError::Read | TransportError::Setup => bump(&mut self.read_errors),
            TransportError::Timeout => bump(&mut self.timeouts),
            TransportError::Message(MessageError::SizeMismatch { .. }) => {
                bump(&mut self.frames_rejected)
            }
            TransportError::Message(_) => bump(&mut self.malformed),
        }
    }

    /// Count a frame the committer refused
    pub fn record_rejected(&mut self, _error: &SizeMismatch) {
        bump(&mut self.frames_rejected);
    }

    /// Count a flush attempt
    pub fn record_flush(&mut self, ok: bool) {
        if ok {
            bump(&mut self.flushes);
        } else {
            bump(&mut self.flush_errors);
        }
    }

    /// Total discarded inputs of any kind
    pub fn discarded(&self) -> u32 {
        self.frames_rejected
            .wrapping_add(self.malformed)
            .wrapping_add(self.read_errors)
            .wrapping_add(self.timeouts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let mut d = Diagnostics::new();
        d.record_error(&TransportError::Read);
        d.record_error(&TransportError::Timeout);
        d.record_error(&TransportError::Message(MessageError::MalformedDelimiter));
        d.record_error(&TransportError::Message(MessageError::PayloadTooLarge));
        d.record_error(&TransportError::Message(MessageError::SizeMismatch {
            expected: 3,
            actual: 2,
        }));
        d.record_rejected(&SizeMismatch {
            expected: 3,
            actual: 4,
        });

        assert_eq!(d.read_errors, 1);
        assert_eq!(d.timeouts, 1);
        assert_eq!(d.malformed, 2);
        assert_eq!(d.frames_rejected, 2);
        assert_eq!(d.discarded(), 6);
    }

    #[test]
    fn test_handled_and_flushes() {
        let mut d = Diagnostics::new();
        d.record_handled(MessageType::Command);
        d.record_handled(MessageType::Frame);
        d.record_handled(MessageType::Frame);
        d.record_flush(true);
        d.record_flush(false);

        assert_eq!(d.commands, 1);
        assert_eq!(d.frames_committed, 2);
        assert_eq!(d.flushes, 1);
        assert_eq!(d.flush_errors, 1);
    }

    #[test]
    fn test_counters_wrap() {
        let mut d = Diagnostics {
            commands: u32::MAX,
            ..Diagnostics::new()
        };
        d.record_handled(MessageType::Command);
        assert_eq!(d.commands, 0);
    }
}
