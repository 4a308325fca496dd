//! Cooperative controller loop
//!
//! One [`Controller::step`] is one loop iteration: poll every transport
//! once, route whatever each produced, then give the refresh scheduler a
//! chance to flush. Everything runs on the caller's thread, so the buffer
//! writer (committer) and reader (flush) never overlap.

use heapless::Vec;
use strutlight_hal::LedOutput;
use strutlight_protocol::MessageType;

use crate::commit::FrameCommitter;
use crate::diagnostics::Diagnostics;
use crate::dispatch::{dispatch, CommandProcessor};
use crate::pixel::{PixelBuffer, SizeMismatch};
use crate::refresh::RefreshScheduler;
use crate::transport::{Transport, TransportError};

/// Transports whose errors fit in one [`StepReport`]
pub const MAX_TRANSPORTS: usize = 4;

/// Why one ingest attempt produced nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IngestError {
    /// The transport failed or discarded its input
    Transport(TransportError),
    /// A frame reached the committer with the wrong length
    Commit(SizeMismatch),
}

/// What happened during one loop iteration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepReport {
    /// Commands routed to the processor
    pub commands: u8,
    /// Frames committed
    pub frames: u8,
    /// Errors by transport index (first `MAX_TRANSPORTS` only)
    pub errors: Vec<(u8, IngestError), MAX_TRANSPORTS>,
    /// A flush was attempted
    pub flushed: bool,
    /// The attempted flush failed
    pub flush_failed: bool,
}

/// Owns the pixel pipeline for one installation
pub struct Controller<P, const N: usize> {
    committer: FrameCommitter<N>,
    processor: P,
    scheduler: RefreshScheduler,
    diagnostics: Diagnostics,
}

impl<P: CommandProcessor, const N: usize> Controller<P, N> {
    /// Build a controller around an allocated buffer
    pub fn new(buffer: PixelBuffer<N>, processor: P, fps: u16) -> Self {
        Self {
            committer: FrameCommitter::new(buffer),
            processor,
            scheduler: RefreshScheduler::new(fps),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Poll one transport and route its message, if any
    pub fn ingest<T>(
        &mut self,
        transport: &mut T,
        now_ms: u32,
    ) -> Result<Option<MessageType>, IngestError>
    where
        T: Transport + ?Sized,
    {
        let message = match transport.poll(now_ms) {
            Ok(Some(message)) => message,
            Ok(None) => return Ok(None),
            Err(e) => {
                self.diagnostics.record_error(&e);
                return Err(IngestError::Transport(e));
            }
        };

        match dispatch(message, &mut self.committer, &mut self.processor) {
            Ok(kind) => {
                self.diagnostics.record_handled(kind);
                Ok(Some(kind))
            }
            Err(e) => {
                self.diagnostics.record_rejected(&e);
                Err(IngestError::Commit(e))
            }
        }
    }

    /// Flush the buffer if the frame period has elapsed
    pub fn refresh<O>(&mut self, now_ms: u32, output: &mut O) -> Result<bool, O::Error>
    where
        O: LedOutput + ?Sized,
    {
        let result = self.scheduler.tick(now_ms, self.committer.buffer(), output);
        match result {
            Ok(true) => self.diagnostics.record_flush(true),
            Ok(false) => {}
            Err(_) => self.diagnostics.record_flush(false),
        }
        result
    }

    /// Run one loop iteration
    pub fn step<O>(
        &mut self,
        now_ms: u32,
        transports: &mut [&mut dyn Transport],
        output: &mut O,
    ) -> StepReport
    where
        O: LedOutput + ?Sized,
    {
        let mut report = StepReport::default();

        for (index, transport) in transports.iter_mut().enumerate() {
            match self.ingest(&mut **transport, now_ms) {
                Ok(Some(MessageType::Command)) => {
                    report.commands = report.commands.saturating_add(1)
                }
                Ok(Some(MessageType::Frame)) => report.frames = report.frames.saturating_add(1),
                Ok(None) => {}
                Err(e) => {
                    // Errors that do not fit are still counted in diagnostics
                    if let Ok(index) = u8::try_from(index) {
                        let _ = report.errors.push((index, e));
                    }
                }
            }
        }

        match self.refresh(now_ms, output) {
            Ok(flushed) => report.flushed = flushed,
            Err(_) => {
                report.flushed = true;
                report.flush_failed = true;
            }
        }

        report
    }

    /// Black out every pixel through the committer
    pub fn blackout(&mut self) {
        self.committer.clear();
    }

    /// Current buffer contents
    pub fn buffer(&self) -> &PixelBuffer<N> {
        self.committer.buffer()
    }

    /// Frames committed so far (wraps)
    pub fn generation(&self) -> u32 {
        self.committer.generation()
    }

    /// Counters since startup
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    pub fn processor_mut(&mut self) -> &mut P {
        &mut self.processor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDatagramSocket, MockUart, RecordingOutput};
    use crate::pixel::SegmentMap;
    use crate::transport::{DatagramTransport, SerialTransport};
    use std::vec::Vec as StdVec;
    use strutlight_protocol::{encode_command, encode_serial_frame, Message, MessageError};

    const PIXELS: usize = 10;
    const FRAME_LEN: usize = PIXELS * 3;

    #[derive(Default)]
    struct Recorder {
        commands: StdVec<StdVec<u8>>,
    }

    impl CommandProcessor for Recorder {
        fn process(&mut self, payload: &[u8]) {
            self.commands.push(payload.to_vec());
        }
    }

    /// Yields a command on every poll
    struct Chatty;

    impl Transport for Chatty {
        fn name(&self) -> &'static str {
            "chatty"
        }

        fn setup(&mut self) -> Result<(), TransportError> {
            Ok(())
        }

        fn poll(&mut self, _now_ms: u32) -> Result<Option<Message<'_>>, TransportError> {
            Ok(Some(Message::Command(b"ping")))
        }
    }

    /// Fails on every poll
    struct Broken;

    impl Transport for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn setup(&mut self) -> Result<(), TransportError> {
            Ok(())
        }

        fn poll(&mut self, _now_ms: u32) -> Result<Option<Message<'_>>, TransportError> {
            Err(TransportError::Read)
        }
    }

    fn controller() -> Controller<Recorder, PIXELS> {
        let map = SegmentMap::from_pairs([(5, 4), (4, 6)], PIXELS).unwrap();
        Controller::new(PixelBuffer::new(map).unwrap(), Recorder::default(), 60)
    }

    fn serial() -> SerialTransport<MockUart, FRAME_LEN> {
        SerialTransport::new(MockUart::new(), FRAME_LEN, 500).unwrap()
    }

    fn udp() -> DatagramTransport<MockDatagramSocket, 64> {
        DatagramTransport::new(MockDatagramSocket::new(), 4210, FRAME_LEN).unwrap()
    }

    fn payload() -> StdVec<u8> {
        (0..FRAME_LEN as u8).map(|b| b + 0x20).collect()
    }

    fn buffer_bytes(c: &Controller<Recorder, PIXELS>) -> StdVec<u8> {
        c.buffer().bytes().collect()
    }

    #[test]
    fn test_serial_frame_updates_buffer() {
        let mut c = controller();
        let mut t = serial();
        let data = payload();
        let mut wire = [0u8; FRAME_LEN + 2];
        let n = encode_serial_frame(&data, &mut wire).unwrap();
        t.uart_mut().push(&wire[..n]);

        assert_eq!(c.ingest(&mut t, 0), Ok(Some(MessageType::Frame)));
        assert_eq!(buffer_bytes(&c), data);
        assert_eq!(c.diagnostics().frames_committed, 1);
    }

    #[test]
    fn test_short_serial_frame_leaves_buffer() {
        let mut c = controller();
        let mut t = serial();
        let mut wire = StdVec::new();
        wire.push(b'[');
        wire.extend_from_slice(&payload()[..FRAME_LEN - 1]);
        wire.push(b']');
        t.uart_mut().push(&wire);

        assert_eq!(
            c.ingest(&mut t, 0),
            Err(IngestError::Transport(TransportError::Message(
                MessageError::SizeMismatch {
                    expected: FRAME_LEN,
                    actual: FRAME_LEN - 1
                }
            )))
        );
        assert!(c.buffer().bytes().all(|b| b == 0));
        assert_eq!(c.generation(), 0);
        assert_eq!(c.diagnostics().frames_rejected, 1);
    }

    #[test]
    fn test_datagram_command_leaves_buffer() {
        let mut c = controller();
        let mut t = udp();
        t.socket_mut().push(b"{reset}");

        assert_eq!(c.ingest(&mut t, 0), Ok(Some(MessageType::Command)));
        assert_eq!(c.processor().commands, [b"reset".to_vec()]);
        assert_eq!(c.generation(), 0);
    }

    #[test]
    fn test_step_polls_every_transport_once() {
        let mut c = controller();
        let mut s = serial();
        let mut u = udp();
        let data = payload();

        let mut cmd = [0u8; 32];
        let n = encode_command("setBrightness", Some("40"), &mut cmd).unwrap();
        s.uart_mut().push(&cmd[..n]);
        s.uart_mut().push(b"{turnOff}");
        u.socket_mut().push(&data);

        let mut output = RecordingOutput::new();
        let report = c.step(100, &mut [&mut s, &mut u], &mut output);

        assert_eq!(report.commands, 1);
        assert_eq!(report.frames, 1);
        assert!(report.errors.is_empty());
        assert!(report.flushed);
        assert_eq!(c.processor().commands, [b"setBrightness:40".to_vec()]);
        assert_eq!(output.writes.len(), 2);
        assert_eq!(output.writes[0].1[0].r, data[0]);

        // Second command waits for the next iteration
        let report = c.step(105, &mut [&mut s, &mut u], &mut output);
        assert_eq!(report.commands, 1);
        assert!(!report.flushed);
        assert_eq!(output.shows, 1);
    }

    #[test]
    fn test_step_reports_errors_by_transport() {
        let mut c = controller();
        let mut s = serial();
        let mut u = udp();
        u.socket_mut().push(&[0u8; 7]);

        let mut output = RecordingOutput::new();
        let report = c.step(0, &mut [&mut s, &mut u], &mut output);

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].0, 1);
        assert_eq!(c.diagnostics().frames_rejected, 1);
    }

    #[test]
    fn test_flush_failure_is_reported() {
        let mut c = controller();
        let mut output = RecordingOutput::new();
        output.fail = true;

        let report = c.step(1000, &mut [], &mut output);

        assert!(report.flush_failed);
        assert_eq!(c.diagnostics().flush_errors, 1);
    }

    #[test]
    fn test_interrupted_frame_then_command() {
        let mut c = controller();
        let mut t = serial();
        t.uart_mut().push(b"[\x01\x02\x03{ping}");

        assert_eq!(
            c.ingest(&mut t, 0),
            Err(IngestError::Transport(TransportError::Message(
                MessageError::MalformedDelimiter
            )))
        );
        assert_eq!(c.ingest(&mut t, 0), Ok(Some(MessageType::Command)));
        assert_eq!(c.processor().commands, [b"ping".to_vec()]);
        assert_eq!(c.diagnostics().malformed, 1);
    }

    #[test]
    fn test_blackout() {
        let mut c = controller();
        let mut t = udp();
        t.socket_mut().push(&[0xff; FRAME_LEN]);
        c.ingest(&mut t, 0).unwrap();

        c.blackout();

        assert!(c.buffer().bytes().all(|b| b == 0));
        assert_eq!(c.generation(), 2);
    }

    #[test]
    fn test_closure_processor() {
        let mut count = 0;
        {
            let map = SegmentMap::from_pairs([(0, PIXELS)], PIXELS).unwrap();
            let mut c = Controller::<_, PIXELS>::new(
                PixelBuffer::new(map).unwrap(),
                |_: &[u8]| count += 1,
                60,
            );
            let mut t = udp();
            t.socket_mut().push(b"{a}");
            t.socket_mut().push(b"{b}");
            c.ingest(&mut t, 0).unwrap();
            c.ingest(&mut t, 0).unwrap();
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn test_step_counts_saturate_with_many_transports() {
        let mut c = controller();
        let mut chatty: StdVec<Chatty> = (0..300).map(|_| Chatty).collect();
        let mut broken = Broken;
        let mut transports: StdVec<&mut dyn Transport> = chatty
            .iter_mut()
            .map(|t| t as &mut dyn Transport)
            .collect();
        transports.push(&mut broken);

        let mut output = RecordingOutput::new();
        let report = c.step(0, &mut transports, &mut output);

        assert_eq!(report.commands, u8::MAX);
        // Transport 300 has no u8 index, so only diagnostics see its error
        assert!(report.errors.is_empty());
        assert_eq!(c.diagnostics().commands, 300);
        assert_eq!(c.diagnostics().read_errors, 1);
    }
}
