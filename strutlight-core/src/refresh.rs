//! Rate-limited refresh
//!
//! Decides when the pixel buffer is pushed to the strands. Evaluated once
//! per loop iteration, independent of how often frames arrive.

use strutlight_hal::LedOutput;

use crate::pixel::PixelBuffer;

/// Flushes no more often than once per frame period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RefreshScheduler {
    period_ms: u32,
    last_flush_ms: u32,
}

impl RefreshScheduler {
    /// Create a scheduler targeting `fps` frames per second
    ///
    /// `fps` of 0 is treated as 1.
    pub fn new(fps: u16) -> Self {
        Self {
            period_ms: 1000 / u32::from(fps.max(1)),
            last_flush_ms: 0,
        }
    }

    /// Minimum time between flushes
    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Timestamp of the last flush
    pub fn last_flush_ms(&self) -> u32 {
        self.last_flush_ms
    }

    /// Check whether a flush is due at `now_ms`, claiming the slot if so
    ///
    /// Millisecond timestamps wrap; elapsed time is computed modulo 2^32.
    pub fn poll_due(&mut self, now_ms: u32) -> bool {
        if now_ms.wrapping_sub(self.last_flush_ms) >= self.period_ms {
            self.last_flush_ms = now_ms;
            true
        } else {
            false
        }
    }

    /// Flush `buffer` to `output` if a flush is due
    ///
    /// Returns whether a flush was attempted. A failed flush still uses up
    /// the slot; the next attempt waits a full period.
    pub fn tick<O, const N: usize>(
        &mut self,
        now_ms: u32,
        buffer: &PixelBuffer<N>,
        output: &mut O,
    ) -> Result<bool, O::Error>
    where
        O: LedOutput + ?Sized,
    {
        if !self.poll_due(now_ms) {
            return Ok(false);
        }
        flush(buffer, output)?;
        Ok(true)
    }
}

/// Write every segment to its channel, then latch
pub fn flush<O, const N: usize>(buffer: &PixelBuffer<N>, output: &mut O) -> Result<(), O::Error>
where
    O: LedOutput + ?Sized,
{
    for segment in buffer.segments() {
        output.write_segment(segment.channel, buffer.segment_pixels(segment))?;
    }
    output.show()
}
