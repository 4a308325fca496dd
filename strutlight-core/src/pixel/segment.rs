//! Segment map: which buffer range goes to which output channel

use core::ops::Range;

use heapless::Vec;

use crate::config::{SegmentSpec, MAX_SEGMENTS};

/// Installation geometry is inconsistent
///
/// Always fatal: the firmware refuses to start rather than address the
/// wrong pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayoutError {
    /// No segments configured
    NoSegments,
    /// More segments than `MAX_SEGMENTS`
    TooManySegments,
    /// Segment with zero pixels
    EmptySegment { id: u8 },
    /// Two segments bound to the same output channel
    DuplicateChannel { channel: u8 },
    /// Segment lengths do not add up to the buffer size
    PixelCountMismatch { expected: usize, actual: usize },
}

/// A contiguous run of buffer indices bound to one output channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segment {
    /// Position in the map (configuration order)
    pub id: u8,
    /// Output channel driving this run
    pub channel: u8,
    /// First buffer index
    pub start: usize,
    /// Number of pixels
    pub len: usize,
}

impl Segment {
    /// Buffer indices covered by this segment
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }
}

/// Ordered, immutable partition of the pixel buffer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SegmentMap {
    segments: Vec<Segment, MAX_SEGMENTS>,
    total: usize,
}

impl SegmentMap {
    /// Build a map from `(channel, length)` pairs in buffer order
    ///
    /// Offsets are assigned by accumulating lengths, so segments are
    /// contiguous and never overlap. Fails unless the lengths sum to
    /// exactly `total`.
    pub fn from_pairs<I>(pairs: I, total: usize) -> Result<Self, LayoutError>
    where
        I: IntoIterator<Item = (u8, usize)>,
    {
        let mut segments: Vec<Segment, MAX_SEGMENTS> = Vec::new();
        let mut start = 0usize;

        for (index, (channel, len)) in pairs.into_iter().enumerate() {
            let id = u8::try_from(index).map_err(|_| LayoutError::TooManySegments)?;
            if len == 0 {
                return Err(LayoutError::EmptySegment { id });
            }
            if segments.iter().any(|s| s.channel == channel) {
                return Err(LayoutError::DuplicateChannel { channel });
            }
            segments
                .push(Segment {
                    id,
                    channel,
                    start,
                    len,
                })
                .map_err(|_| LayoutError::TooManySegments)?;
            start = start.saturating_add(len);
        }

        if segments.is_empty() {
            return Err(LayoutError::NoSegments);
        }
        if start != total {
            return Err(LayoutError::PixelCountMismatch {
                expected: total,
                actual: start,
            });
        }

        Ok(Self { segments, total })
    }

    /// Build a map from configured segment specs
    pub fn from_specs(specs: &[SegmentSpec], total: usize) -> Result<Self, LayoutError> {
        Self::from_pairs(specs.iter().map(|s| (s.pin, s.length as usize)), total)
    }

    /// Segments in buffer order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Sum of all segment lengths
    pub fn total_pixels(&self) -> usize {
        self.total
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Never true for a successfully built map
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment bound to an output channel
    pub fn by_channel(&self, channel: u8) -> Option<&Segment> {
        self.segments.iter().find(|s| s.channel == channel)
    }
}
