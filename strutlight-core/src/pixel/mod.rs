//! Pixel buffer and segment map
//!
//! The buffer is one logical array of pixels. The segment map slices it
//! into contiguous runs, each driven by one output channel.

mod buffer;
mod segment;

pub use buffer::{PixelBuffer, SizeMismatch};
pub use segment::{LayoutError, Segment, SegmentMap};
