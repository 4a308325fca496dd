//! LED strand output abstraction

use smart_leds::RGB8;

/// Physical output for one or more addressable LED strands
///
/// A refresh writes every segment to its channel, then calls
/// [`LedOutput::show`] once. Implementations may latch on `write_segment`
/// or defer the physical transfer to `show`.
pub trait LedOutput {
    /// Error type for output operations
    type Error;

    /// Stage `pixels` for the strand attached to `channel`
    fn write_segment(&mut self, channel: u8, pixels: &[RGB8]) -> Result<(), Self::Error>;

    /// Push all staged segments to the strands
    fn show(&mut self) -> Result<(), Self::Error>;
}
