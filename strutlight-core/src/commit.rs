//! Frame committer
//!
//! Owns the pixel buffer. Every frame from every transport goes through
//! [`FrameCommitter::commit`]; nothing else gets mutable access.

use crate::pixel::{PixelBuffer, SizeMismatch};

/// Sole writer of the pixel buffer
#[derive(Debug)]
pub struct FrameCommitter<const N: usize> {
    buffer: PixelBuffer<N>,
    generation: u32,
}

impl<const N: usize> FrameCommitter<N> {
    /// Take ownership of the buffer
    pub fn new(buffer: PixelBuffer<N>) -> Self {
        Self {
            buffer,
            generation: 0,
        }
    }

    /// Replace the buffer contents with a frame payload
    ///
    /// On `SizeMismatch` the buffer is unchanged.
    pub fn commit(&mut self, frame: &[u8]) -> Result<(), SizeMismatch> {
        self.buffer.write_all(frame)?;
        self.generation = self.generation.wrapping_add(1);
        Ok(())
    }

    /// Replace the buffer contents with an all-black frame
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Read-only view for the refresh side
    pub fn buffer(&self) -> &PixelBuffer<N> {
        &self.buffer
    }

    /// Number of frames committed so far (wraps)
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::SegmentMap;

    fn committer() -> FrameCommitter<2> {
        let map = SegmentMap::from_pairs([(0, 2)], 2).unwrap();
        FrameCommitter::new(PixelBuffer::new(map).unwrap())
    }

    #[test]
    fn test_commit_exact() {
        let mut c = committer();
        c.commit(&[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(c.generation(), 1);
        assert_eq!(c.buffer().pixels()[1].b, 6);
    }

    #[test]
    fn test_commit_wrong_size_is_noop() {
        let mut c = committer();
        c.commit(&[9; 6]).unwrap();

        assert_eq!(
            c.commit(&[1, 2, 3, 4, 5]),
            Err(SizeMismatch {
                expected: 6,
                actual: 5
            })
        );
        assert_eq!(c.generation(), 1);
        assert!(c.buffer().bytes().all(|b| b == 9));
    }

    #[test]
    fn test_clear_counts_as_commit() {
        let mut c = committer();
        c.commit(&[9; 6]).unwrap();
        c.clear();
        assert_eq!(c.generation(), 2);
        assert!(c.buffer().bytes().all(|b| b == 0));
    }
}
