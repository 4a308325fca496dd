//! Fixed-size pixel buffer

use smart_leds::RGB8;
use strutlight_protocol::BYTES_PER_PIXEL;

use super::segment::{LayoutError, Segment, SegmentMap};

/// Frame payload length differs from the buffer's byte length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SizeMismatch {
    pub expected: usize,
    pub actual: usize,
}

/// `N` pixels partitioned by a segment map
///
/// Sized once at startup and never resized. The only bulk mutation is
/// [`write_all`](Self::write_all), which replaces every pixel or none.
#[derive(Debug, Clone)]
pub struct PixelBuffer<const N: usize> {
    pixels: [RGB8; N],
    segments: SegmentMap,
}

impl<const N: usize> PixelBuffer<N> {
    /// Create an all-black buffer
    ///
    /// The segment map must cover exactly `N` pixels.
    pub fn new(segments: SegmentMap) -> Result<Self, LayoutError> {
        if segments.total_pixels() != N {
            return Err(LayoutError::PixelCountMismatch {
                expected: N,
                actual: segments.total_pixels(),
            });
        }

        Ok(Self {
            pixels: [RGB8::default(); N],
            segments,
        })
    }

    /// Number of pixels
    pub const fn total_pixels(&self) -> usize {
        N
    }

    /// Byte length of a full frame
    pub const fn total_bytes(&self) -> usize {
        N * BYTES_PER_PIXEL
    }

    /// Segments in buffer order
    pub fn segments(&self) -> &[Segment] {
        self.segments.segments()
    }

    /// The segment map this buffer was built with
    pub fn segment_map(&self) -> &SegmentMap {
        &self.segments
    }

    /// Replace the whole buffer with raw R, G, B bytes
    ///
    /// Leaves the buffer untouched unless `bytes` is exactly
    /// `total_bytes()` long.
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<(), SizeMismatch> {
        if bytes.len() != self.total_bytes() {
            return Err(SizeMismatch {
                expected: self.total_bytes(),
                actual: bytes.len(),
            });
        }

        for (pixel, rgb) in self.pixels.iter_mut().zip(bytes.chunks_exact(BYTES_PER_PIXEL)) {
            *pixel = RGB8::new(rgb[0], rgb[1], rgb[2]);
        }
        Ok(())
    }

    /// Set every pixel to black
    pub fn clear(&mut self) {
        self.pixels = [RGB8::default(); N];
    }

    /// All pixels in buffer order
    pub fn pixels(&self) -> &[RGB8] {
        &self.pixels
    }

    /// Pixels belonging to one segment
    ///
    /// Empty if the segment does not fit this buffer.
    pub fn segment_pixels(&self, segment: &Segment) -> &[RGB8] {
        self.pixels.get(segment.range()).unwrap_or(&[])
    }

    /// Raw bytes in buffer order, as they arrived on the wire
    pub fn bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.pixels.iter().flat_map(|p| [p.r, p.g, p.b])
    }

    /// Copy the raw bytes into `out`
    ///
    /// Returns the number of bytes written, or `SizeMismatch` if `out` is
    /// shorter than a full frame.
    pub fn read_into(&self, out: &mut [u8]) -> Result<usize, SizeMismatch> {
        let len = self.total_bytes();
        if out.len() < len {
            return Err(SizeMismatch {
                expected: len,
                actual: out.len(),
            });
        }

        for (dst, src) in out.iter_mut().zip(self.bytes()) {
            *dst = src;
        }
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::vec::Vec as StdVec;

    const PIXELS: usize = 10;

    fn buffer() -> PixelBuffer<PIXELS> {
        let map = SegmentMap::from_pairs([(5, 4), (4, 6)], PIXELS).unwrap();
        PixelBuffer::new(map).unwrap()
    }

    #[test]
    fn test_new_is_black() {
        let buf = buffer();
        assert_eq!(buf.total_pixels(), 10);
        assert_eq!(buf.total_bytes(), 30);
        assert!(buf.pixels().iter().all(|p| *p == RGB8::default()));
    }

    #[test]
    fn test_new_rejects_wrong_geometry() {
        let map = SegmentMap::from_pairs([(0, 8)], 8).unwrap();
        assert_eq!(
            PixelBuffer::<PIXELS>::new(map).unwrap_err(),
            LayoutError::PixelCountMismatch {
                expected: 10,
                actual: 8
            }
        );
    }

    #[test]
    fn test_write_all_keeps_channel_order() {
        let mut buf = buffer();
        let bytes: StdVec<u8> = (0..30).collect();
        buf.write_all(&bytes).unwrap();

        assert_eq!(buf.pixels()[0], RGB8::new(0, 1, 2));
        assert_eq!(buf.pixels()[9], RGB8::new(27, 28, 29));
    }

    #[test]
    fn test_segment_pixels() {
        let mut buf = buffer();
        let bytes: StdVec<u8> = (0..30).collect();
        buf.write_all(&bytes).unwrap();

        let second = buf.segments()[1];
        let pixels = buf.segment_pixels(&second);
        assert_eq!(pixels.len(), 6);
        assert_eq!(pixels[0], RGB8::new(12, 13, 14));
    }

    #[test]
    fn test_clear() {
        let mut buf = buffer();
        buf.write_all(&[0xff; 30]).unwrap();
        buf.clear();
        assert!(buf.bytes().all(|b| b == 0));
    }

    #[test]
    fn test_read_into_short_buffer() {
        let buf = buffer();
        let mut out = [0u8; 29];
        assert_eq!(
            buf.read_into(&mut out),
            Err(SizeMismatch {
                expected: 30,
                actual: 29
            })
        );
    }

    proptest! {
        #[test]
        fn test_write_all_iff_exact(
            initial in proptest::collection::vec(any::<u8>(), 30),
            payload in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            let mut buf = buffer();
            buf.write_all(&initial).unwrap();

            let result = buf.write_all(&payload);
            let now: StdVec<u8> = buf.bytes().collect();

            if payload.len() == 30 {
                prop_assert!(result.is_ok());
                prop_assert_eq!(now, payload);
            } else {
                prop_assert_eq!(result, Err(SizeMismatch { expected: 30, actual: payload.len() }));
                prop_assert_eq!(now, initial);
            }
        }

        #[test]
        fn test_round_trip(bytes in proptest::collection::vec(any::<u8>(), 30)) {
            let mut buf = buffer();
            buf.write_all(&bytes).unwrap();

            let mut out = [0u8; 30];
            prop_assert_eq!(buf.read_into(&mut out), Ok(30));
            prop_assert_eq!(&out[..], &bytes[..]);
        }
    }
}
