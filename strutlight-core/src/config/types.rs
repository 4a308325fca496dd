//! Installation configuration types
//!
//! Describes one physical installation: how many pixels it has, how they
//! are split across output strands, how fast to refresh and which
//! transport feeds it. Fixed at build time; never changed at runtime.

use heapless::{String, Vec};
use smart_leds::RGB8;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::pixel::{LayoutError, SegmentMap};

/// Maximum output strands per installation
pub const MAX_SEGMENTS: usize = 8;

/// Maximum segment name length
pub const MAX_NAME_LEN: usize = 16;

/// Default refresh rate
pub const DEFAULT_FPS: u16 = 60;

/// Default global brightness (0-255)
pub const DEFAULT_BRIGHTNESS: u8 = 50;

/// Default UDP listen port
pub const DEFAULT_UDP_PORT: u16 = 4210;

/// Default WebSocket listen port
pub const DEFAULT_WEBSOCKET_PORT: u16 = 81;

/// Default serial baud rate
pub const DEFAULT_BAUD_RATE: u32 = 115200;

/// Default serial inactivity window before a partial message is dropped
pub const DEFAULT_SERIAL_IDLE_TIMEOUT_MS: u32 = 500;

/// Highest supported refresh rate (1 ms period)
pub const MAX_FPS: u16 = 1000;

/// Byte order a strand expects on the wire
///
/// The pixel buffer always holds R, G, B. Reordering happens only when a
/// strand is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ColorOrder {
    Rgb,
    Rbg,
    #[default]
    Grb,
    Gbr,
    Brg,
    Bgr,
}

impl ColorOrder {
    /// Arrange a pixel's channels in strand order
    pub fn arrange(self, pixel: RGB8) -> [u8; 3] {
        let RGB8 { r, g, b } = pixel;
        match self {
            ColorOrder::Rgb => [r, g, b],
            ColorOrder::Rbg => [r, b, g],
            ColorOrder::Grb => [g, r, b],
            ColorOrder::Gbr => [g, b, r],
            ColorOrder::Brg => [b, r, g],
            ColorOrder::Bgr => [b, g, r],
        }
    }
}

/// Which transport feeds the pixel pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TransportKind {
    /// Datagrams, one message per packet
    #[default]
    Udp,
    /// WebSocket text/binary messages
    WebSocket,
    /// Delimiter-framed serial byte stream
    Serial,
}

/// One output strand
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentSpec {
    /// Name from the config file
    pub name: String<MAX_NAME_LEN>,
    /// Output channel (GPIO number driving the strand)
    pub pin: u8,
    /// Pixels on this strand
    pub length: u16,
}

impl SegmentSpec {
    /// Create a segment spec, truncating long names
    pub fn new(name: &str, pin: u8, length: u16) -> Self {
        let mut label = String::new();
        for c in name.chars() {
            if label.push(c).is_err() {
                break;
            }
        }
        Self {
            name: label,
            pin,
            length,
        }
    }
}

/// Pixel geometry and refresh settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LedConfig {
    /// Total pixel count across all segments
    pub total: u16,
    /// Strand byte order
    pub color_order: ColorOrder,
    /// Global brightness applied at flush time (0-255)
    pub brightness: u8,
    /// Target refresh rate in frames per second
    pub fps: u16,
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            total: 0,
            color_order: ColorOrder::default(),
            brightness: DEFAULT_BRIGHTNESS,
            fps: DEFAULT_FPS,
        }
    }
}

/// Transport selection and per-transport settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransportConfig {
    /// Active transport
    pub kind: TransportKind,
    /// UDP listen port
    pub udp_port: u16,
    /// WebSocket listen port
    pub websocket_port: u16,
    /// Serial baud rate
    pub baud_rate: u32,
    /// Serial inactivity window; 0 disables the watchdog
    pub serial_idle_timeout_ms: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::default(),
            udp_port: DEFAULT_UDP_PORT,
            websocket_port: DEFAULT_WEBSOCKET_PORT,
            baud_rate: DEFAULT_BAUD_RATE,
            serial_idle_timeout_ms: DEFAULT_SERIAL_IDLE_TIMEOUT_MS,
        }
    }
}

/// Complete installation configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InstallationConfig {
    pub leds: LedConfig,
    pub transport: TransportConfig,
    /// Output strands in buffer order
    pub segments: Vec<SegmentSpec, MAX_SEGMENTS>,
}

impl InstallationConfig {
    /// Create an empty configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes in one full frame
    pub fn frame_len(&self) -> usize {
        self.leds.total as usize * strutlight_protocol::BYTES_PER_PIXEL
    }

    /// Find a segment by name
    pub fn find_segment(&self, name: &str) -> Option<&SegmentSpec> {
        self.segments.iter().find(|s| s.name.as_str() == name)
    }

    /// Build the segment map, checking that segments partition `leds.total`
    pub fn segment_map(&self) -> Result<SegmentMap, LayoutError> {
        SegmentMap::from_specs(&self.segments, self.leds.total as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_order_arrange() {
        let pixel = RGB8::new(1, 2, 3);
        assert_eq!(ColorOrder::Rgb.arrange(pixel), [1, 2, 3]);
        assert_eq!(ColorOrder::Grb.arrange(pixel), [2, 1, 3]);
        assert_eq!(ColorOrder::Bgr.arrange(pixel), [3, 2, 1]);
        assert_eq!(ColorOrder::Brg.arrange(pixel), [3, 1, 2]);
    }

    #[test]
    fn test_defaults() {
        let config = InstallationConfig::new();
        assert_eq!(config.leds.fps, 60);
        assert_eq!(config.leds.brightness, 50);
        assert_eq!(config.leds.color_order, ColorOrder::Grb);
        assert_eq!(config.transport.kind, TransportKind::Udp);
        assert_eq!(config.transport.udp_port, 4210);
        assert_eq!(config.transport.baud_rate, 115200);
        assert!(config.segments.is_empty());
    }

    #[test]
    fn test_segment_spec_truncates_name() {
        let spec = SegmentSpec::new("a-very-long-segment-name", 5, 10);
        assert_eq!(spec.name.len(), MAX_NAME_LEN);
    }

    #[test]
    fn test_frame_len_and_segment_map() {
        let mut config = InstallationConfig::new();
        config.leds.total = 10;
        config.segments.push(SegmentSpec::new("left", 5, 4)).unwrap();
        config.segments.push(SegmentSpec::new("right", 4, 6)).unwrap();

        assert_eq!(config.frame_len(), 30);
        assert!(config.find_segment("right").is_some());

        let map = config.segment_map().unwrap();
        assert_eq!(map.total_pixels(), 10);
        assert_eq!(map.segments()[1].start, 4);
    }
}
