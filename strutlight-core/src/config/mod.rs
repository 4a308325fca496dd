//! Installation configuration
//!
//! The firmware embeds `installation.toml` at build time and parses it once
//! at startup with a custom no_std parser.

pub mod toml;
pub mod types;

pub use toml::{parse_config, ParseError};
pub use types::*;

use crate::pixel::{LayoutError, SegmentMap};

/// Configuration could not be turned into a working installation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The TOML text was rejected
    Parse(ParseError),
    /// Segments do not partition the pixel buffer
    Layout(LayoutError),
}

impl From<ParseError> for ConfigError {
    fn from(e: ParseError) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<LayoutError> for ConfigError {
    fn from(e: LayoutError) -> Self {
        ConfigError::Layout(e)
    }
}

/// Parse configuration text and validate its geometry in one step
pub fn load(input: &str) -> Result<(InstallationConfig, SegmentMap), ConfigError> {
    let config = parse_config(input)?;
    let map = config.segment_map()?;
    Ok((config, map))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_valid() {
        let input = "[leds]\ntotal = 3\n[segment.a]\npin = 2\nlength = 3\n";
        let (config, map) = load(input).unwrap();
        assert_eq!(config.frame_len(), 9);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_load_reports_layout_error() {
        let input = "[leds]\ntotal = 5\n[segment.a]\npin = 2\nlength = 3\n";
        assert_eq!(
            load(input).unwrap_err(),
            ConfigError::Layout(LayoutError::PixelCountMismatch {
                expected: 5,
                actual: 3
            })
        );
    }

    #[test]
    fn test_load_reports_parse_error() {
        assert_eq!(
            load("[leds]\n").unwrap_err(),
            ConfigError::Parse(ParseError::MissingLeds)
        );
    }
}
