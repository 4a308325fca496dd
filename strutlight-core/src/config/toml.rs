//! Minimal TOML parser for installation configuration
//!
//! Handles only the subset used by `installation.toml`. It does NOT support
//! all of TOML.
//!
//! Supported features:
//! - Key = value pairs (string, integer)
//! - `[leds]`, `[transport]` and `[segment.<name>]` headers
//! - Comments (# ...)
//!
//! ```toml
//! [leds]
//! total = 748
//! color_order = "grb"
//! fps = 60
//!
//! [transport]
//! kind = "serial"
//!
//! [segment.d1]
//! pin = "gpio5"
//! length = 136
//! ```

use strutlight_protocol::BYTES_PER_PIXEL;

use super::types::{
    ColorOrder, InstallationConfig, SegmentSpec, TransportKind, MAX_FPS, MAX_NAME_LEN,
};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not valid in its section
    UnknownKey,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Line is neither a header, a comment nor `key = value`
    InvalidLine,
    /// Too many segments
    TooManyItems,
    /// Invalid pin string
    InvalidPin,
    /// Required `[leds]` section or `total` key absent
    MissingLeds,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Leds,
    Transport,
    Segment,
}

/// Parse TOML configuration into an `InstallationConfig`
///
/// Segments keep file order. Geometry (segments summing to the total) is
/// not checked here; see [`InstallationConfig::segment_map`].
pub fn parse_config(input: &str) -> Result<InstallationConfig, ParseError> {
    let mut config = InstallationConfig::new();
    let mut section = Section::Root;
    let mut saw_total = false;

    for line in input.lines() {
        let line = strip_comment(line).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1], &mut config)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;

        match section {
            Section::Root => return Err(ParseError::UnknownKey),
            Section::Leds => {
                if key == "total" {
                    saw_total = true;
                }
                apply_leds(&mut config, key, value)?;
            }
            Section::Transport => apply_transport(&mut config, key, value)?,
            Section::Segment => {
                // parse_section_header pushed the segment being filled
                let segment = config
                    .segments
                    .last_mut()
                    .ok_or(ParseError::InvalidSection)?;
                apply_segment(segment, key, value)?;
            }
        }
    }

    if !saw_total {
        return Err(ParseError::MissingLeds);
    }

    Ok(config)
}

/// Parse a section header like "leds" or "segment.d1"
fn parse_section_header(
    header: &str,
    config: &mut InstallationConfig,
) -> Result<Section, ParseError> {
    let header = header.trim();

    if let Some((kind, name)) = header.split_once('.') {
        if kind.trim() != "segment" {
            return Err(ParseError::InvalidSection);
        }
        let name = name.trim();
        if name.is_empty() || name.len() > MAX_NAME_LEN || name.contains('.') {
            return Err(ParseError::InvalidSection);
        }
        if config.find_segment(name).is_some() {
            return Err(ParseError::InvalidSection);
        }
        config
            .segments
            .push(SegmentSpec::new(name, 0, 0))
            .map_err(|_| ParseError::TooManyItems)?;
        return Ok(Section::Segment);
    }

    match header {
        "leds" => Ok(Section::Leds),
        "transport" => Ok(Section::Transport),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_leds(config: &mut InstallationConfig, key: &str, value: &str) -> Result<(), ParseError> {
    let leds = &mut config.leds;
    match key {
        "total" => leds.total = parse_int(value)?,
        "bytes_per_pixel" => {
            if parse_int::<usize>(value)? != BYTES_PER_PIXEL {
                return Err(ParseError::InvalidValue);
            }
        }
        "color_order" => leds.color_order = parse_color_order(value)?,
        "brightness" => leds.brightness = parse_int(value)?,
        "fps" => {
            let fps: u16 = parse_int(value)?;
            if fps == 0 || fps > MAX_FPS {
                return Err(ParseError::InvalidValue);
            }
            leds.fps = fps;
        }
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn apply_transport(
    config: &mut InstallationConfig,
    key: &str,
    value: &str,
) -> Result<(), ParseError> {
    let transport = &mut config.transport;
    match key {
        "kind" => transport.kind = parse_transport_kind(value)?,
        "udp_port" => transport.udp_port = parse_int(value)?,
        "websocket_port" => transport.websocket_port = parse_int(value)?,
        "baud_rate" => transport.baud_rate = parse_int(value)?,
        "serial_idle_timeout_ms" => transport.serial_idle_timeout_ms = parse_int(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn apply_segment(segment: &mut SegmentSpec, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "pin" => segment.pin = parse_pin(value)?,
        "length" => segment.length = parse_int(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

/// Remove a trailing comment, ignoring `#` inside quotes
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

/// Parse an integer value, allowing TOML `_` separators
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    let mut digits: heapless::String<24> = heapless::String::new();
    for c in value.chars().filter(|c| *c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a pin string like "gpio5" or a bare GPIO number
fn parse_pin(value: &str) -> Result<u8, ParseError> {
    let value = parse_string(value).trim();
    let number = value.strip_prefix("gpio").unwrap_or(value);
    number.parse().map_err(|_| ParseError::InvalidPin)
}

fn parse_color_order(value: &str) -> Result<ColorOrder, ParseError> {
    match parse_string(value) {
        "rgb" | "RGB" => Ok(ColorOrder::Rgb),
        "rbg" | "RBG" => Ok(ColorOrder::Rbg),
        "grb" | "GRB" => Ok(ColorOrder::Grb),
        "gbr" | "GBR" => Ok(ColorOrder::Gbr),
        "brg" | "BRG" => Ok(ColorOrder::Brg),
        "bgr" | "BGR" => Ok(ColorOrder::Bgr),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_transport_kind(value: &str) -> Result<TransportKind, ParseError> {
    match parse_string(value) {
        "udp" => Ok(TransportKind::Udp),
        "websocket" | "tcp" => Ok(TransportKind::WebSocket),
        "serial" => Ok(TransportKind::Serial),
        _ => Err(ParseError::InvalidValue),
    }
}
