//! Board wiring
//!
//! Strands are soldered to fixed GPIOs. installation.toml must name the
//! same pins; anything else is a wiring mismatch and stops startup.

use strutlight_core::config::InstallationConfig;

/// Strand data pins, one PIO state machine each
///
/// GPIO2-5 run on PIO0 SM0-3, GPIO6-7 on PIO1 SM0-1.
pub const STRAND_PINS: [u8; 6] = [2, 3, 4, 5, 6, 7];

/// UART0 receive pin (host serial link)
pub const UART_RX_PIN: u8 = 1;

/// Check every configured segment against the board's strand pins
///
/// Returns the first pin that is not wired to a strand.
pub fn check_wiring(config: &InstallationConfig) -> Result<(), u8> {
    match config
        .segments
        .iter()
        .find(|s| !STRAND_PINS.contains(&s.pin))
    {
        Some(segment) => Err(segment.pin),
        None => Ok(()),
    }
}
