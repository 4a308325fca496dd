//! Command handling
//!
//! Commands arrive through the controller while it holds the pixel buffer,
//! so handling only records what was asked. The main loop applies it
//! between iterations.

use defmt::*;
use strutlight_core::CommandProcessor;
use strutlight_protocol::CommandText;

/// Actions requested since the last [`Commands::take`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Pending {
    /// New global brightness
    pub brightness: Option<u8>,
    /// Black out every pixel
    pub blackout: bool,
}

/// Command processor for the board
#[derive(Default)]
pub struct Commands {
    pending: Pending,
}

impl Commands {
    /// Hand over and clear the requested actions
    pub fn take(&mut self) -> Pending {
        core::mem::take(&mut self.pending)
    }
}

impl CommandProcessor for Commands {
    fn process(&mut self, payload: &[u8]) {
        let command = match CommandText::parse(payload) {
            Ok(command) => command,
            Err(e) => {
                warn!("Unreadable command ({} bytes): {:?}", payload.len(), e);
                return;
            }
        };

        match command.name {
            "setBrightness" => match command.value_as::<u8>() {
                Some(level) => {
                    info!("Brightness set to {}", level);
                    self.pending.brightness = Some(level);
                }
                None => warn!("setBrightness needs a value of 0-255"),
            },
            "turnOff" => {
                info!("Turning off");
                self.pending.blackout = true;
            }
            other => debug!("Ignoring command '{=str}'", other),
        }
    }
}
