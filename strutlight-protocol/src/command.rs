//! Command text splitting
//!
//! Commands are opaque to the pixel pipeline. Hosts conventionally send
//! `name` or `name:value`; this only splits that text so a command
//! processor does not have to.

use crate::message::MessageError;

/// A command payload split into name and optional value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandText<'a> {
    pub name: &'a str,
    pub value: Option<&'a str>,
}

impl<'a> CommandText<'a> {
    /// Split a command payload at the first `:`
    ///
    /// Surrounding whitespace is trimmed from both parts. Fails with
    /// `InvalidText` for non-UTF-8 payloads or an empty name.
    pub fn parse(payload: &'a [u8]) -> Result<Self, MessageError> {
        let text = core::str::from_utf8(payload).map_err(|_| MessageError::InvalidText)?;

        let (name, value) = match text.split_once(':') {
            Some((name, value)) => (name.trim(), Some(value.trim())),
            None => (text.trim(), None),
        };

        if name.is_empty() {
            return Err(MessageError::InvalidText);
        }

        Ok(Self { name, value })
    }

    /// Value parsed as an integer
    pub fn value_as<T: core::str::FromStr>(&self) -> Option<T> {
        self.value?.parse().ok()
    }
}
