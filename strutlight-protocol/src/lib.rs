//! Strutlight wire protocol
//!
//! This crate defines how pixel frames and control commands travel from a
//! host to the LED controller, over three kinds of transport:
//!
//! ```text
//! Datagram (UDP), one message per packet:
//!   {<command-text>}            Command
//!   <TOTAL_LEDS * 3 raw bytes>  Frame
//!
//! Stream socket (WebSocket), one message per socket message:
//!   text   {<command-text>}     Command
//!   binary <TOTAL_LEDS * 3>     Frame
//!
//! Serial, unframed byte stream:
//!   ... {<command-text>} ... [<TOTAL_LEDS * 3 raw bytes>] ...
//! ```
//!
//! Frame payloads are R, G, B per pixel in buffer order. Commands are opaque
//! ASCII text, conventionally `name` or `name:value`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod encode;
pub mod message;
pub mod reassembler;

pub use command::CommandText;
pub use encode::{encode_command, encode_serial_frame};
pub use message::{
    classify_datagram, classify_stream, Message, MessageError, MessageType, StreamFraming,
    BYTES_PER_PIXEL, COMMAND_END, COMMAND_START, FRAME_END, FRAME_START,
};
pub use reassembler::{SerialReassembler, MAX_COMMAND_LEN};
