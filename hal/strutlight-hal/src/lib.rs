//! Strutlight Hardware Abstraction Layer
//!
//! This crate defines the hardware-facing traits the pixel pipeline is
//! written against. Chip-specific crates implement them; host tests
//! implement them with in-memory mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  strutlight-core (transports, refresh)   │
//! └──────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌──────────────────────────────────────────┐
//! │  strutlight-hal (this crate - traits)    │
//! └──────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌──────────────────────────────────────────┐
//! │  strutlight-hal-rp2040 / host mocks      │
//! └──────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartRx`] - Non-blocking serial receive
//! - [`net::DatagramSocket`] - Non-blocking datagram receive (UDP)
//! - [`net::MessageSocket`] - Non-blocking message receive (WebSocket)
//! - [`led::LedOutput`] - Physical strand output

#![no_std]
#![deny(unsafe_code)]

pub mod led;
pub mod net;
pub mod uart;

pub use led::LedOutput;
pub use net::{DatagramSocket, MessageKind, MessageSocket, Received};
pub use uart::{UartConfig, UartRx};

pub use smart_leds::RGB8;
