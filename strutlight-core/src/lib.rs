//! Board-agnostic core of the Strutlight LED controller
//!
//! This crate contains the whole ingest-to-refresh pipeline without
//! depending on a particular chip:
//!
//! - Installation configuration and its parser
//! - Segment map and pixel buffer
//! - Frame committer (sole writer of the pixel buffer)
//! - Message dispatcher and the command processor seam
//! - Datagram, stream-socket and serial transports over HAL traits
//! - Rate-limited refresh scheduler
//! - Cooperative controller loop and diagnostics counters
//!
//! ```text
//!  transports ──poll──▶ dispatch ──Frame──▶ committer ──▶ pixel buffer
//!                          │                                  │
//!                          └──Command──▶ command processor    ▼
//!                                              refresh scheduler ──▶ LED output
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod commit;
pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod dispatch;
pub mod pixel;
pub mod refresh;
pub mod transport;

#[cfg(test)]
mod mock;

pub use commit::FrameCommitter;
pub use config::{parse_config, ConfigError, InstallationConfig};
pub use controller::{Controller, IngestError, StepReport, MAX_TRANSPORTS};
pub use diagnostics::Diagnostics;
pub use dispatch::{dispatch, CommandProcessor};
pub use pixel::{LayoutError, PixelBuffer, Segment, SegmentMap, SizeMismatch};
pub use refresh::{flush, RefreshScheduler};
pub use transport::{DatagramTransport, SerialTransport, StreamTransport, Transport, TransportError};
