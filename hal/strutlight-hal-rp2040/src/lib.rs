//! RP2040-specific HAL for the Strutlight LED controller
//!
//! This crate provides RP2040 implementations of the shared
//! `strutlight-hal` traits:
//!
//! - Non-blocking serial receive over the buffered UART
//! - PIO-driven WS2812 strand outputs with color order and brightness

#![no_std]

pub mod uart;
pub mod ws2812;

pub use uart::{peripheral_config, SerialRx};
pub use ws2812::{OutputError, PioStrand, StrandTx, Ws2812Output, Ws2812Program};
