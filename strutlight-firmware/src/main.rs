//! Strutlight - LED strut installation controller
//!
//! Main firmware binary for RP2040 boards. Receives pixel frames and
//! commands from a host over serial, keeps them in one pixel buffer and
//! refreshes six WS2812 strands at a fixed rate.
//!
//! Everything runs in one cooperative loop: poll the transport, route its
//! message, maybe refresh, yield.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::yield_now;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{PIO0, PIO1, UART0};
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use embassy_time::Instant;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use strutlight_core::config::{load as load_installation, TransportKind};
use strutlight_core::{Controller, PixelBuffer, SerialTransport, Transport};
use strutlight_hal::UartConfig;
use strutlight_hal_rp2040::{
    peripheral_config, PioStrand, SerialRx, StrandTx, Ws2812Output, Ws2812Program,
};

use crate::commands::Commands;

mod board;
mod commands;

mod geometry {
    include!(concat!(env!("OUT_DIR"), "/geometry.rs"));
}

use geometry::{FRAME_BYTES, TOTAL_LEDS};

/// Installation description (compiled into firmware)
/// Edit installation.toml and rebuild to customize
const INSTALLATION: &str = include_str!("../installation.toml");

/// Interval between diagnostics summaries
const REPORT_INTERVAL_MS: u32 = 10_000;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
    PIO1_IRQ_0 => PioInterruptHandler<PIO1>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 16]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();

// Pipeline state sized by the installation geometry
static CONTROLLER: StaticCell<Controller<Commands, TOTAL_LEDS>> = StaticCell::new();
static SERIAL: StaticCell<SerialTransport<SerialRx, FRAME_BYTES>> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Strutlight firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Any inconsistency here stops the firmware before it drives a pixel
    let (config, map) = match load_installation(INSTALLATION) {
        Ok(loaded) => loaded,
        Err(e) => defmt::panic!("installation.toml rejected: {:?}", e),
    };
    if config.leds.total as usize != TOTAL_LEDS {
        defmt::panic!(
            "installation.toml has {} pixels, firmware was built for {}",
            config.leds.total,
            TOTAL_LEDS
        );
    }
    if let Err(pin) = board::check_wiring(&config) {
        defmt::panic!("gpio{} is not wired to a strand on this board", pin);
    }
    if config.transport.kind != TransportKind::Serial {
        defmt::panic!(
            "Transport {:?} is not available on this board",
            config.transport.kind
        );
    }

    let buffer = match PixelBuffer::<TOTAL_LEDS>::new(map) {
        Ok(buffer) => buffer,
        Err(e) => defmt::panic!("Pixel buffer layout rejected: {:?}", e),
    };
    let controller = CONTROLLER.init(Controller::new(
        buffer,
        Commands::default(),
        config.leds.fps,
    ));

    let layout = controller.buffer().segment_map();
    info!(
        "Installation: {} pixels in {} segments, refresh every {} ms",
        TOTAL_LEDS,
        layout.len(),
        controller.scheduler().period_ms()
    );
    for pin in board::STRAND_PINS {
        match layout.by_channel(pin) {
            Some(segment) => debug!(
                "Segment {} on gpio{}: {} pixels from index {}",
                segment.id, segment.channel, segment.len, segment.start
            ),
            None => info!("Strand on gpio{} has no segment and stays dark", pin),
        }
    }

    // Host serial link
    let line = UartConfig::with_baudrate(config.transport.baud_rate);
    let tx_buf = TX_BUF.init([0u8; 16]);
    let rx_buf = RX_BUF.init([0u8; 1024]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, peripheral_config(&line));
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (_tx, rx) = uart.split();

    let serial = match SerialTransport::new(
        SerialRx::new(rx),
        FRAME_BYTES,
        config.transport.serial_idle_timeout_ms,
    ) {
        Ok(transport) => SERIAL.init(transport),
        Err(e) => defmt::panic!("Serial transport rejected: {:?}", e),
    };
    if let Err(e) = serial.setup() {
        defmt::panic!("Serial setup failed: {:?}", e);
    }
    info!(
        "{} transport at {} baud on gpio{}, idle timeout {} ms",
        serial.name(),
        line.baudrate,
        board::UART_RX_PIN,
        config.transport.serial_idle_timeout_ms
    );

    // Strand outputs: GPIO2-5 on PIO0, GPIO6-7 on PIO1
    let Pio {
        mut common,
        sm0,
        sm1,
        sm2,
        sm3,
        ..
    } = Pio::new(p.PIO0, Irqs);
    let program = Ws2812Program::new(&mut common);
    let mut strand0 = PioStrand::new(&mut common, sm0, p.PIN_2, &program);
    let mut strand1 = PioStrand::new(&mut common, sm1, p.PIN_3, &program);
    let mut strand2 = PioStrand::new(&mut common, sm2, p.PIN_4, &program);
    let mut strand3 = PioStrand::new(&mut common, sm3, p.PIN_5, &program);

    let Pio {
        common: mut common1,
        sm0: pio1_sm0,
        sm1: pio1_sm1,
        ..
    } = Pio::new(p.PIO1, Irqs);
    let program1 = Ws2812Program::new(&mut common1);
    let mut strand4 = PioStrand::new(&mut common1, pio1_sm0, p.PIN_6, &program1);
    let mut strand5 = PioStrand::new(&mut common1, pio1_sm1, p.PIN_7, &program1);

    let mut output: Ws2812Output<'_, TOTAL_LEDS> =
        Ws2812Output::new(config.leds.color_order, config.leds.brightness);
    let strands: [(u8, &mut dyn StrandTx); 6] = [
        (board::STRAND_PINS[0], &mut strand0),
        (board::STRAND_PINS[1], &mut strand1),
        (board::STRAND_PINS[2], &mut strand2),
        (board::STRAND_PINS[3], &mut strand3),
        (board::STRAND_PINS[4], &mut strand4),
        (board::STRAND_PINS[5], &mut strand5),
    ];
    for (channel, strand) in strands {
        if let Err(e) = output.add_strand(channel, strand) {
            defmt::panic!("Strand on gpio{} rejected: {:?}", channel, e);
        }
    }
    info!(
        "WS2812 outputs ready ({:?}, brightness {})",
        config.leds.color_order,
        config.leds.brightness
    );

    let mut last_report = 0u32;

    loop {
        let now = Instant::now().as_millis() as u32;

        let report = controller.step(now, &mut [&mut *serial], &mut output);
        for (index, error) in report.errors.iter() {
            warn!("Discarded input from transport {}: {:?}", index, error);
        }
        if report.flush_failed {
            warn!("LED refresh failed");
        }
        if report.frames > 0 {
            trace!("Frame {} committed", controller.generation());
        }

        let pending = controller.processor_mut().take();
        if let Some(level) = pending.brightness {
            output.set_brightness(level);
        }
        if pending.blackout {
            controller.blackout();
        }

        if now.wrapping_sub(last_report) >= REPORT_INTERVAL_MS {
            let d = controller.diagnostics();
            info!(
                "frames={} commands={} discarded={} (rejected={} malformed={} timeouts={}) flushes={}",
                d.frames_committed,
                d.commands,
                d.discarded(),
                d.frames_rejected,
                d.malformed,
                d.timeouts,
                d.flushes
            );
            last_report = now;
        }

        yield_now().await;
    }
}
