//! PIO-based WS2812 strand output
//!
//! Each strand gets its own PIO state machine running the same 4-instruction
//! bit-banging program, loaded once per PIO block. The RP2040 has 2 PIO
//! blocks with 4 SMs each, so up to 8 strands can be driven.
//!
//! # Timing
//!
//! One bit is 10 PIO cycles at 8 MHz (800 kbit/s):
//!
//! ```text
//!        ┌──T1──┬────T2────┐
//!  one:  │ high │  high    │ low (T3)
//!  zero: │ high │  low     │ low (T3)
//! ```
//!
//! with T1 = 2, T2 = 5 and T3 = 3 cycles.
//!
//! # Refresh
//!
//! `write_segment` converts pixels into FIFO words (strand color order,
//! global brightness) in a staging area. `show` then feeds all strands
//! round-robin so they shift out in parallel.

use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::pio::{
    Common, Config, Direction as PioDirection, FifoJoin, Instance, LoadedProgram, PioPin,
    ShiftConfig, ShiftDirection, StateMachine,
};
use embassy_rp::Peri;
use fixed::types::U24F8;
use heapless::Vec;
use smart_leds::{brightness, RGB8};
use strutlight_core::config::ColorOrder;
use strutlight_hal::LedOutput;

/// Maximum strands per output (2 PIO blocks x 4 state machines)
pub const MAX_STRANDS: usize = 8;

/// PIO cycles per WS2812 bit (T1 + T2 + T3)
pub const CYCLES_PER_BIT: u32 = 10;

/// WS2812 bit rate in kHz
pub const BIT_RATE_KHZ: u32 = 800;

/// LED output errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// No strand is attached to this channel
    UnknownChannel(u8),
    /// Channel already has a strand
    DuplicateChannel(u8),
    /// More than `MAX_STRANDS` strands
    TooManyStrands,
    /// Staged pixels exceed the staging capacity
    Overflow,
}

/// Transmit side of one strand
pub trait StrandTx {
    /// Queue one 24-bit pixel word (left-aligned); false if the FIFO is full
    fn try_push(&mut self, word: u32) -> bool;
}

/// The WS2812 program, loaded into one PIO block
pub struct Ws2812Program<'d, PIO: Instance> {
    program: LoadedProgram<'d, PIO>,
}

impl<'d, PIO: Instance> Ws2812Program<'d, PIO> {
    /// Load the program into `common`
    pub fn new(common: &mut Common<'d, PIO>) -> Self {
        let prg = pio::pio_asm!(
            ".side_set 1",
            ".wrap_target",
            "bitloop:",
            "    out x, 1       side 0 [2]", // T3
            "    jmp !x do_zero side 1 [1]", // T1
            "do_one:",
            "    jmp bitloop    side 1 [4]", // T2
            "do_zero:",
            "    nop            side 0 [4]", // T2
            ".wrap"
        );

        Self {
            program: common.load_program(&prg.program),
        }
    }
}

/// One strand driven by a PIO state machine
pub struct PioStrand<'d, PIO: Instance, const SM: usize> {
    sm: StateMachine<'d, PIO, SM>,
}

impl<'d, PIO: Instance, const SM: usize> PioStrand<'d, PIO, SM> {
    /// Configure `sm` to drive a strand on `pin`
    pub fn new(
        common: &mut Common<'d, PIO>,
        mut sm: StateMachine<'d, PIO, SM>,
        pin: Peri<'d, impl PioPin>,
        program: &Ws2812Program<'d, PIO>,
    ) -> Self {
        let out_pin = common.make_pio_pin(pin);

        let mut cfg = Config::default();
        cfg.use_program(&program.program, &[&out_pin]);

        // Measured in kHz to stay inside U24F8
        let clock_khz = U24F8::from_num(clk_sys_freq() / 1000);
        let bit_khz = U24F8::from_num(BIT_RATE_KHZ * CYCLES_PER_BIT);
        cfg.clock_divider = clock_khz / bit_khz;

        cfg.fifo_join = FifoJoin::TxOnly;
        cfg.shift_out = ShiftConfig {
            auto_fill: true,
            threshold: 24,
            direction: ShiftDirection::Left,
        };

        sm.set_config(&cfg);
        sm.set_pin_dirs(PioDirection::Out, &[&out_pin]);
        sm.set_enable(true);

        Self { sm }
    }
}

impl<PIO: Instance, const SM: usize> StrandTx for PioStrand<'_, PIO, SM> {
    fn try_push(&mut self, word: u32) -> bool {
        self.sm.tx().try_push(word)
    }
}

/// Convert a pixel to a FIFO word in strand byte order
pub fn pixel_word(pixel: RGB8, order: ColorOrder) -> u32 {
    let [a, b, c] = order.arrange(pixel);
    (u32::from(a) << 24) | (u32::from(b) << 16) | (u32::from(c) << 8)
}

struct Strand<'a> {
    channel: u8,
    tx: &'a mut dyn StrandTx,
    start: usize,
    len: usize,
    sent: usize,
}

/// A set of WS2812 strands behind one [`LedOutput`]
///
/// `CAP` is the staging capacity in pixels and must cover every strand.
pub struct Ws2812Output<'a, const CAP: usize> {
    strands: Vec<Strand<'a>, MAX_STRANDS>,
    words: [u32; CAP],
    staged: usize,
    order: ColorOrder,
    brightness: u8,
}

impl<'a, const CAP: usize> Ws2812Output<'a, CAP> {
    pub fn new(order: ColorOrder, brightness: u8) -> Self {
        Self {
            strands: Vec::new(),
            words: [0; CAP],
            staged: 0,
            order,
            brightness,
        }
    }

    /// Attach a strand to an output channel
    pub fn add_strand(&mut self, channel: u8, tx: &'a mut dyn StrandTx) -> Result<(), OutputError> {
        if self.strands.iter().any(|s| s.channel == channel) {
            return Err(OutputError::DuplicateChannel(channel));
        }

        self.strands
            .push(Strand {
                channel,
                tx,
                start: 0,
                len: 0,
                sent: 0,
            })
            .map_err(|_| OutputError::TooManyStrands)
    }

    /// Global brightness applied at the next refresh
    pub fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Drop everything staged since the last refresh
    fn restart(&mut self) {
        for strand in self.strands.iter_mut() {
            strand.len = 0;
            strand.sent = 0;
        }
        self.staged = 0;
    }
}

impl<const CAP: usize> LedOutput for Ws2812Output<'_, CAP> {
    type Error = OutputError;

    fn write_segment(&mut self, channel: u8, pixels: &[RGB8]) -> Result<(), OutputError> {
        let Some(index) = self.strands.iter().position(|s| s.channel == channel) else {
            self.restart();
            return Err(OutputError::UnknownChannel(channel));
        };

        // A strand written twice means the previous refresh never reached show()
        if self.strands[index].len > 0 {
            self.restart();
        }

        let start = self.staged;
        let end = start + pixels.len();
        if end > CAP {
            self.restart();
            return Err(OutputError::Overflow);
        }

        let scaled = brightness(pixels.iter().copied(), self.brightness);
        for (word, pixel) in self.words[start..end].iter_mut().zip(scaled) {
            *word = pixel_word(pixel, self.order);
        }

        let strand = &mut self.strands[index];
        strand.start = start;
        strand.len = pixels.len();
        strand.sent = 0;
        self.staged = end;
        Ok(())
    }

    fn show(&mut self) -> Result<(), OutputError> {
        // Spin until every strand's FIFO has taken its last word
        loop {
            let mut pending = false;
            for strand in self.strands.iter_mut() {
                if strand.sent < strand.len {
                    pending = true;
                    let word = self.words[strand.start + strand.sent];
                    if strand.tx.try_push(word) {
                        strand.sent += 1;
                    }
                }
            }
            if !pending {
                break;
            }
        }

        self.restart();
        Ok(())
    }
}
