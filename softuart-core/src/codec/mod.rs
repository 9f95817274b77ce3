//! Per-tick frame codecs
//!
//! Wire format: one start bit (low), eight data bits least significant
//! first, one stop bit (high), no parity. Both codecs run once per
//! oversample tick and keep all of their progress in small state enums,
//! so a tick is a single bounded transition.

mod rx;
mod tx;

pub use rx::{RxCodec, RxState};
pub use tx::{TxCodec, TxSlot};

/// Timer ticks per bit period
pub const OVERSAMPLE: u8 = 3;

/// Bit periods per frame (start + 8 data + stop)
pub const FRAME_BITS: u8 = 10;

/// Data bits per frame
pub const DATA_BITS: u8 = 8;

/// Line condition counters
///
/// Counting never changes what the codecs deliver: dropped and
/// badly-framed bytes are handled exactly as if nobody was counting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineStats {
    /// Frames received and stored in the RX buffer
    pub rx_frames: u32,
    /// Frames whose stop bit has been driven
    pub tx_frames: u32,
    /// Received bytes dropped because the RX buffer was full
    pub overruns: u32,
    /// Frames whose stop bit was sampled low
    pub framing_errors: u32,
    /// Start edges rejected as noise
    pub glitches: u32,
}

impl LineStats {
    /// All counters at zero
    pub const fn new() -> Self {
        Self {
            rx_frames: 0,
            tx_frames: 0,
            overruns: 0,
            framing_errors: 0,
            glitches: 0,
        }
    }

    /// Check if any receive-side error was counted
    pub fn has_errors(&self) -> bool {
        self.overruns != 0 || self.framing_errors != 0
    }
}
