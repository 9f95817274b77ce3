//! Transmit frame codec

use softuart_hal::OutputPin;

use super::{DATA_BITS, OVERSAMPLE};
use crate::buffer::RingBuffer;

/// Position of the transmitter within the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxSlot {
    /// Next action drives the start bit
    Start,
    /// Next action drives data bit `index` (the low bit of `shifter`)
    Data { index: u8, shifter: u8 },
    /// Next action drives the stop bit and releases the byte
    Stop,
}

impl TxSlot {
    /// Frame position as a 0..=9 bit counter
    pub fn frame_bit(&self) -> u8 {
        match *self {
            TxSlot::Start => 0,
            TxSlot::Data { index, .. } => 1 + index,
            TxSlot::Stop => DATA_BITS + 1,
        }
    }
}

/// Serializes bytes from the TX buffer onto the output line
///
/// The byte being sent stays at the front of the buffer until its stop
/// bit is driven, so the buffer's length always includes it. While the
/// buffer is empty a tick does nothing at all: the line was left high by
/// the last stop bit (or by `begin`) and idles there.
#[derive(Debug, Clone)]
pub struct TxCodec {
    /// Ticks until the next line transition
    countdown: u8,
    slot: TxSlot,
}

impl Default for TxCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl TxCodec {
    /// Create a codec positioned before a start bit
    pub const fn new() -> Self {
        Self {
            countdown: OVERSAMPLE,
            slot: TxSlot::Start,
        }
    }

    /// Return to the power-on position
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Current frame position
    pub fn slot(&self) -> TxSlot {
        self.slot
    }

    /// Check if a frame is partially on the wire
    pub fn in_frame(&self) -> bool {
        self.slot != TxSlot::Start
    }

    /// Advance by one oversample tick
    ///
    /// Returns the byte whose stop bit was driven on this tick.
    pub fn step<O: OutputPin, const N: usize>(
        &mut self,
        buf: &mut RingBuffer<u8, N>,
        line: &mut O,
    ) -> Option<u8> {
        let front = buf.peek()?;

        self.countdown -= 1;
        if self.countdown != 0 {
            return None;
        }
        self.countdown = OVERSAMPLE;

        let (next, sent) = match self.slot {
            TxSlot::Start => {
                line.set_low();
                (
                    TxSlot::Data {
                        index: 0,
                        shifter: front,
                    },
                    None,
                )
            }
            TxSlot::Data { index, shifter } => {
                line.set_state(shifter & 1 != 0);
                let next = if index + 1 == DATA_BITS {
                    TxSlot::Stop
                } else {
                    TxSlot::Data {
                        index: index + 1,
                        shifter: shifter >> 1,
                    }
                };
                (next, None)
            }
            TxSlot::Stop => {
                line.set_high();
                (TxSlot::Start, buf.pop())
            }
        };
        self.slot = next;
        sent
    }
}
