//! Receive frame codec

use softuart_hal::InputPin;

use super::{LineStats, DATA_BITS, OVERSAMPLE};
use crate::buffer::RingBuffer;

/// Ticks from the start edge to the first data sample
///
/// One more than a bit period: the edge is seen somewhere inside the
/// first tick of the start bit, so waiting four ticks lands on the center
/// of data bit 0. Every later sample is [`OVERSAMPLE`] ticks on.
pub const START_DELAY: u8 = OVERSAMPLE + 1;

/// Countdown values on which the start bit is re-checked
///
/// The two ticks after the edge still fall inside the start bit for any
/// edge phase; a high reading there means the edge was noise. A low pulse
/// of three ticks passes the check: it is a full start bit followed by a
/// mark-level line, which is exactly a `0xFF` frame.
const START_CONFIRM_MIN: u8 = START_DELAY - 2;

/// Ticks from the last data sample to the stop-bit center
pub const STOP_HOLD: u8 = OVERSAMPLE;

/// Receiver state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxState {
    /// Line idle, watching for a falling edge
    AwaitingStart,
    /// Inside a frame, sampling data bits
    Sampling {
        /// Data bits still to sample
        bits_remaining: u8,
        /// Bit of `accumulator` the next sample lands in
        mask: u8,
        /// Data bits sampled so far
        accumulator: u8,
        /// Ticks until the next sample
        ticks_to_sample: u8,
    },
    /// All data bits in, holding until the stop-bit center
    AwaitingStop {
        ticks_remaining: u8,
        accumulator: u8,
    },
}

/// Deserializes frames from the input line into the RX buffer
///
/// A byte is committed on the tick that reaches the stop-bit center. If
/// the RX buffer is full at that point the byte is dropped; the frame is
/// still consumed so the receiver stays in step with the wire.
#[derive(Debug, Clone)]
pub struct RxCodec {
    state: RxState,
}

impl Default for RxCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl RxCodec {
    /// Create an idle receiver
    pub const fn new() -> Self {
        Self {
            state: RxState::AwaitingStart,
        }
    }

    /// Drop any partially received byte
    pub fn reset(&mut self) {
        self.state = RxState::AwaitingStart;
    }

    /// Current receiver state
    pub fn state(&self) -> RxState {
        self.state
    }

    /// Check if a frame is being received
    pub fn in_frame(&self) -> bool {
        self.state != RxState::AwaitingStart
    }

    /// Advance by one oversample tick
    pub fn step<I: InputPin, const N: usize>(
        &mut self,
        line: &mut I,
        buf: &mut RingBuffer<u8, N>,
        stats: &mut LineStats,
    ) {
        self.state = match self.state {
            RxState::AwaitingStart => {
                if line.is_low() {
                    RxState::Sampling {
                        bits_remaining: DATA_BITS,
                        mask: 1,
                        accumulator: 0,
                        ticks_to_sample: START_DELAY,
                    }
                } else {
                    RxState::AwaitingStart
                }
            }
            RxState::Sampling {
                bits_remaining,
                mask,
                accumulator,
                ticks_to_sample,
            } => {
                let ticks_to_sample = ticks_to_sample - 1;

                if bits_remaining == DATA_BITS
                    && ticks_to_sample >= START_CONFIRM_MIN
                    && line.is_high()
                {
                    stats.glitches = stats.glitches.wrapping_add(1);
                    RxState::AwaitingStart
                } else if ticks_to_sample != 0 {
                    RxState::Sampling {
                        bits_remaining,
                        mask,
                        accumulator,
                        ticks_to_sample,
                    }
                } else {
                    let accumulator = if line.is_high() {
                        accumulator | mask
                    } else {
                        accumulator
                    };
                    let bits_remaining = bits_remaining - 1;

                    if bits_remaining == 0 {
                        RxState::AwaitingStop {
                            ticks_remaining: STOP_HOLD,
                            accumulator,
                        }
                    } else {
                        RxState::Sampling {
                            bits_remaining,
                            mask: mask << 1,
                            accumulator,
                            ticks_to_sample: OVERSAMPLE,
                        }
                    }
                }
            }
            RxState::AwaitingStop {
                ticks_remaining,
                accumulator,
            } => {
                let ticks_remaining = ticks_remaining - 1;
                if ticks_remaining != 0 {
                    RxState::AwaitingStop {
                        ticks_remaining,
                        accumulator,
                    }
                } else {
                    if line.is_low() {
                        stats.framing_errors = stats.framing_errors.wrapping_add(1);
                    }
                    if buf.push(accumulator) {
                        stats.rx_frames = stats.rx_frames.wrapping_add(1);
                    } else {
                        stats.overruns = stats.overruns.wrapping_add(1);
                    }
                    RxState::AwaitingStart
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Input line replaying a fixed per-tick level sequence, then idling high
    struct ScriptedLine<'a> {
        levels: &'a [bool],
        pos: usize,
    }

    impl<'a> ScriptedLine<'a> {
        fn new(levels: &'a [bool]) -> Self {
            Self { levels, pos: 0 }
        }
    }

    impl InputPin for ScriptedLine<'_> {
        fn is_high(&mut self) -> bool {
            self.levels.get(self.pos).copied().unwrap_or(true)
        }
    }

    /// Expand one byte into per-tick line levels (3 ticks per bit)
    fn frame_levels(byte: u8, out: &mut [bool]) -> usize {
        let mut n = 0;
        let mut push_bit = |level: bool, n: &mut usize| {
            for _ in 0..OVERSAMPLE {
                out[*n] = level;
                *n += 1;
            }
        };
        push_bit(false, &mut n);
        for i in 0..8 {
            push_bit((byte >> i) & 1 != 0, &mut n);
        }
        push_bit(true, &mut n);
        n
    }

    fn run<const N: usize>(
        codec: &mut RxCodec,
        line: &mut ScriptedLine<'_>,
        buf: &mut RingBuffer<u8, N>,
        stats: &mut LineStats,
        ticks: usize,
    ) {
        for tick in 0..ticks {
            line.pos = tick;
            codec.step(line, buf, stats);
        }
    }

    #[test]
    fn test_idle_line_stays_awaiting_start() {
        let mut codec = RxCodec::new();
        let mut line = ScriptedLine::new(&[]);
        let mut buf = RingBuffer::<u8, 4>::new(0);
        let mut stats = LineStats::new();

        run(&mut codec, &mut line, &mut buf, &mut stats, 50);
        assert_eq!(codec.state(), RxState::AwaitingStart);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_receive_single_byte() {
        let mut levels = [true; 40];
        frame_levels(0x41, &mut levels[2..]);

        let mut codec = RxCodec::new();
        let mut line = ScriptedLine::new(&levels);
        let mut buf = RingBuffer::<u8, 4>::new(0);
        let mut stats = LineStats::new();

        run(&mut codec, &mut line, &mut buf, &mut stats, 40);
        assert_eq!(buf.pop(), Some(0x41));
        assert_eq!(stats.rx_frames, 1);
        assert!(!stats.has_errors());
    }

    #[test]
    fn test_start_edge_transition() {
        let levels = [false; 3];
        let mut codec = RxCodec::new();
        let mut line = ScriptedLine::new(&levels);
        let mut buf = RingBuffer::<u8, 4>::new(0);
        let mut stats = LineStats::new();

        run(&mut codec, &mut line, &mut buf, &mut stats, 1);
        assert_eq!(
            codec.state(),
            RxState::Sampling {
                bits_remaining: 8,
                mask: 1,
                accumulator: 0,
                ticks_to_sample: START_DELAY,
            }
        );
    }

    #[test]
    fn test_byte_committed_at_stop_bit_center() {
        let mut levels = [true; 40];
        frame_levels(0x00, &mut levels);

        let mut codec = RxCodec::new();
        let mut line = ScriptedLine::new(&levels);
        let mut buf = RingBuffer::<u8, 4>::new(0);
        let mut stats = LineStats::new();

        // Edge at tick 0, last data sample at tick 25, stop center at tick 28
        run(&mut codec, &mut line, &mut buf, &mut stats, 28);
        assert!(matches!(codec.state(), RxState::AwaitingStop { ticks_remaining: 1, .. }));
        assert!(buf.is_empty());

        line.pos = 28;
        codec.step(&mut line, &mut buf, &mut stats);
        assert_eq!(codec.state(), RxState::AwaitingStart);
        assert_eq!(buf.pop(), Some(0x00));
    }

    #[test]
    fn test_short_low_pulses_rejected() {
        for width in 1..=2 {
            let mut levels = [true; 60];
            for level in levels.iter_mut().skip(5).take(width) {
                *level = false;
            }

            let mut codec = RxCodec::new();
            let mut line = ScriptedLine::new(&levels);
            let mut buf = RingBuffer::<u8, 4>::new(0);
            let mut stats = LineStats::new();

            run(&mut codec, &mut line, &mut buf, &mut stats, 60);
            assert!(buf.is_empty(), "{}-tick pulse produced a byte", width);
            assert_eq!(stats.glitches, 1);
            assert_eq!(codec.state(), RxState::AwaitingStart);
        }
    }

    #[test]
    fn test_three_tick_pulse_reads_as_0xff() {
        let mut levels = [true; 60];
        for level in levels.iter_mut().skip(5).take(3) {
            *level = false;
        }

        let mut codec = RxCodec::new();
        let mut line = ScriptedLine::new(&levels);
        let mut buf = RingBuffer::<u8, 4>::new(0);
        let mut stats = LineStats::new();

        run(&mut codec, &mut line, &mut buf, &mut stats, 60);
        assert_eq!(buf.pop(), Some(0xFF));
        assert_eq!(buf.pop(), None);
        assert_eq!(stats.glitches, 0);
        assert_eq!(stats.rx_frames, 1);
    }

    #[test]
    fn test_overrun_drops_byte_and_keeps_framing() {
        let mut levels = [true; 70];
        frame_levels(0x11, &mut levels);
        frame_levels(0x22, &mut levels[30..]);

        let mut codec = RxCodec::new();
        let mut line = ScriptedLine::new(&levels);
        // Two slots: room for one byte
        let mut buf = RingBuffer::<u8, 2>::new(0);
        let mut stats = LineStats::new();

        run(&mut codec, &mut line, &mut buf, &mut stats, 70);
        assert_eq!(buf.pop(), Some(0x11));
        assert_eq!(buf.pop(), None);
        assert_eq!(stats.rx_frames, 1);
        assert_eq!(stats.overruns, 1);
        assert_eq!(codec.state(), RxState::AwaitingStart);
    }

    #[test]
    fn test_framing_error_counted_but_delivered() {
        let mut levels = [true; 40];
        frame_levels(0x5A, &mut levels);
        // Hold the stop bit low
        for level in levels.iter_mut().skip(27).take(3) {
            *level = false;
        }

        let mut codec = RxCodec::new();
        let mut line = ScriptedLine::new(&levels);
        let mut buf = RingBuffer::<u8, 4>::new(0);
        let mut stats = LineStats::new();

        run(&mut codec, &mut line, &mut buf, &mut stats, 29);
        assert_eq!(buf.pop(), Some(0x5A));
        assert_eq!(stats.framing_errors, 1);
    }

    #[test]
    fn test_reset_discards_partial_byte() {
        let mut levels = [true; 40];
        frame_levels(0xA5, &mut levels);

        let mut codec = RxCodec::new();
        let mut line = ScriptedLine::new(&levels);
        let mut buf = RingBuffer::<u8, 4>::new(0);
        let mut stats = LineStats::new();

        run(&mut codec, &mut line, &mut buf, &mut stats, 12);
        assert!(codec.in_frame());
        codec.reset();
        assert!(!codec.in_frame());
    }
}
