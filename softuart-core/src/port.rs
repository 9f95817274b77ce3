//! Port driver
//!
//! [`SoftUart`] owns the two lines, the tick timer, both ring buffers and
//! the codec state. Every method takes `&self`: a `&'static SoftUart` is
//! shared between the main flow and the timer interrupt, and all state is
//! reached through one critical-section mutex.
//!
//! # Blocking
//!
//! [`SoftUart::write`], [`SoftUart::read_until`] and
//! [`SoftUart::wait_tx_idle`] spin until the tick interrupt makes room or
//! delivers data. They must not be called from the tick handler or with
//! interrupts globally disabled, and `write` must not be called on a full
//! buffer before [`SoftUart::begin`]. The `*_with` variants accept a
//! [`WaitHook`] to bound the wait.

use core::cell::RefCell;
use core::ffi::CStr;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Vec;
use softuart_hal::{InputPin, OutputPin, TickTimer};

use crate::buffer::RingBuffer;
use crate::codec::LineStats;
use crate::config::{SerialConfig, TimerPeriod};
use crate::dispatch::{Tick, TickDispatcher};
use crate::error::{ConfigError, ReadUntilError, TimedOut};
use crate::wait::{Spin, WaitHook};

/// Default slot count of each ring buffer (one slot stays reserved)
pub const DEFAULT_BUFFER_SIZE: usize = 64;

struct PortState<RX, TX, T, const RXN: usize, const TXN: usize> {
    rx_line: RX,
    tx_line: TX,
    timer: T,
    rx_buf: RingBuffer<u8, RXN>,
    tx_buf: RingBuffer<u8, TXN>,
    dispatcher: TickDispatcher,
    stats: LineStats,
    /// Programmed tick period while running
    period: Option<TimerPeriod>,
}

/// Outcome of one poll in [`SoftUart::read_until_with`]
enum UntilStep {
    Empty,
    Byte(u8),
    Terminator,
    Full,
}

/// Bit-banged full-duplex serial port
///
/// `RXN`/`TXN` are the ring buffer slot counts; each buffer holds one
/// byte less than its slot count.
pub struct SoftUart<
    RX,
    TX,
    T,
    const RXN: usize = DEFAULT_BUFFER_SIZE,
    const TXN: usize = DEFAULT_BUFFER_SIZE,
> {
    state: Mutex<CriticalSectionRawMutex, RefCell<PortState<RX, TX, T, RXN, TXN>>>,
}

impl<RX, TX, T, const RXN: usize, const TXN: usize> SoftUart<RX, TX, T, RXN, TXN>
where
    RX: InputPin,
    TX: OutputPin,
    T: TickTimer,
{
    /// Create a stopped port on a receive line, a transmit line and a tick timer
    pub fn new(rx_line: RX, tx_line: TX, timer: T) -> Self {
        Self {
            state: Mutex::new(RefCell::new(PortState {
                rx_line,
                tx_line,
                timer,
                rx_buf: RingBuffer::new(0),
                tx_buf: RingBuffer::new(0),
                dispatcher: TickDispatcher::new(),
                stats: LineStats::new(),
                period: None,
            })),
        }
    }

    /// Run `f` on the port state inside a critical section
    fn with_state<R>(&self, f: impl FnOnce(&mut PortState<RX, TX, T, RXN, TXN>) -> R) -> R {
        self.state.lock(|cell| f(&mut cell.borrow_mut()))
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Open the port at `baud_rate`
    ///
    /// Drives TX high before switching it to output, switches RX to input,
    /// empties both buffers, resets the codecs and starts the tick timer at
    /// three times the baud rate. If the timer cannot produce the rate,
    /// nothing is touched and the error is returned.
    pub fn begin(&self, baud_rate: u32) -> Result<TimerPeriod, ConfigError> {
        self.begin_with(&SerialConfig::new(baud_rate))
    }

    /// Open the port with a full configuration
    pub fn begin_with(&self, config: &SerialConfig) -> Result<TimerPeriod, ConfigError> {
        let result = self.with_state(|s| {
            let period = config.timer_period(s.timer.clock_hz(), s.timer.limits())?;

            s.tx_line.set_high();
            s.tx_line.enable_output();
            s.rx_line.enable_input();

            s.tx_buf.reset();
            s.rx_buf.reset();
            s.dispatcher.reset();

            s.timer.start(period.cycles());
            s.period = Some(period);
            Ok(period)
        });

        #[cfg(feature = "defmt")]
        match &result {
            Ok(period) => defmt::info!(
                "softuart: {} baud, tick period {} cycles",
                config.baud_rate,
                period.cycles()
            ),
            Err(e) => defmt::warn!("softuart: cannot run at {} baud: {}", config.baud_rate, e),
        }

        result
    }

    /// Stop the tick timer
    ///
    /// Any frame in flight is abandoned and the lines stay at their last
    /// level. Buffered bytes are kept.
    pub fn end(&self) {
        self.with_state(|s| {
            s.timer.stop();
            s.dispatcher.reset();
            s.period = None;
        });

        #[cfg(feature = "defmt")]
        defmt::debug!("softuart: stopped");
    }

    /// Check if the tick timer is running
    pub fn is_running(&self) -> bool {
        self.with_state(|s| s.period.is_some())
    }

    /// Programmed tick period while running
    pub fn period(&self) -> Option<TimerPeriod> {
        self.with_state(|s| s.period)
    }

    /// Stop the port and give back the lines and the timer
    pub fn release(self) -> (RX, TX, T) {
        self.end();
        let state = self.state.into_inner().into_inner();
        (state.rx_line, state.tx_line, state.timer)
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Handle one oversample tick
    ///
    /// Called from the timer interrupt (usually through
    /// [`TimerBinding`](crate::TimerBinding)). Does nothing while stopped.
    pub fn tick(&self) {
        self.with_state(|s| {
            if s.period.is_none() {
                return;
            }
            s.dispatcher.on_tick(
                &mut s.tx_buf,
                &mut s.tx_line,
                &mut s.rx_buf,
                &mut s.rx_line,
                &mut s.stats,
            );
        });
    }

    // ========================================================================
    // Receive
    // ========================================================================

    /// Number of received bytes waiting to be read
    pub fn available(&self) -> usize {
        self.with_state(|s| s.rx_buf.len())
    }

    /// Take the oldest received byte, if any
    pub fn read(&self) -> Option<u8> {
        self.with_state(|s| s.rx_buf.pop())
    }

    /// Move up to `buf.len()` received bytes into `buf` without blocking
    pub fn read_available(&self, buf: &mut [u8]) -> usize {
        self.with_state(|s| {
            let mut n = 0;
            while n < buf.len() {
                match s.rx_buf.pop() {
                    Some(byte) => {
                        buf[n] = byte;
                        n += 1;
                    }
                    None => break,
                }
            }
            n
        })
    }

    /// Read bytes into `out` until `terminator` arrives
    ///
    /// Fails right away with [`ReadUntilError::NothingAvailable`] if no
    /// byte is buffered at call time; otherwise spins until the terminator
    /// is received. The terminator is consumed but not stored. Returns the
    /// number of bytes appended to `out`.
    pub fn read_until<const N: usize>(
        &self,
        out: &mut Vec<u8, N>,
        terminator: u8,
    ) -> Result<usize, ReadUntilError> {
        self.read_until_with(out, terminator, &mut Spin)
    }

    /// [`read_until`](Self::read_until) with a wait hook
    pub fn read_until_with<const N: usize, W: WaitHook>(
        &self,
        out: &mut Vec<u8, N>,
        terminator: u8,
        hook: &mut W,
    ) -> Result<usize, ReadUntilError> {
        if self.available() == 0 {
            return Err(ReadUntilError::NothingAvailable);
        }

        let mut len = 0;
        loop {
            let step = self.with_state(|s| match s.rx_buf.peek() {
                None => UntilStep::Empty,
                Some(byte) if byte == terminator => {
                    s.rx_buf.pop();
                    UntilStep::Terminator
                }
                Some(_) if out.is_full() => UntilStep::Full,
                Some(byte) => {
                    s.rx_buf.pop();
                    UntilStep::Byte(byte)
                }
            });

            match step {
                UntilStep::Terminator => return Ok(len),
                UntilStep::Full => return Err(ReadUntilError::Overflow { len }),
                UntilStep::Byte(byte) => {
                    // Capacity checked under the lock
                    let _ = out.push(byte);
                    len += 1;
                }
                UntilStep::Empty => {
                    if hook.wait().is_break() {
                        return Err(ReadUntilError::TimedOut { len });
                    }
                }
            }
        }
    }

    /// Discard all received bytes not yet read
    pub fn flush(&self) {
        self.with_state(|s| s.rx_buf.clear());
    }

    // ========================================================================
    // Transmit
    // ========================================================================

    /// Queue one byte without blocking
    ///
    /// Returns `false` if the TX buffer is full.
    pub fn try_write(&self, byte: u8) -> bool {
        self.with_state(|s| s.tx_buf.push(byte))
    }

    /// Queue as many bytes of `data` as fit without blocking
    pub fn try_write_bytes(&self, data: &[u8]) -> usize {
        self.with_state(|s| data.iter().take_while(|&&byte| s.tx_buf.push(byte)).count())
    }

    /// Queue one byte, spinning while the TX buffer is full
    ///
    /// The caller is throttled to the wire's transmission rate.
    pub fn write(&self, byte: u8) {
        // Spin never gives up
        let _ = self.write_with(byte, &mut Spin);
    }

    /// [`write`](Self::write) with a wait hook
    pub fn write_with<W: WaitHook>(&self, byte: u8, hook: &mut W) -> Result<(), TimedOut> {
        loop {
            if self.try_write(byte) {
                return Ok(());
            }
            if hook.wait().is_break() {
                return Err(TimedOut);
            }
        }
    }

    /// Queue every byte of `data` in order
    pub fn write_bytes(&self, data: &[u8]) {
        for &byte in data {
            self.write(byte);
        }
    }

    /// [`write_bytes`](Self::write_bytes) with a wait hook
    ///
    /// On timeout, the bytes before the failing one are already queued.
    pub fn write_bytes_with<W: WaitHook>(&self, data: &[u8], hook: &mut W) -> Result<(), TimedOut> {
        for &byte in data {
            self.write_with(byte, hook)?;
        }
        Ok(())
    }

    /// Queue a nul-terminated string, without the terminator
    pub fn write_cstr(&self, s: &CStr) {
        self.write_bytes(s.to_bytes());
    }

    /// Queue a string
    pub fn print(&self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    /// Queue a string followed by a newline
    pub fn println(&self, s: &str) {
        self.print(s);
        self.newline();
    }

    /// Queue a newline
    pub fn newline(&self) {
        self.write(b'\n');
    }

    /// Number of queued bytes, including the one on the wire
    pub fn tx_pending(&self) -> usize {
        self.with_state(|s| s.tx_buf.len())
    }

    /// Free space in the TX buffer
    pub fn tx_free(&self) -> usize {
        self.with_state(|s| s.tx_buf.free())
    }

    /// Spin until every queued byte has had its stop bit driven
    pub fn wait_tx_idle(&self) {
        // Spin never gives up
        let _ = self.wait_tx_idle_with(&mut Spin);
    }

    /// [`wait_tx_idle`](Self::wait_tx_idle) with a wait hook
    pub fn wait_tx_idle_with<W: WaitHook>(&self, hook: &mut W) -> Result<(), TimedOut> {
        while self.tx_pending() != 0 {
            if hook.wait().is_break() {
                return Err(TimedOut);
            }
        }
        Ok(())
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Line condition counters since `new` or the last [`clear_stats`](Self::clear_stats)
    pub fn stats(&self) -> LineStats {
        self.with_state(|s| s.stats)
    }

    /// Reset the line condition counters
    pub fn clear_stats(&self) {
        self.with_state(|s| s.stats = LineStats::new());
    }
}

impl<RX, TX, T, const RXN: usize, const TXN: usize> Tick for SoftUart<RX, TX, T, RXN, TXN>
where
    RX: InputPin + Send,
    TX: OutputPin + Send,
    T: TickTimer + Send,
{
    fn tick(&self) {
        SoftUart::tick(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use core::ops::ControlFlow;

    use softuart_hal::TimerLimits;

    struct Line {
        high: bool,
        output: bool,
        input: bool,
    }

    impl Line {
        fn new() -> Self {
            Self {
                high: false,
                output: false,
                input: false,
            }
        }
    }

    impl OutputPin for Line {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }

        fn enable_output(&mut self) {
            // Must already be high when switched to output
            assert!(self.high);
            self.output = true;
        }
    }

    impl InputPin for Line {
        fn is_high(&mut self) -> bool {
            self.high
        }

        fn enable_input(&mut self) {
            self.input = true;
        }
    }

    #[derive(Default)]
    struct Timer {
        period: Option<u32>,
        starts: u32,
    }

    impl TickTimer for Timer {
        fn clock_hz(&self) -> u32 {
            2_000_000
        }

        fn limits(&self) -> TimerLimits {
            TimerLimits::for_counter(8, 8)
        }

        fn start(&mut self, period: u32) {
            self.period = Some(period);
            self.starts += 1;
        }

        fn stop(&mut self) {
            self.period = None;
        }
    }

    type TestPort = SoftUart<Line, Line, Timer, 8, 8>;

    fn port() -> TestPort {
        let mut rx = Line::new();
        rx.high = true;
        SoftUart::new(rx, Line::new(), Timer::default())
    }

    #[test]
    fn test_begin_configures_lines_and_timer() {
        let port = port();
        let period = port.begin(9600).unwrap();
        assert_eq!(period.cycles(), 69);
        assert!(port.is_running());

        let (rx, tx, timer) = port.release();
        assert!(rx.input);
        assert!(tx.output && tx.high);
        // release stops the timer
        assert_eq!(timer.period, None);
        assert_eq!(timer.starts, 1);
    }

    #[test]
    fn test_begin_rejects_unachievable_baud() {
        let port = port();
        assert_eq!(
            port.begin(115_200),
            Err(ConfigError::PeriodTooShort { period: 6, min: 8 })
        );
        assert!(!port.is_running());

        let (rx, tx, timer) = port.release();
        assert!(!rx.input);
        assert!(!tx.output);
        assert_eq!(timer.starts, 0);
    }

    #[test]
    fn test_tick_is_noop_while_stopped() {
        let port = port();
        assert!(port.try_write(0x00));
        for _ in 0..100 {
            port.tick();
        }
        assert_eq!(port.tx_pending(), 1);
        assert_eq!(port.stats(), LineStats::new());
    }

    #[test]
    fn test_end_keeps_buffers() {
        let port = port();
        port.begin(9600).unwrap();
        port.try_write(b'x');
        port.end();

        assert!(!port.is_running());
        assert_eq!(port.period(), None);
        assert_eq!(port.tx_pending(), 1);
    }

    #[test]
    fn test_begin_resets_buffers() {
        let port = port();
        port.try_write(b'x');
        port.begin(9600).unwrap();
        assert_eq!(port.tx_pending(), 0);
    }

    #[test]
    fn test_try_write_respects_capacity() {
        let port = port();
        assert_eq!(port.try_write_bytes(b"0123456789"), 7);
        assert_eq!(port.tx_free(), 0);
        assert!(!port.try_write(b'x'));
    }

    #[test]
    fn test_write_with_times_out_when_stalled() {
        let port = port();
        port.try_write_bytes(&[0; 7]);
        let polls = Cell::new(0);
        let result = port.write_with(1, &mut || {
            polls.set(polls.get() + 1);
            if polls.get() < 5 {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        });
        assert_eq!(result, Err(TimedOut));
        assert_eq!(polls.get(), 5);
    }

    #[test]
    fn test_read_until_nothing_available() {
        let port = port();
        let mut out: Vec<u8, 8> = Vec::new();
        assert_eq!(
            port.read_until(&mut out, b'\n'),
            Err(ReadUntilError::NothingAvailable)
        );
    }

    #[test]
    fn test_clear_stats() {
        let port = port();
        port.with_state(|s| s.stats.overruns = 3);
        assert!(port.stats().has_errors());
        port.clear_stats();
        assert_eq!(port.stats(), LineStats::new());
    }
}
