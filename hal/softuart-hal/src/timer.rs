//! Periodic tick timer abstraction
//!
//! The software serial port is clocked by a periodic interrupt running at
//! three times the baud rate. The port computes the period; the timer only
//! has to program it and start calling the tick handler.

/// Range of periods a timer can be programmed with, in timer-clock cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerLimits {
    /// Shortest usable period
    ///
    /// Besides the counter width this must leave room for the tick handler
    /// itself to run between two interrupts.
    pub min_period: u32,
    /// Longest period the counter can express
    pub max_period: u32,
}

impl TimerLimits {
    /// Limits for a counter of `bits` width with a given minimum period
    pub const fn for_counter(bits: u32, min_period: u32) -> Self {
        let max_period = if bits >= 32 {
            u32::MAX
        } else {
            (1u32 << bits) - 1
        };
        Self {
            min_period,
            max_period,
        }
    }

    /// Check if a period can be programmed
    pub const fn contains(&self, period: u32) -> bool {
        period >= self.min_period && period <= self.max_period
    }
}

/// Periodic interrupt source driving the oversample tick
///
/// Implementations arrange for the port's tick handler to be invoked once
/// per period after [`TickTimer::start`], and never after
/// [`TickTimer::stop`]. Only one port may be driven by a given timer.
pub trait TickTimer {
    /// Frequency of the clock feeding the counter (after any prescaler), in Hz
    fn clock_hz(&self) -> u32;

    /// Programmable period range
    fn limits(&self) -> TimerLimits;

    /// Program the period (in timer-clock cycles), reset the counter and
    /// enable the periodic interrupt
    fn start(&mut self, period: u32);

    /// Disable the periodic interrupt and clear the programmed period
    fn stop(&mut self);
}
