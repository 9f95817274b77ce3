//! Error types
//!
//! The port has very few failure modes. Backpressure is not an error (the
//! caller blocks), and line conditions such as overruns are counted in
//! [`LineStats`](crate::LineStats) rather than reported per byte.

/// Baud rate cannot be produced by the tick timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Baud rate of zero
    ZeroBaudRate,
    /// Derived period is shorter than the timer (or tick handler) allows
    PeriodTooShort {
        /// Derived period in timer-clock cycles
        period: u32,
        /// Shortest period the timer accepts
        min: u32,
    },
    /// Derived period does not fit the timer's counter
    PeriodTooLong {
        /// Derived period in timer-clock cycles
        period: u32,
        /// Longest period the timer accepts
        max: u32,
    },
}

/// Failure of a terminator-delimited read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadUntilError {
    /// Nothing was buffered when the read started
    NothingAvailable,
    /// Output buffer filled up before the terminator arrived
    ///
    /// The byte that did not fit is left unread in the RX buffer.
    Overflow {
        /// Bytes stored by this call
        len: usize,
    },
    /// The wait hook gave up before the terminator arrived
    TimedOut {
        /// Bytes stored by this call
        len: usize,
    },
}

/// A wait hook gave up on a blocking operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimedOut;

/// Failure to attach a port to a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BindError {
    /// The timer already drives a port
    AlreadyBound,
}
