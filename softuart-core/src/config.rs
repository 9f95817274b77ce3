//! Port configuration and timer period derivation

use softuart_hal::TimerLimits;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::codec::OVERSAMPLE;
use crate::error::ConfigError;

/// Default baud rate
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Serial line configuration
///
/// Frame shape is fixed (8 data bits, no parity, 1 stop bit), so the baud
/// rate is the only knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SerialConfig {
    /// Baud rate in bits per second
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

impl SerialConfig {
    /// Create a configuration for a baud rate
    pub const fn new(baud_rate: u32) -> Self {
        Self { baud_rate }
    }

    /// Derive the tick timer period for this configuration
    pub fn timer_period(
        &self,
        clock_hz: u32,
        limits: TimerLimits,
    ) -> Result<TimerPeriod, ConfigError> {
        TimerPeriod::for_baud(clock_hz, self.baud_rate, limits)
    }
}

/// Oversample tick period in timer-clock cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerPeriod {
    cycles: u32,
}

impl TimerPeriod {
    /// Period for ticking at [`OVERSAMPLE`] times `baud_rate`
    ///
    /// `clock_hz / (3 × baud_rate)`, rounded to the nearest cycle and
    /// checked against the timer's limits.
    pub fn for_baud(
        clock_hz: u32,
        baud_rate: u32,
        limits: TimerLimits,
    ) -> Result<Self, ConfigError> {
        if baud_rate == 0 {
            return Err(ConfigError::ZeroBaudRate);
        }

        let tick_hz = baud_rate as u64 * OVERSAMPLE as u64;
        let cycles = (clock_hz as u64 + tick_hz / 2) / tick_hz;
        // clock_hz is a u32, so the quotient always fits
        let cycles = cycles as u32;

        // A zero period can never be programmed, whatever the timer claims
        if cycles == 0 || cycles < limits.min_period {
            return Err(ConfigError::PeriodTooShort {
                period: cycles,
                min: limits.min_period,
            });
        }
        if cycles > limits.max_period {
            return Err(ConfigError::PeriodTooLong {
                period: cycles,
                max: limits.max_period,
            });
        }

        Ok(Self { cycles })
    }

    /// Period in timer-clock cycles
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Baud rate actually produced by this period
    pub fn actual_baud(&self, clock_hz: u32) -> u32 {
        let bit_cycles = self.cycles as u64 * OVERSAMPLE as u64;
        ((clock_hz as u64 + bit_cycles / 2) / bit_cycles) as u32
    }

    /// Deviation of the produced baud rate from `baud_rate`, in tenths of a percent
    pub fn error_permille(&self, clock_hz: u32, baud_rate: u32) -> i32 {
        let actual = self.actual_baud(clock_hz) as i64;
        let wanted = baud_rate.max(1) as i64;
        ((actual - wanted) * 1000 / wanted) as i32
    }
}
