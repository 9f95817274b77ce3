//! GPIO line abstractions
//!
//! A software serial port needs exactly two lines: one it drives (TX) and
//! one it samples (RX). Implementations own the direction and data
//! registers of their pin.

/// Digital output line
///
/// Called from tick context, so every method must complete in bounded
/// time and must not block.
pub trait OutputPin {
    /// Drive the line high (logic 1, UART idle/mark)
    fn set_high(&mut self);

    /// Drive the line low (logic 0, UART space)
    fn set_low(&mut self);

    /// Drive the line to a specific level
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the line is currently driven high
    fn is_set_high(&self) -> bool;

    /// Switch the pin into output mode
    ///
    /// The port drives the line high *before* calling this so the wire
    /// never sees a spurious start bit. HALs that fix the direction in the
    /// type (most Rust HALs) can keep the default no-op.
    fn enable_output(&mut self) {}
}

/// Digital input line
pub trait InputPin {
    /// Check if the line reads high (logic 1)
    ///
    /// Takes `&mut self` because some HALs latch or synchronize the input
    /// register on read.
    fn is_high(&mut self) -> bool;

    /// Check if the line reads low (logic 0)
    fn is_low(&mut self) -> bool {
        !self.is_high()
    }

    /// Switch the pin into input mode
    fn enable_input(&mut self) {}
}
