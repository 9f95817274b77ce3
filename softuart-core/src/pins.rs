//! Adapters from `embedded-hal` digital pins to the port's line traits
//!
//! Only infallible pins are accepted: a pin error raised in tick context
//! has nowhere to go.

use core::convert::Infallible;

use embedded_hal::digital;
use softuart_hal::{InputPin, OutputPin};

/// TX line backed by an `embedded-hal` output pin
pub struct EhOutput<P> {
    pin: P,
    high: bool,
}

impl<P: digital::OutputPin<Error = Infallible>> EhOutput<P> {
    /// Wrap an output pin currently driving `high`
    ///
    /// The pin is not touched until the port drives it; `begin` presets
    /// it high.
    pub fn new(pin: P, high: bool) -> Self {
        Self { pin, high }
    }

    /// Unwrap the pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: digital::OutputPin<Error = Infallible>> OutputPin for EhOutput<P> {
    fn set_high(&mut self) {
        if let Err(e) = self.pin.set_high() {
            match e {}
        }
        self.high = true;
    }

    fn set_low(&mut self) {
        if let Err(e) = self.pin.set_low() {
            match e {}
        }
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// RX line backed by an `embedded-hal` input pin
pub struct EhInput<P> {
    pin: P,
}

impl<P: digital::InputPin<Error = Infallible>> EhInput<P> {
    /// Wrap an input pin
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Unwrap the pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: digital::InputPin<Error = Infallible>> InputPin for EhInput<P> {
    fn is_high(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(level) => level,
            Err(e) => match e {},
        }
    }
}
