//! Simulated hardware for port tests
//!
//! Lines are shared atomics so a port can also be leaked into a `'static`
//! timer binding.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use softuart_core::SoftUart;
use softuart_hal::{InputPin, OutputPin, TickTimer, TimerLimits};

/// 16 MHz part with the timer behind a /8 prescaler
pub const TIMER_HZ: u32 = 2_000_000;

/// Ticks per frame
pub const FRAME_TICKS: usize = 30;

/// A single electrical line, idle high
#[derive(Clone)]
pub struct Wire(Arc<AtomicBool>);

impl Wire {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn level(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, high: bool) {
        self.0.store(high, Ordering::Relaxed);
    }
}

pub struct TxPin {
    wire: Wire,
    high: bool,
}

impl OutputPin for TxPin {
    fn set_high(&mut self) {
        self.high = true;
        self.wire.set(true);
    }

    fn set_low(&mut self) {
        self.high = false;
        self.wire.set(false);
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

pub struct RxPin {
    wire: Wire,
}

impl InputPin for RxPin {
    fn is_high(&mut self) -> bool {
        self.wire.level()
    }
}

/// Timer whose programmed period (0 = stopped) is visible to the test
pub struct SimTimer {
    period: Arc<AtomicU32>,
}

impl TickTimer for SimTimer {
    fn clock_hz(&self) -> u32 {
        TIMER_HZ
    }

    fn limits(&self) -> TimerLimits {
        TimerLimits::for_counter(8, 8)
    }

    fn start(&mut self, period: u32) {
        self.period.store(period, Ordering::Relaxed);
    }

    fn stop(&mut self) {
        self.period.store(0, Ordering::Relaxed);
    }
}

pub type SimPort = SoftUart<RxPin, TxPin, SimTimer>;

pub struct Sim {
    pub port: SimPort,
    /// Line driven by the port
    pub tx: Wire,
    /// Line sampled by the port
    pub rx: Wire,
    /// Programmed timer period, 0 while stopped
    pub period: Arc<AtomicU32>,
}

impl Sim {
    /// Port whose TX line is wired straight back into its RX line
    pub fn loopback() -> Self {
        let wire = Wire::new();
        Self::build(wire.clone(), wire)
    }

    /// Port with independent TX and RX lines
    pub fn split() -> Self {
        Self::build(Wire::new(), Wire::new())
    }

    fn build(tx: Wire, rx: Wire) -> Self {
        let period = Arc::new(AtomicU32::new(0));
        let port = SoftUart::new(
            RxPin { wire: rx.clone() },
            TxPin {
                wire: tx.clone(),
                high: false,
            },
            SimTimer {
                period: period.clone(),
            },
        );
        Self {
            port,
            tx,
            rx,
            period,
        }
    }

    pub fn ticks(&self, n: usize) {
        for _ in 0..n {
            self.port.tick();
        }
    }

    /// Drain everything received so far
    pub fn read_all(&self) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(byte) = self.port.read() {
            out.push(byte);
        }
        out
    }

    /// Drive one frame onto the RX line, ticking the port through it
    pub fn send_frame(&self, byte: u8) {
        let mut bits = [true; 10];
        bits[0] = false;
        for (i, bit) in bits[1..9].iter_mut().enumerate() {
            *bit = (byte >> i) & 1 != 0;
        }
        for level in bits {
            self.rx.set(level);
            self.ticks(3);
        }
    }
}
