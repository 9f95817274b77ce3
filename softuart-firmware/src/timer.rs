//! SysTick as the oversample tick source
//!
//! The counter reloads every `period` core-clock cycles and raises the
//! `SysTick` exception, whose handler forwards to the port's
//! [`TimerBinding`](softuart_core::TimerBinding).

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;
use softuart_hal::{TickTimer, TimerLimits};

/// Shortest reload the tick handler keeps up with at 125 MHz
const MIN_PERIOD: u32 = 1_000;

/// 24-bit SysTick counter clocked from the core clock
pub struct SysTickTimer {
    syst: SYST,
    clock_hz: u32,
}

impl SysTickTimer {
    pub fn new(mut syst: SYST, clock_hz: u32) -> Self {
        syst.disable_interrupt();
        syst.disable_counter();
        Self { syst, clock_hz }
    }
}

impl TickTimer for SysTickTimer {
    fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    fn limits(&self) -> TimerLimits {
        TimerLimits::for_counter(24, MIN_PERIOD)
    }

    fn start(&mut self, period: u32) {
        self.syst.disable_counter();
        self.syst.set_clock_source(SystClkSource::Core);
        // Counts reload..=0, so one period is reload + 1 cycles
        self.syst.set_reload(period - 1);
        self.syst.clear_current();
        self.syst.enable_interrupt();
        self.syst.enable_counter();
    }

    fn stop(&mut self) {
        self.syst.disable_interrupt();
        self.syst.disable_counter();
    }
}
