//! Softuart - software serial demo firmware
//!
//! Bit-bangs a 8N1 serial port on two GPIOs of an RP2040, clocked from
//! the SysTick exception at three times the baud rate. Prints a banner,
//! then a timestamped ping line every interval, and echoes whatever it
//! receives.
//!
//! Wiring: RX on GPIO 5 (pulled up), TX on GPIO 4.

#![no_std]
#![no_main]

use core::fmt::Write;

use cortex_m_rt::exception;
use defmt::{error, info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_time::{Duration, Instant, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use softuart_core::{EhInput, EhOutput, LineStats, SoftUart, TimerBinding};

use crate::config::{BANNER, BAUD_RATE, PING_INTERVAL_MS};
use crate::timer::SysTickTimer;

mod config;
mod timer;

type Port = SoftUart<EhInput<Input<'static>>, EhOutput<Output<'static>>, SysTickTimer>;

/// The port must outlive the SysTick handler that drives it
static PORT: StaticCell<Port> = StaticCell::new();

/// SysTick -> port
static SYSTICK: TimerBinding = TimerBinding::new();

/// How often the main loop drains the RX buffer
const POLL_INTERVAL: Duration = Duration::from_micros(200);

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Softuart firmware starting...");

    let p = embassy_rp::init(Default::default());
    let core = unwrap!(cortex_m::Peripherals::take());
    let clock_hz = embassy_rp::clocks::clk_sys_freq();
    info!("Core clock: {} Hz", clock_hz);

    let rx = EhInput::new(Input::new(p.PIN_5, Pull::Up));
    let tx = EhOutput::new(Output::new(p.PIN_4, Level::High), true);
    let timer = SysTickTimer::new(core.SYST, clock_hz);

    let port: &'static Port = PORT.init(SoftUart::new(rx, tx, timer));
    unwrap!(SYSTICK.bind(port));

    match port.begin(BAUD_RATE) {
        Ok(period) => info!(
            "Port open at {} baud (tick {} cycles, {} permille off)",
            BAUD_RATE,
            period.cycles(),
            period.error_permille(clock_hz, BAUD_RATE)
        ),
        Err(e) => {
            error!("Cannot open port at {} baud: {}", BAUD_RATE, e);
            return;
        }
    }

    port.println(BANNER);

    let ping_interval = Duration::from_millis(PING_INTERVAL_MS);
    let mut next_ping = Instant::now() + ping_interval;
    let mut last_stats = LineStats::new();
    let mut out = port;

    loop {
        let now = Instant::now();
        if now >= next_ping {
            // Formatting into the port cannot fail
            let _ = write!(out, "\n[{}]: Ping...\n", now.as_millis());
            next_ping += ping_interval;
        }

        while let Some(byte) = port.read() {
            port.write(byte);
        }

        let stats = port.stats();
        if stats.overruns != last_stats.overruns
            || stats.framing_errors != last_stats.framing_errors
            || stats.glitches != last_stats.glitches
        {
            warn!(
                "Line errors: {} overruns, {} framing, {} glitches",
                stats.overruns, stats.framing_errors, stats.glitches
            );
        }
        last_stats = stats;

        Timer::after(POLL_INTERVAL).await;
    }
}

#[exception]
fn SysTick() {
    SYSTICK.fire();
}
