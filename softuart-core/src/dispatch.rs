//! Tick dispatch
//!
//! [`TickDispatcher`] is the per-tick body of the timer interrupt: it runs
//! the TX codec, then the RX codec, every time. [`TimerBinding`] connects
//! one hardware timer's interrupt handler to one port.
//!
//! ```text
//!  timer ISR ──► TimerBinding::fire ──► port.tick() ──► TickDispatcher::on_tick
//!                                                          ├─► TxCodec::step
//!                                                          └─► RxCodec::step
//! ```

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use softuart_hal::{InputPin, OutputPin};

use crate::buffer::RingBuffer;
use crate::codec::{LineStats, RxCodec, TxCodec};
use crate::error::BindError;

/// Something a periodic timer can drive
///
/// `tick` runs in interrupt context: it must be bounded, must not block
/// and must not allocate.
pub trait Tick: Sync {
    /// Handle one oversample tick
    fn tick(&self);
}

/// Persistent per-tick state of one port: the two codecs
#[derive(Debug, Clone, Default)]
pub struct TickDispatcher {
    tx: TxCodec,
    rx: RxCodec,
}

impl TickDispatcher {
    /// Create a dispatcher with both codecs idle
    pub const fn new() -> Self {
        Self {
            tx: TxCodec::new(),
            rx: RxCodec::new(),
        }
    }

    /// Return both codecs to their idle positions
    pub fn reset(&mut self) {
        self.tx.reset();
        self.rx.reset();
    }

    /// Transmit codec
    pub fn tx(&self) -> &TxCodec {
        &self.tx
    }

    /// Receive codec
    pub fn rx(&self) -> &RxCodec {
        &self.rx
    }

    /// Run one oversample tick: TX first, then RX
    pub fn on_tick<O, I, const TXN: usize, const RXN: usize>(
        &mut self,
        tx_buf: &mut RingBuffer<u8, TXN>,
        tx_line: &mut O,
        rx_buf: &mut RingBuffer<u8, RXN>,
        rx_line: &mut I,
        stats: &mut LineStats,
    ) where
        O: OutputPin,
        I: InputPin,
    {
        if self.tx.step(tx_buf, tx_line).is_some() {
            stats.tx_frames = stats.tx_frames.wrapping_add(1);
        }
        self.rx.step(rx_line, rx_buf, stats);
    }
}

/// Connects one hardware timer interrupt to one port
///
/// Declare one binding per timer as a `static`, bind the port after it is
/// created, and call [`TimerBinding::fire`] from the timer's interrupt
/// handler. A timer can drive only one port at a time.
pub struct TimerBinding {
    slot: Mutex<CriticalSectionRawMutex, Cell<Option<&'static dyn Tick>>>,
}

impl Default for TimerBinding {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerBinding {
    /// Create an unbound slot
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Cell::new(None)),
        }
    }

    /// Attach a port to this timer
    pub fn bind(&self, port: &'static dyn Tick) -> Result<(), BindError> {
        self.slot.lock(|slot| {
            if slot.get().is_some() {
                return Err(BindError::AlreadyBound);
            }
            slot.set(Some(port));
            Ok(())
        })
    }

    /// Detach the current port, if any
    pub fn unbind(&self) {
        self.slot.lock(|slot| slot.set(None));
    }

    /// Check if a port is attached
    pub fn is_bound(&self) -> bool {
        self.slot.lock(|slot| slot.get().is_some())
    }

    /// Forward one timer interrupt to the bound port
    ///
    /// Does nothing while unbound.
    pub fn fire(&self) {
        if let Some(port) = self.slot.lock(|slot| slot.get()) {
            port.tick();
        }
    }
}
