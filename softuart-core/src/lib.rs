//! Interrupt-driven software serial port
//!
//! This crate implements a full-duplex asynchronous serial port on two
//! plain GPIO lines, clocked by one periodic timer interrupt instead of a
//! UART peripheral:
//!
//! - Ring buffers decoupling application calls from the real-time engine
//! - TX frame codec (start bit, 8 data bits LSB first, stop bit)
//! - RX frame codec (start edge detection, centered sampling, stop bit)
//! - Tick dispatcher and timer binding for the interrupt handler
//! - Port driver with buffered read/write and begin/end lifecycle
//!
//! # Timing
//!
//! The timer fires at [`OVERSAMPLE`] times the baud rate. The TX codec
//! changes the output once every [`OVERSAMPLE`] ticks; the RX codec waits
//! four ticks after the start edge and then samples every third tick,
//! which lands each sample in the middle of its bit.
//!
//! # Concurrency
//!
//! Port state is shared between the main flow and the tick interrupt and
//! is only touched inside a critical section. Blocking calls spin with
//! interrupts enabled, so they must never be made from the tick handler
//! or while interrupts are globally disabled.

#![no_std]
#![deny(unsafe_code)]

pub mod buffer;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod io;
pub mod pins;
pub mod port;
pub mod wait;

pub use buffer::RingBuffer;
pub use codec::{LineStats, RxCodec, RxState, TxCodec, TxSlot, FRAME_BITS, OVERSAMPLE};
pub use config::{SerialConfig, TimerPeriod};
pub use dispatch::{Tick, TickDispatcher, TimerBinding};
pub use error::{BindError, ConfigError, ReadUntilError, TimedOut};
pub use pins::{EhInput, EhOutput};
pub use port::{SoftUart, DEFAULT_BUFFER_SIZE};
pub use wait::{Spin, SpinLimit, WaitHook};
