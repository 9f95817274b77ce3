//! Softuart Hardware Abstraction Layer
//!
//! This crate defines the traits the software serial port needs from the
//! chip it runs on. The port itself never touches registers: it drives one
//! output line, samples one input line, and asks a periodic timer to call
//! it back at three times the baud rate.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (softuart-firmware, etc.)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  softuart-core (codecs, buffers, port)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  softuart-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  GPIO lines   │       │ periodic timer│
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Single-bit digital lines
//! - [`timer::TickTimer`] - Periodic oversample interrupt source
//! - [`uart::UartTx`], [`uart::UartRx`] - Buffered byte-stream serial

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod timer;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, OutputPin};
pub use timer::{TickTimer, TimerLimits};
pub use uart::{UartRx, UartTx};
