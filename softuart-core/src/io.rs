//! Trait integrations for a shared port reference
//!
//! Implemented on `&SoftUart` so a `&'static` port can be handed to
//! `embedded-io` consumers, `core::fmt` formatting and the blocking
//! `softuart-hal` serial traits alike. Reads block until at least one
//! byte is available; writes block until at least one byte is queued.

use core::convert::Infallible;
use core::fmt;

use softuart_hal::{InputPin, OutputPin, TickTimer, UartRx, UartTx};

use crate::port::SoftUart;

impl<RX, TX, T, const RXN: usize, const TXN: usize> embedded_io::ErrorType
    for &SoftUart<RX, TX, T, RXN, TXN>
where
    RX: InputPin,
    TX: OutputPin,
    T: TickTimer,
{
    type Error = Infallible;
}

impl<RX, TX, T, const RXN: usize, const TXN: usize> embedded_io::Read
    for &SoftUart<RX, TX, T, RXN, TXN>
where
    RX: InputPin,
    TX: OutputPin,
    T: TickTimer,
{
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            let n = self.read_available(buf);
            if n != 0 {
                return Ok(n);
            }
            core::hint::spin_loop();
        }
    }
}

impl<RX, TX, T, const RXN: usize, const TXN: usize> embedded_io::ReadReady
    for &SoftUart<RX, TX, T, RXN, TXN>
where
    RX: InputPin,
    TX: OutputPin,
    T: TickTimer,
{
    fn read_ready(&mut self) -> Result<bool, Infallible> {
        Ok(self.available() != 0)
    }
}

impl<RX, TX, T, const RXN: usize, const TXN: usize> embedded_io::Write
    for &SoftUart<RX, TX, T, RXN, TXN>
where
    RX: InputPin,
    TX: OutputPin,
    T: TickTimer,
{
    fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            let n = self.try_write_bytes(buf);
            if n != 0 {
                return Ok(n);
            }
            core::hint::spin_loop();
        }
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        self.wait_tx_idle();
        Ok(())
    }
}

impl<RX, TX, T, const RXN: usize, const TXN: usize> embedded_io::WriteReady
    for &SoftUart<RX, TX, T, RXN, TXN>
where
    RX: InputPin,
    TX: OutputPin,
    T: TickTimer,
{
    fn write_ready(&mut self) -> Result<bool, Infallible> {
        Ok(self.tx_free() != 0)
    }
}

impl<RX, TX, T, const RXN: usize, const TXN: usize> fmt::Write for &SoftUart<RX, TX, T, RXN, TXN>
where
    RX: InputPin,
    TX: OutputPin,
    T: TickTimer,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.print(s);
        Ok(())
    }
}

impl<RX, TX, T, const RXN: usize, const TXN: usize> UartTx for &SoftUart<RX, TX, T, RXN, TXN>
where
    RX: InputPin,
    TX: OutputPin,
    T: TickTimer,
{
    type Error = Infallible;

    fn write_some(&mut self, data: &[u8]) -> Result<usize, Infallible> {
        Ok(self.try_write_bytes(data))
    }

    fn tx_idle(&mut self) -> Result<bool, Infallible> {
        Ok(self.tx_pending() == 0)
    }
}

impl<RX, TX, T, const RXN: usize, const TXN: usize> UartRx for &SoftUart<RX, TX, T, RXN, TXN>
where
    RX: InputPin,
    TX: OutputPin,
    T: TickTimer,
{
    type Error = Infallible;

    fn read_some(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
        Ok(self.read_available(buf))
    }
}
