//! Byte-stream serial traits
//!
//! A buffered serial port exposes two non-blocking primitives per
//! direction: move what fits now, and report whether the transmitter has
//! drained. The blocking operations are provided on top of them by
//! spinning, which is only sound while something else (an interrupt) keeps
//! moving bytes between the buffers and the wire.

use core::hint::spin_loop;

/// Serial transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Queue as much of `data` as fits right now
    ///
    /// Returns the number of bytes taken, which may be zero.
    fn write_some(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Check if every queued byte has left the transmitter
    fn tx_idle(&mut self) -> Result<bool, Self::Error>;

    /// Queue all of `data`, spinning while the transmitter is backed up
    fn write_blocking(&mut self, mut data: &[u8]) -> Result<(), Self::Error> {
        while !data.is_empty() {
            let n = self.write_some(data)?;
            if n == 0 {
                spin_loop();
            }
            data = &data[n..];
        }
        Ok(())
    }

    /// Spin until the transmitter has drained
    fn flush(&mut self) -> Result<(), Self::Error> {
        while !self.tx_idle()? {
            spin_loop();
        }
        Ok(())
    }
}

/// Serial receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Move already received bytes into `buf`
    ///
    /// Returns the number of bytes stored, which may be zero.
    fn read_some(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Fill all of `buf`, spinning until enough bytes have arrived
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read_some(&mut buf[filled..])?;
            if n == 0 {
                spin_loop();
            }
            filled += n;
        }
        Ok(filled)
    }

    /// Spin until one byte arrives
    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.read_blocking(&mut buf)?;
        Ok(buf[0])
    }
}
