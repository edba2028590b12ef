//! Register bus port
//!
//! The receiver sits behind a byte-oriented serial bus. Every exchange is a
//! scoped session: `begin()`, one or more transfers, `end()`. The
//! [`Transaction`] guard makes the `end()` unconditional, so a failed
//! transfer never leaves the bus claimed.

use crate::domain::RadioResult;

/// Byte transport to the receiver chip.
///
/// Implementations report any I/O fault as `RadioError::Transport`; callers
/// never retry.
pub trait BusPort: Send {
    /// Claim the bus for a transaction
    fn begin(&mut self) -> RadioResult<()>;

    /// Release the bus. Called exactly once per successful `begin()`.
    fn end(&mut self);

    /// Write raw bytes to the device
    fn write(&mut self, data: &[u8]) -> RadioResult<()>;

    /// Read exactly `n` bytes from the device
    fn read(&mut self, n: usize) -> RadioResult<Vec<u8>>;
}

/// An open bus session. Dropping it releases the bus.
pub struct Transaction<'a, B: BusPort + ?Sized> {
    bus: &'a mut B,
}

impl<'a, B: BusPort + ?Sized> Transaction<'a, B> {
    pub fn begin(bus: &'a mut B) -> RadioResult<Self> {
        bus.begin()?;
        Ok(Self { bus })
    }

    pub fn write(&mut self, data: &[u8]) -> RadioResult<()> {
        log::trace!("bus TX: {data:02X?}");
        self.bus.write(data)
    }

    pub fn read(&mut self, n: usize) -> RadioResult<Vec<u8>> {
        let bytes = self.bus.read(n)?;
        log::trace!("bus RX: {bytes:02X?}");
        Ok(bytes)
    }
}

impl<B: BusPort + ?Sized> Drop for Transaction<'_, B> {
    fn drop(&mut self) {
        self.bus.end();
    }
}
