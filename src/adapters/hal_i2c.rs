//! `BusPort` over any `embedded_hal::i2c::I2c` implementation.
//!
//! Each `write`/`read` is a complete I2C transfer to the chip's random
//! access address, so `begin`/`end` only track that the session is claimed.

use embedded_hal::i2c::{Error as _, I2c};

use crate::chip::regs::I2C_ADDRESS;
use crate::domain::{RadioError, RadioResult};
use crate::ports::BusPort;

pub struct HalI2cBus<I2C> {
    i2c: I2C,
    address: u8,
    claimed: bool,
}

impl<I2C: I2c> HalI2cBus<I2C> {
    /// Wrap `i2c`, talking to the chip at its default address (0x11)
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, I2C_ADDRESS)
    }

    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            claimed: false,
        }
    }

    /// Give the underlying bus back
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c + Send> BusPort for HalI2cBus<I2C> {
    fn begin(&mut self) -> RadioResult<()> {
        if self.claimed {
            return Err(RadioError::Transport(format!(
                "I2C device 0x{:02X} already in a transaction",
                self.address
            )));
        }
        self.claimed = true;
        Ok(())
    }

    fn end(&mut self) {
        self.claimed = false;
    }

    fn write(&mut self, data: &[u8]) -> RadioResult<()> {
        self.i2c.write(self.address, data).map_err(|e| {
            RadioError::Transport(format!(
                "I2C write to 0x{:02X} failed: {:?}",
                self.address,
                e.kind()
            ))
        })
    }

    fn read(&mut self, n: usize) -> RadioResult<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.i2c.read(self.address, &mut buf).map_err(|e| {
            RadioError::Transport(format!(
                "I2C read from 0x{:02X} failed: {:?}",
                self.address,
                e.kind()
            ))
        })?;
        Ok(buf)
    }
}
