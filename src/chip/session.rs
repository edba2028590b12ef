//! ChipSession: owns the bus handle and the register image.
//!
//! Every register write updates the image first and then goes out as one
//! scoped `[addr, high, low]` transaction. Reads first select the target
//! address with a one-byte write, then pull 16-bit words; the chip advances
//! its register pointer after each word.

use crate::domain::RadioResult;
use crate::ports::{BusPort, Transaction};

use super::bank::RegisterBank;

pub struct ChipSession {
    bus: Box<dyn BusPort>,
    bank: RegisterBank,
}

impl ChipSession {
    pub fn new(bus: Box<dyn BusPort>) -> Self {
        Self {
            bus,
            bank: RegisterBank::new(),
        }
    }

    pub fn bank(&self) -> &RegisterBank {
        &self.bank
    }

    pub fn bank_mut(&mut self) -> &mut RegisterBank {
        &mut self.bank
    }

    /// Store `value` in the image, then write it to the chip.
    pub fn write_register(&mut self, addr: u8, value: u16) -> RadioResult<()> {
        self.bank.set(addr, value);
        self.save_register(addr)
    }

    /// Push the current image of `addr` to the chip.
    pub fn save_register(&mut self, addr: u8) -> RadioResult<()> {
        let value = self.bank.get(addr);
        log::debug!("REG 0x{addr:02X} <- 0x{value:04X}");
        self.write_bytes(&RegisterBank::encode_write(addr, value))
    }

    /// Point the chip's read pointer at `addr`
    pub fn select(&mut self, addr: u8) -> RadioResult<()> {
        self.write_bytes(&[addr])
    }

    /// Read one big-endian word at the chip's current read pointer.
    pub fn read16(&mut self) -> RadioResult<u16> {
        let mut tx = Transaction::begin(&mut *self.bus)?;
        let bytes = tx.read(2)?;
        Ok(RegisterBank::decode_word(&bytes))
    }

    /// Select `addr`, read it back and store it in the image.
    pub fn refresh(&mut self, addr: u8) -> RadioResult<u16> {
        self.select(addr)?;
        let value = self.read16()?;
        self.bank.set(addr, value);
        Ok(value)
    }

    /// Select `start` and read `count` consecutive registers inside a single
    /// transaction, storing each in the image.
    pub fn refresh_window(&mut self, start: u8, count: usize) -> RadioResult<()> {
        let mut tx = Transaction::begin(&mut *self.bus)?;
        tx.write(&[start])?;
        for offset in 0..count {
            let word = RegisterBank::decode_word(&tx.read(2)?);
            self.bank.set(start.wrapping_add(offset as u8), word);
        }
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> RadioResult<()> {
        let mut tx = Transaction::begin(&mut *self.bus)?;
        tx.write(data)
    }
}
