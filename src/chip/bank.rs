//! In-memory register image plus the pure wire encoding.
//!
//! No I/O here. `ChipSession` pairs the bank with a bus and keeps the two in
//! step; the bank alone is trivially testable.

use super::regs::REGISTER_COUNT;

/// Mirror of the chip's sixteen 16-bit registers.
///
/// CTRL, CHAN, R4 and VOL cannot be read back from the chip, so their image
/// is authoritative. Status and RDS registers are only trusted after a fresh
/// read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterBank {
    regs: [u16; REGISTER_COUNT],
}

impl RegisterBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, addr: u8) -> u16 {
        self.regs[Self::index(addr)]
    }

    pub fn set(&mut self, addr: u8, value: u16) {
        self.regs[Self::index(addr)] = value;
    }

    /// Set or clear `mask` in the image, returning the new value
    pub fn set_bits(&mut self, addr: u8, mask: u16, on: bool) -> u16 {
        let slot = &mut self.regs[Self::index(addr)];
        if on {
            *slot |= mask;
        } else {
            *slot &= !mask;
        }
        *slot
    }

    /// Replace the bits under `mask` with `value & mask`
    pub fn replace_field(&mut self, addr: u8, mask: u16, value: u16) -> u16 {
        let slot = &mut self.regs[Self::index(addr)];
        *slot = (*slot & !mask) | (value & mask);
        *slot
    }

    /// Wire frame for a register write: `[addr, high, low]`
    pub fn encode_write(addr: u8, value: u16) -> [u8; 3] {
        let [hi, lo] = value.to_be_bytes();
        [addr, hi, lo]
    }

    /// Assemble a big-endian 16-bit word from a two-byte read.
    /// Missing bytes read as zero.
    pub fn decode_word(bytes: &[u8]) -> u16 {
        let hi = bytes.first().copied().unwrap_or(0);
        let lo = bytes.get(1).copied().unwrap_or(0);
        u16::from_be_bytes([hi, lo])
    }

    fn index(addr: u8) -> usize {
        usize::from(addr) % REGISTER_COUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::regs::*;

    #[test]
    fn encode_write_is_big_endian() {
        assert_eq!(RegisterBank::encode_write(VOL, 0x84D1), [0x05, 0x84, 0xD1]);
        assert_eq!(RegisterBank::encode_write(CTRL, 0x0001), [0x02, 0x00, 0x01]);
    }

    #[test]
    fn decode_word_assembles_high_then_low() {
        assert_eq!(RegisterBank::decode_word(&[0x12, 0x34]), 0x1234);
        assert_eq!(RegisterBank::decode_word(&[0xFF]), 0xFF00);
    }

    #[test]
    fn set_bits_is_idempotent() {
        let mut bank = RegisterBank::new();
        bank.set(CTRL, CTRL_UNMUTE | CTRL_ENABLE);
        assert_eq!(bank.set_bits(CTRL, CTRL_UNMUTE, false), CTRL_ENABLE);
        assert_eq!(bank.set_bits(CTRL, CTRL_UNMUTE, false), CTRL_ENABLE);
    }

    #[test]
    fn replace_field_preserves_other_bits() {
        let mut bank = RegisterBank::new();
        bank.set(VOL, VOL_DEFAULT);
        assert_eq!(bank.replace_field(VOL, VOL_VOL, 0x0F), 0x84DF);
        assert_eq!(bank.replace_field(VOL, VOL_VOL, 0x00), 0x84D0);
    }
}
