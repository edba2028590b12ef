//! Pure RDS frame parsing: block layout and group type decoding.

use std::fmt;

/// One RDS group as read from the chip: four 16-bit blocks.
///
/// A frame whose first block is zero is not data; it tells the decoder to
/// drop everything it has accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RdsFrame {
    pub block1: u16,
    pub block2: u16,
    pub block3: u16,
    pub block4: u16,
}

impl RdsFrame {
    pub fn new(block1: u16, block2: u16, block3: u16, block4: u16) -> Self {
        Self {
            block1,
            block2,
            block3,
            block4,
        }
    }

    pub fn is_reset(&self) -> bool {
        self.block1 == 0
    }

    pub fn group_type(&self) -> GroupType {
        GroupType::from_block2(self.block2)
    }

    /// Traffic programme flag (block 2, bit 10)
    pub fn traffic_programme(&self) -> bool {
        self.block2 & 0x0400 != 0
    }

    /// Programme type code (block 2, bits 9..5)
    pub fn programme_type(&self) -> u8 {
        ((self.block2 >> 5) & 0x1F) as u8
    }
}

/// Group code packed as `0xGV`: group number in the high nibble, `A` (0xA)
/// or `B` (0xB) in the low nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupType(pub u8);

impl GroupType {
    /// 0B: programme service (station) name
    pub const STATION_NAME: Self = Self(0x0B);
    /// 2A: radio text
    pub const RADIO_TEXT: Self = Self(0x2A);
    /// 4A: clock time and date
    pub const CLOCK_TIME: Self = Self(0x4A);

    pub fn from_block2(block2: u16) -> Self {
        let group = ((block2 & 0xF000) >> 8) as u8;
        let version = ((block2 & 0x0800) >> 11) as u8;
        Self(0x0A | group | version)
    }

    pub fn group(self) -> u8 {
        self.0 >> 4
    }

    pub fn is_version_b(self) -> bool {
        self.0 & 0x01 != 0
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version = if self.is_version_b() { 'B' } else { 'A' };
        write!(f, "{}{version}", self.group())
    }
}
