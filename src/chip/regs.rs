//! RDA5807-class register map.
//!
//! Addresses and bit masks are the chip's wire contract and must match the
//! silicon exactly.

/// Number of 16-bit registers mirrored in the bank
pub const REGISTER_COUNT: usize = 16;

/// Default 7-bit I2C address for random register access
pub const I2C_ADDRESS: u8 = 0x11;

/// Chip id image written at setup
pub const CHIP_ID: u16 = 0x58;

pub const CHIPID: u8 = 0x00;

pub const CTRL: u8 = 0x02;
pub const CTRL_OUTPUT: u16 = 0x8000;
pub const CTRL_UNMUTE: u16 = 0x4000;
pub const CTRL_MONO: u16 = 0x2000;
pub const CTRL_BASS: u16 = 0x1000;
pub const CTRL_SEEKUP: u16 = 0x0200;
pub const CTRL_SEEK: u16 = 0x0100;
pub const CTRL_RDS: u16 = 0x0008;
pub const CTRL_NEW: u16 = 0x0004;
pub const CTRL_RESET: u16 = 0x0002;
pub const CTRL_ENABLE: u16 = 0x0001;

pub const CHAN: u8 = 0x03;
pub const CHAN_SPACE: u16 = 0x0003;
pub const CHAN_SPACE_100: u16 = 0x0000;
pub const CHAN_BAND: u16 = 0x000C;
pub const CHAN_BAND_FM: u16 = 0x0000;
pub const CHAN_BAND_FMWORLD: u16 = 0x0008;
pub const CHAN_TUNE: u16 = 0x0010;
pub const CHAN_NR: u16 = 0x7FC0;
pub const CHAN_NR_SHIFT: u16 = 6;

pub const R4: u8 = 0x04;
pub const R4_EM50: u16 = 0x0800;
pub const R4_SOFTMUTE: u16 = 0x0200;
pub const R4_AFC: u16 = 0x0100;

pub const VOL: u8 = 0x05;
pub const VOL_VOL: u16 = 0x000F;
/// Power-on VOL image: LNA/seek-threshold defaults with volume 1
pub const VOL_DEFAULT: u16 = 0x84D1;

pub const RA: u8 = 0x0A;
pub const RA_RDS: u16 = 0x8000;
pub const RA_STC: u16 = 0x4000;
pub const RA_SF: u16 = 0x2000;
pub const RA_RDSBLOCK: u16 = 0x0800;
pub const RA_STEREO: u16 = 0x0400;
pub const RA_NR: u16 = 0x03FF;

pub const RB: u8 = 0x0B;
pub const RB_FMTRUE: u16 = 0x0100;
pub const RB_FMREADY: u16 = 0x0080;
/// RSSI lives in the top six bits of RB
pub const RB_RSSI_SHIFT: u16 = 10;

pub const RDSA: u8 = 0x0C;
pub const RDSB: u8 = 0x0D;
pub const RDSC: u8 = 0x0E;
pub const RDSD: u8 = 0x0F;

/// Status registers read back in one sweep: RA, RB
pub const STATUS_WINDOW: usize = 2;

/// Writable configuration registers flushed on shutdown: CTRL..=0x06
pub const CONFIG_RANGE: std::ops::RangeInclusive<u8> = 0x02..=0x06;
