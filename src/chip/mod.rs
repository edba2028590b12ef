//! RDA5807-class receiver chip layer.
//!
//! This module separates the concerns of talking to the chip:
//! - `regs`: register addresses and bit masks (the wire contract)
//! - `bank`: in-memory register image and word encoding (pure, no I/O)
//! - `session`: own the bus, keep the image and the chip in step
//! - `controller`: tuning, seek, audio settings and RDS polling
//!
//! The bank is pure so it can be tested without any bus at all.

pub mod bank;
pub mod controller;
pub mod regs;
pub mod session;

pub use bank::RegisterBank;
pub use controller::RadioController;
pub use session::ChipSession;
