//! RDA5807-class FM receiver driver with an RDS decoder.
//!
//! Tunes, seeks and configures the receiver over a register bus, watches
//! signal strength, and turns raw RDS groups into station name, radio text
//! and clock time.
//!
//! ## Architecture (Hexagonal / Ports & Adapters)
//!
//! - `domain/` - Pure domain types, config and errors, no I/O
//! - `ports/` - Trait definitions for the bus and the delay source
//! - `chip/` - Register map, register image and the radio controller
//! - `rds/` - RDS frame parsing and decoding (pure, no I/O)
//! - `adapters/` - Implementations of ports (embedded-hal I2C, mock chip, delays)

// Core domain (pure, no I/O)
pub mod domain;
pub mod ports;
pub mod rds;

// Chip driver
pub mod chip;

// Adapters (external I/O)
pub mod adapters;

pub use chip::RadioController;
pub use domain::{Band, RadioConfig, RadioError, RadioResult, RadioStatus, TuneState};
pub use rds::{RdsDecoder, RdsEvent, RdsFrame};
