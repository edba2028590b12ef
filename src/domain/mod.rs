//! Core domain types
//!
//! Pure types with no I/O dependencies. These represent the core concepts
//! of the receiver: band plan, tuning state, status snapshots and config.

pub mod config;
pub mod error;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::*;
