//! Port traits (interfaces)
//!
//! These traits define the boundaries between the core driver and external I/O.
//! Adapters implement them to connect to real hardware or a simulated chip.
//!
//! Blocking waits use `embedded_hal::delay::DelayNs` directly as the delay port.

pub mod bus;

pub use bus::*;
pub use embedded_hal::delay::DelayNs;
