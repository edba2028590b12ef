//! Adapters (implementations of port traits)
//!
//! - `hal_i2c`: `BusPort` over any embedded-hal 1.0 I2C bus
//! - `mock_chip`: simulated receiver for development and tests
//! - `delay`: `DelayNs` backed by the OS clock, plus a recording variant

pub mod delay;
pub mod hal_i2c;
pub mod mock_chip;

pub use delay::{RecordingDelay, StdDelay};
pub use hal_i2c::HalI2cBus;
pub use mock_chip::MockChip;
