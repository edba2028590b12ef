//! Radio Data System decoding
//!
//! - `frame`: four-block frame layout and group type (pure, no state)
//! - `decoder`: `RdsDecoder`, the validating state machine
//! - `sink`: frame/event sink traits and the crossbeam event channel

pub mod decoder;
pub mod frame;
pub mod sink;

pub use decoder::RdsDecoder;
pub use frame::{GroupType, RdsFrame};
pub use sink::{event_channel, FrameSink, RdsEvent};
