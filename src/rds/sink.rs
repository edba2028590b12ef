//! Where decoded frames and events go.
//!
//! The controller hands raw frames to a [`FrameSink`]; the decoder hands
//! validated values to per-event closures. [`RdsEvent`] plus a crossbeam
//! channel lets a consumer on another thread pick events up without sharing
//! the decoder.

use crossbeam_channel::{Receiver, Sender};

use super::RdsFrame;

/// Consumer of raw four-block frames read off the chip
pub trait FrameSink: Send {
    fn on_frame(&mut self, frame: RdsFrame);
}

impl<F> FrameSink for F
where
    F: FnMut(RdsFrame) + Send,
{
    fn on_frame(&mut self, frame: RdsFrame) {
        self(frame)
    }
}

/// A validated value published by the decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RdsEvent {
    /// Eight-character programme service name
    StationName(String),
    /// Complete (or reset) radio text message
    Text(String),
    /// Local clock time
    Time { hour: u8, minute: u8 },
}

/// Unbounded event channel for [`RdsDecoder::attach_channel`](super::RdsDecoder::attach_channel)
pub fn event_channel() -> (Sender<RdsEvent>, Receiver<RdsEvent>) {
    crossbeam_channel::unbounded()
}

/// Send an event, dropping it quietly once the receiver is gone.
pub(crate) fn forward(tx: &Sender<RdsEvent>, event: RdsEvent) {
    if let Err(e) = tx.send(event) {
        log::debug!("RDS event dropped, receiver gone: {:?}", e.into_inner());
    }
}
