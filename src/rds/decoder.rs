//! RDS group decoder: turns raw four-block frames into station name,
//! radio text and clock time.
//!
//! Frames arrive noisy, repeated and out of order, so nothing is published
//! straight off the air:
//!
//! - Station name (group 0B) is built from four 2-character segments and
//!   only published once the same eight characters have been seen on two
//!   full passes.
//! - Radio text (group 2A) accumulates 4-character segments into a 64-char
//!   buffer. A flip of the A/B flag starts a new message; a segment index
//!   lower than the previous one means the message wrapped, so the buffer is
//!   published first.
//! - Clock time (group 4A) must roughly follow one of the last two accepted
//!   minutes before it is published.

use crossbeam_channel::Sender;

use super::sink::{forward, FrameSink, RdsEvent};
use super::{GroupType, RdsFrame};

const PS_LEN: usize = 8;

/// 64 characters of text plus slack past the last segment
const TEXT_LEN: usize = 66;

/// Trust window contents before any segment has been seen
const PS_UNSEEN: [u8; PS_LEN] = *b"--------";

const PS_BLANK: [u8; PS_LEN] = *b"        ";

const MINUTES_PER_DAY: i32 = 24 * 60;

type StringSink = Box<dyn FnMut(&str) + Send>;
type TimeSink = Box<dyn FnMut(u8, u8) + Send>;

/// Stateful RDS decoder with optional per-event sinks
pub struct RdsDecoder {
    /// Last segments seen off the air; a matching repeat promotes into `ps_candidate`
    ps_previous: [u8; PS_LEN],
    ps_candidate: [u8; PS_LEN],
    station_name: [u8; PS_LEN],

    text: [u8; TEXT_LEN],
    last_text_ab: Option<bool>,
    last_text_idx: usize,

    /// Two most recently accepted minute-of-day values, newest first
    last_minutes: [Option<u16>; 2],

    group_type: Option<GroupType>,
    traffic_programme: bool,
    programme_type: u8,

    on_station_name: Option<StringSink>,
    on_text: Option<StringSink>,
    on_time: Option<TimeSink>,
}

impl RdsDecoder {
    pub fn new() -> Self {
        Self {
            ps_previous: PS_UNSEEN,
            ps_candidate: PS_UNSEEN,
            station_name: PS_BLANK,
            text: [b' '; TEXT_LEN],
            last_text_ab: None,
            last_text_idx: 0,
            last_minutes: [None, None],
            group_type: None,
            traffic_programme: false,
            programme_type: 0,
            on_station_name: None,
            on_text: None,
            on_time: None,
        }
    }

    pub fn attach_station_name_sink(&mut self, sink: impl FnMut(&str) + Send + 'static) {
        self.on_station_name = Some(Box::new(sink));
    }

    /// Text reaches the sink with trailing blanks trimmed.
    pub fn attach_text_sink(&mut self, sink: impl FnMut(&str) + Send + 'static) {
        self.on_text = Some(Box::new(sink));
    }

    pub fn attach_time_sink(&mut self, sink: impl FnMut(u8, u8) + Send + 'static) {
        self.on_time = Some(Box::new(sink));
    }

    /// Route all three event kinds into `tx`, replacing any attached sinks.
    pub fn attach_channel(&mut self, tx: Sender<RdsEvent>) {
        let name_tx = tx.clone();
        self.attach_station_name_sink(move |name| {
            forward(&name_tx, RdsEvent::StationName(name.to_string()))
        });
        let text_tx = tx.clone();
        self.attach_text_sink(move |text| forward(&text_tx, RdsEvent::Text(text.to_string())));
        self.attach_time_sink(move |hour, minute| forward(&tx, RdsEvent::Time { hour, minute }));
    }

    pub fn has_station_name_sink(&self) -> bool {
        self.on_station_name.is_some()
    }

    pub fn has_text_sink(&self) -> bool {
        self.on_text.is_some()
    }

    pub fn has_time_sink(&self) -> bool {
        self.on_time.is_some()
    }

    /// Decode one frame given as its four blocks.
    pub fn process_data(&mut self, block1: u16, block2: u16, block3: u16, block4: u16) {
        self.process_frame(RdsFrame::new(block1, block2, block3, block4));
    }

    pub fn process_frame(&mut self, frame: RdsFrame) {
        if frame.is_reset() {
            self.reset();
            return;
        }

        let group = frame.group_type();
        self.group_type = Some(group);
        self.traffic_programme = frame.traffic_programme();
        self.programme_type = frame.programme_type();

        match group {
            GroupType::STATION_NAME => self.station_name_segment(&frame),
            GroupType::RADIO_TEXT => self.radio_text_segment(&frame),
            GroupType::CLOCK_TIME => self.clock_time(&frame),
            other => log::trace!("RDS group {other} ignored"),
        }
    }

    /// Drop all accumulated name and text state and announce the blank values.
    pub fn reset(&mut self) {
        log::debug!("RDS decoder reset");
        self.text = [b' '; TEXT_LEN];
        self.ps_previous = PS_UNSEEN;
        self.ps_candidate = PS_UNSEEN;
        self.station_name = PS_BLANK;
        self.last_text_idx = 0;

        if let Some(sink) = self.on_station_name.as_mut() {
            sink(&latin1(&PS_BLANK));
        }
        if let Some(sink) = self.on_text.as_mut() {
            sink("");
        }
    }

    /// Currently published station name (blank until confirmed)
    pub fn station_name(&self) -> String {
        latin1(&self.station_name)
    }

    /// Radio text accumulated so far, trailing blanks removed
    pub fn text(&self) -> String {
        latin1(&self.text).trim_end().to_string()
    }

    /// Last accepted clock time as `(hour, minute)`
    pub fn last_time(&self) -> Option<(u8, u8)> {
        self.last_minutes[0].map(split_minutes)
    }

    /// Group type of the most recent data frame
    pub fn group_type(&self) -> Option<GroupType> {
        self.group_type
    }

    pub fn traffic_programme(&self) -> bool {
        self.traffic_programme
    }

    pub fn programme_type(&self) -> u8 {
        self.programme_type
    }

    fn station_name_segment(&mut self, frame: &RdsFrame) {
        let idx = 2 * usize::from(frame.block2 & 0x0003);
        let pair = frame.block4.to_be_bytes().map(accept_char);
        let window = idx..idx + 2;

        if self.ps_previous[window.clone()] != pair {
            // Fresh trust window for this position
            self.ps_previous[window].copy_from_slice(&pair);
            return;
        }

        self.ps_candidate[window].copy_from_slice(&pair);
        if idx == 6 && self.ps_candidate == self.ps_previous && self.station_name != self.ps_candidate
        {
            self.station_name = self.ps_candidate;
            let name = latin1(&self.station_name);
            log::debug!("RDS station name: '{name}'");
            if let Some(sink) = self.on_station_name.as_mut() {
                sink(&name);
            }
        }
    }

    fn radio_text_segment(&mut self, frame: &RdsFrame) {
        let text_ab = frame.block2 & 0x0010 != 0;
        let idx = 4 * usize::from(frame.block2 & 0x000F);

        if idx < self.last_text_idx {
            if let Some(sink) = self.on_text.as_mut() {
                let text = latin1(&self.text).trim_end().to_string();
                log::debug!("RDS text: '{text}'");
                sink(&text);
            }
        }
        self.last_text_idx = idx;

        if self.last_text_ab != Some(text_ab) {
            self.last_text_ab = Some(text_ab);
            self.text = [b' '; TEXT_LEN];
        }

        let [c0, c1] = frame.block3.to_be_bytes();
        let [c2, c3] = frame.block4.to_be_bytes();
        for (slot, byte) in self.text[idx..idx + 4].iter_mut().zip([c0, c1, c2, c3]) {
            *slot = accept_char(byte);
        }
    }

    fn clock_time(&mut self, frame: &RdsFrame) {
        let offset = frame.block4 & 0x3F;
        let hour = ((frame.block3 & 0x0001) << 4) | ((frame.block4 >> 12) & 0x0F);
        let mut mins = i32::from((frame.block4 >> 6) & 0x3F) + 60 * i32::from(hour);

        // Local offset in half hours, sign in bit 5
        let shift = 30 * i32::from(offset & 0x1F);
        if offset & 0x20 != 0 {
            mins -= shift;
        } else {
            mins += shift;
        }
        let mins = mins.rem_euclid(MINUTES_PER_DAY) as u16;

        if self.last_minutes[0] == Some(mins) {
            return;
        }

        let follows = |prev: Option<u16>| {
            prev.map_or(true, |p| (i32::from(p) + 1) % MINUTES_PER_DAY == i32::from(mins))
        };
        if !(follows(self.last_minutes[0]) || follows(self.last_minutes[1])) {
            log::trace!("RDS time {mins} min rejected as noise");
            return;
        }

        self.last_minutes = [Some(mins), self.last_minutes[0]];
        let (hour, minute) = split_minutes(mins);
        log::debug!("RDS time: {hour:02}:{minute:02}");
        if let Some(sink) = self.on_time.as_mut() {
            sink(hour, minute);
        }
    }
}

impl Default for RdsDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSink for RdsDecoder {
    fn on_frame(&mut self, frame: RdsFrame) {
        self.process_frame(frame);
    }
}

/// Character filter for incoming RDS bytes:
/// every byte value passes through unchanged, control codes included.
fn accept_char(byte: u8) -> u8 {
    byte
}

/// Bytes to string, one char per byte (ISO-8859-1)
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn split_minutes(mins: u16) -> (u8, u8) {
    ((mins / 60) as u8, (mins % 60) as u8)
}
