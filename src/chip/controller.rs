//! RadioController: high-level receiver operations on top of `ChipSession`.
//!
//! Turns intents (tune, seek, volume, mute...) into register writes and
//! polls status back. The chip tunes and seeks on its own; the controller
//! models that latency with fixed blocking delays rather than polling the
//! seek/tune-complete bit.

use std::time::{Duration, Instant};

use crate::domain::{
    format_frequency, Band, RadioConfig, RadioResult, RadioStatus, TuneState, FREQ_STEP,
};
use crate::ports::{BusPort, DelayNs};
use crate::rds::{FrameSink, RdsFrame};

use super::bank::RegisterBank;
use super::regs::*;
use super::session::ChipSession;

/// Settle time after writing a new channel
const TUNE_SETTLE_MS: u32 = 200;
/// Wait after re-applying volume once tuned
const VOLUME_APPLY_MS: u32 = 300;
/// Time the chip needs to scan the band during a seek
const SEEK_SCAN_MS: u32 = 1000;
/// Time the reset bit is held during a soft reset
const SOFT_RESET_MS: u32 = 2000;

/// Owns the chip session and drives the tune/seek/RDS-gate state machine.
pub struct RadioController {
    session: ChipSession,
    delay: Box<dyn DelayNs + Send>,
    state: TuneState,

    band: Band,
    /// Frequency in 10 kHz units
    frequency: u16,
    volume: u8,
    max_volume: u8,

    mute: bool,
    mono: bool,
    bass_boost: bool,
    soft_mute: bool,
    stereo: bool,
    tuned: bool,
    rds_enabled: bool,
    rds_available: bool,

    rssi: u8,
    /// RSSI has cleared `rds_threshold` at the last check
    rds_ready: bool,
    rds_threshold: u8,
    threshold_interval: Duration,
    last_threshold_check: Instant,

    frame_sink: Option<Box<dyn FrameSink>>,
}

impl RadioController {
    /// Build a controller without touching the bus. Call [`setup`](Self::setup)
    /// and [`tune`](Self::tune) to bring the chip up.
    pub fn new(bus: Box<dyn BusPort>, delay: Box<dyn DelayNs + Send>, config: &RadioConfig) -> Self {
        let max_volume = config.volume_ceiling();
        Self {
            session: ChipSession::new(bus),
            delay,
            state: TuneState::Uninitialized,
            band: config.band,
            frequency: config.band.snap(config.frequency),
            volume: config.volume.min(max_volume),
            max_volume,
            mute: false,
            mono: false,
            bass_boost: false,
            soft_mute: false,
            stereo: false,
            tuned: false,
            rds_enabled: false,
            rds_available: false,
            rssi: 0,
            rds_ready: false,
            rds_threshold: config.rds_threshold,
            threshold_interval: config.threshold_interval(),
            last_threshold_check: Instant::now(),
            frame_sink: None,
        }
    }

    /// Reset and enable the chip with audio out, RDS reception and bass boost.
    pub fn setup(&mut self) -> RadioResult<()> {
        log::info!("Receiver setup");
        self.session.bank_mut().set(CHIPID, CHIP_ID);
        self.session
            .write_register(CTRL, CTRL_RESET | CTRL_ENABLE | CTRL_UNMUTE | CTRL_OUTPUT)?;
        self.session.write_register(VOL, VOL_DEFAULT)?;
        self.session.write_register(
            CTRL,
            CTRL_ENABLE | CTRL_NEW | CTRL_RDS | CTRL_UNMUTE | CTRL_OUTPUT,
        )?;
        self.set_bass_boost(true)?;

        self.rds_enabled = true;
        self.mute = false;
        self.state = TuneState::Initialized;
        Ok(())
    }

    /// Apply the current frequency and volume.
    pub fn tune(&mut self) -> RadioResult<()> {
        self.set_freq(self.frequency)?;
        self.set_volume(self.volume)?;
        self.tuned = true;
        Ok(())
    }

    /// Tune to `freq` (10 kHz units), clamped to the band. Blocks while the
    /// chip settles, then returns the frequency the chip actually locked.
    pub fn set_freq(&mut self, freq: u16) -> RadioResult<u16> {
        let low = self.band.freq_low();
        let freq = freq.clamp(low, self.band.freq_high());

        let channel = (freq - low) / FREQ_STEP;
        let chan = band_bits(self.band)
            | CHAN_SPACE_100
            | CHAN_TUNE
            | ((channel << CHAN_NR_SHIFT) & CHAN_NR);

        let mut enable = CTRL_OUTPUT | CTRL_ENABLE;
        if !self.mute {
            enable |= CTRL_UNMUTE;
        }
        if self.rds_enabled {
            enable |= CTRL_RDS;
        }
        self.session.bank_mut().set_bits(CTRL, enable, true);
        self.session.save_register(CTRL)?;
        self.session.write_register(CHAN, chan)?;
        self.delay.delay_ms(TUNE_SETTLE_MS);

        self.session.save_register(VOL)?;
        self.delay.delay_ms(VOLUME_APPLY_MS);

        let locked = self.get_freq()?;
        let requested = self.band.snap(freq);
        if locked != requested {
            log::warn!(
                "Requested {} but chip locked {}",
                format_frequency(requested),
                format_frequency(locked)
            );
        }
        self.rds_ready = self.get_rssi()? >= self.rds_threshold;
        self.state = TuneState::Tuned;
        log::info!("Tuned {} (rssi {})", format_frequency(locked), self.rssi);
        Ok(locked)
    }

    /// Read the locked channel from RA and convert it to a frequency.
    pub fn get_freq(&mut self) -> RadioResult<u16> {
        let ra = self.session.refresh(RA)?;
        let channel = ra & RA_NR;
        let freq = self
            .band
            .freq_low()
            .saturating_add(channel.saturating_mul(FREQ_STEP));
        self.frequency = freq.min(self.band.freq_high());
        self.stereo = ra & RA_STEREO != 0;
        Ok(self.frequency)
    }

    pub fn seek_up(&mut self) -> RadioResult<u16> {
        self.seek(true)
    }

    pub fn seek_down(&mut self) -> RadioResult<u16> {
        self.seek(false)
    }

    fn seek(&mut self, up: bool) -> RadioResult<u16> {
        let previous = self.state;
        self.state = TuneState::Seeking;
        match self.run_seek(up) {
            Ok(freq) => {
                self.state = TuneState::Tuned;
                log::info!(
                    "Seek {} stopped at {}",
                    if up { "up" } else { "down" },
                    format_frequency(freq)
                );
                Ok(freq)
            }
            Err(e) => {
                self.state = previous;
                Err(e)
            }
        }
    }

    fn run_seek(&mut self, up: bool) -> RadioResult<u16> {
        let bank = self.session.bank_mut();
        bank.set_bits(CTRL, CTRL_SEEKUP, up);
        bank.set_bits(CTRL, CTRL_SEEK, true);
        self.session.save_register(CTRL)?;

        // No cancellation: the chip scans autonomously
        self.delay.delay_ms(SEEK_SCAN_MS);

        self.session.bank_mut().set_bits(CTRL, CTRL_SEEK, false);
        self.session.save_register(CTRL)?;
        self.get_freq()
    }

    /// Switch band. Writes CHAN without the tune bit; the next `set_freq`
    /// retunes inside the new band.
    pub fn set_band(&mut self, band: Band) -> RadioResult<()> {
        self.band = band;
        self.frequency = band.snap(self.frequency);
        self.session
            .write_register(CHAN, band_bits(band) | CHAN_SPACE_100)
    }

    /// Set the 4-bit volume, capped at the configured maximum. Other VOL bits
    /// are preserved.
    pub fn set_volume(&mut self, volume: u8) -> RadioResult<()> {
        let volume = volume.min(self.max_volume);
        self.volume = volume;
        self.session
            .bank_mut()
            .replace_field(VOL, VOL_VOL, u16::from(volume));
        self.session.save_register(VOL)
    }

    pub fn set_mute(&mut self, on: bool) -> RadioResult<()> {
        self.mute = on;
        self.write_flag(CTRL, CTRL_UNMUTE, !on)
    }

    pub fn set_mono(&mut self, on: bool) -> RadioResult<()> {
        self.mono = on;
        self.write_flag(CTRL, CTRL_MONO, on)
    }

    pub fn set_bass_boost(&mut self, on: bool) -> RadioResult<()> {
        self.bass_boost = on;
        self.write_flag(CTRL, CTRL_BASS, on)
    }

    pub fn set_soft_mute(&mut self, on: bool) -> RadioResult<()> {
        self.soft_mute = on;
        self.write_flag(R4, R4_SOFTMUTE, on)
    }

    pub fn set_rds(&mut self, on: bool) -> RadioResult<()> {
        self.rds_enabled = on;
        self.write_flag(CTRL, CTRL_RDS, on)
    }

    fn write_flag(&mut self, addr: u8, mask: u16, on: bool) -> RadioResult<()> {
        self.session.bank_mut().set_bits(addr, mask, on);
        self.session.save_register(addr)
    }

    /// Pulse the CTRL reset bit, holding it for two seconds.
    pub fn soft_reset(&mut self) -> RadioResult<()> {
        log::info!("Soft reset");
        self.write_flag(CTRL, CTRL_RESET, true)?;
        self.delay.delay_ms(SOFT_RESET_MS);
        self.write_flag(CTRL, CTRL_RESET, false)
    }

    /// Silence and power down the receiver.
    pub fn term(&mut self) -> RadioResult<()> {
        log::info!("Receiver shutdown");
        self.set_volume(0)?;
        self.session.bank_mut().set(CTRL, 0x0000);
        for addr in CONFIG_RANGE {
            self.session.save_register(addr)?;
        }
        self.state = TuneState::Uninitialized;
        self.tuned = false;
        self.rds_ready = false;
        Ok(())
    }

    pub fn read_chip_id(&mut self) -> RadioResult<u16> {
        self.session.refresh(CHIPID)
    }

    /// Current RSSI from the top six bits of RB (0..=63).
    pub fn get_rssi(&mut self) -> RadioResult<u8> {
        let rb = self.session.refresh(RB)?;
        self.rssi = (rb >> RB_RSSI_SHIFT) as u8;
        Ok(self.rssi)
    }

    /// Re-evaluate the RDS gate from a fresh RSSI read, at most once per
    /// configured interval. Returns the (possibly unchanged) gate.
    pub fn check_threshold(&mut self) -> RadioResult<bool> {
        let now = Instant::now();
        if now.duration_since(self.last_threshold_check) < self.threshold_interval {
            return Ok(self.rds_ready);
        }
        self.rds_ready = self.get_rssi()? >= self.rds_threshold;
        self.last_threshold_check = now;
        Ok(self.rds_ready)
    }

    /// Poll for a new RDS group and forward it to the attached frame sink.
    ///
    /// Does nothing without a sink or while the RSSI gate is closed. The four
    /// blocks are read in sequence over separate transactions; a frame is
    /// forwarded when any block differs from the previous read.
    pub fn check_rds(&mut self) -> RadioResult<bool> {
        if self.frame_sink.is_none() {
            return Ok(false);
        }
        self.check_threshold()?;
        if !self.rds_ready {
            return Ok(false);
        }

        let ra = self.session.refresh(RA)?;
        self.rds_available = ra & RA_RDS != 0;
        if !self.rds_available {
            return Ok(false);
        }

        // All four blocks must arrive before the image is touched
        self.session.select(RDSA)?;
        let mut blocks = [0u16; 4];
        for word in blocks.iter_mut() {
            *word = self.session.read16()?;
        }

        let bank = self.session.bank_mut();
        let mut changed = false;
        for (addr, word) in (RDSA..=RDSD).zip(blocks) {
            if word != bank.get(addr) {
                bank.set(addr, word);
                changed = true;
            }
        }
        if !changed {
            return Ok(false);
        }

        let [block1, block2, block3, block4] = blocks;
        let frame = RdsFrame::new(block1, block2, block3, block4);
        log::trace!("RDS frame {frame:X?}");
        if let Some(sink) = self.frame_sink.as_mut() {
            sink.on_frame(frame);
        }
        Ok(true)
    }

    /// Read the status registers in one sweep and refresh the cached flags.
    pub fn refresh_status(&mut self) -> RadioResult<RadioStatus> {
        self.session.refresh_window(RA, STATUS_WINDOW)?;
        let bank = self.session.bank();
        let (ra, rb, ctrl) = (bank.get(RA), bank.get(RB), bank.get(CTRL));

        self.rds_available = ra & RA_RDS != 0;
        self.stereo = ra & RA_STEREO != 0;
        self.rssi = (rb >> RB_RSSI_SHIFT) as u8;
        self.tuned = rb & RB_FMTRUE != 0;
        self.mono = ctrl & CTRL_MONO != 0;
        Ok(self.status())
    }

    pub fn attach_frame_sink(&mut self, sink: impl FrameSink + 'static) {
        self.frame_sink = Some(Box::new(sink));
    }

    pub fn detach_frame_sink(&mut self) -> Option<Box<dyn FrameSink>> {
        self.frame_sink.take()
    }

    pub fn has_frame_sink(&self) -> bool {
        self.frame_sink.is_some()
    }

    pub fn status(&self) -> RadioStatus {
        RadioStatus {
            state: self.state,
            band: self.band,
            frequency: self.frequency,
            volume: self.volume,
            mute: self.mute,
            mono: self.mono,
            bass_boost: self.bass_boost,
            soft_mute: self.soft_mute,
            stereo: self.stereo,
            tuned: self.tuned,
            rds_enabled: self.rds_enabled,
            rds_available: self.rds_available,
            rssi: self.rssi,
            rds_ready: self.rds_ready,
        }
    }

    /// Current frequency formatted for display, e.g. `"101.1 MHz"`
    pub fn format_freq(&self) -> String {
        format_frequency(self.frequency)
    }

    pub fn state(&self) -> TuneState {
        self.state
    }

    pub fn band(&self) -> Band {
        self.band
    }

    pub fn frequency(&self) -> u16 {
        self.frequency
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn rssi(&self) -> u8 {
        self.rssi
    }

    pub fn rds_ready(&self) -> bool {
        self.rds_ready
    }

    /// The register image as last written or read
    pub fn registers(&self) -> &RegisterBank {
        self.session.bank()
    }
}

fn band_bits(band: Band) -> u16 {
    match band {
        Band::Fm => CHAN_BAND_FM,
        Band::FmWorld => CHAN_BAND_FMWORLD,
    }
}
