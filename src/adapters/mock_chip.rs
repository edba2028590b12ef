//! Simulated receiver chip for development and testing without hardware.
//!
//! `MockChip` implements `BusPort` and answers the same byte protocol as the
//! real part: a one-byte write selects the read pointer, a three-byte write
//! stores a register, and each two-byte read returns the word at the pointer
//! and advances it. Tune and seek requests are acted on immediately.
//!
//! Clones share state, so a test can keep one handle to inspect and script
//! the chip while the controller owns the other.
//!
//! Every tune and seek is logged at INFO level with a `[MOCK CHIP]` prefix.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::chip::regs::*;
use crate::domain::{RadioError, RadioResult, FREQ_HIGH, FREQ_STEP};
use crate::ports::BusPort;
use crate::rds::RdsFrame;

/// Chip id word reported by register 0x00
const MOCK_CHIP_ID: u16 = 0x5804;
/// Signal strength reported until a test says otherwise
const DEFAULT_RSSI: u8 = 20;

#[derive(Debug)]
struct MockChipState {
    regs: [u16; REGISTER_COUNT],
    pointer: u8,
    writes: Vec<Vec<u8>>,
    begins: usize,
    ends: usize,
    /// Frequencies (10 kHz units) a seek can stop on, kept sorted
    stations: Vec<u16>,
    rssi: u8,
    fail_writes: bool,
    /// Register whose read faults, if any
    fail_read_at: Option<u8>,
}

#[derive(Debug, Clone)]
pub struct MockChip {
    state: Arc<Mutex<MockChipState>>,
}

impl MockChip {
    pub fn new() -> Self {
        let mut regs = [0u16; REGISTER_COUNT];
        regs[usize::from(CHIPID)] = MOCK_CHIP_ID;
        regs[usize::from(RB)] = rb_word(DEFAULT_RSSI);
        log::info!("[MOCK CHIP] Initialized, rssi={DEFAULT_RSSI}");
        Self {
            state: Arc::new(Mutex::new(MockChipState {
                regs,
                pointer: 0,
                writes: Vec::new(),
                begins: 0,
                ends: 0,
                stations: Vec::new(),
                rssi: DEFAULT_RSSI,
                fail_writes: false,
                fail_read_at: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockChipState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current value of a chip register
    pub fn register(&self, addr: u8) -> u16 {
        self.lock().regs[usize::from(addr) % REGISTER_COUNT]
    }

    /// Every byte sequence written so far, in order
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.lock().writes.clone()
    }

    /// Register writes only, as `(addr, value)` pairs
    pub fn register_writes(&self) -> Vec<(u8, u16)> {
        self.lock()
            .writes
            .iter()
            .filter(|w| w.len() == 3)
            .map(|w| (w[0], u16::from_be_bytes([w[1], w[2]])))
            .collect()
    }

    pub fn clear_writes(&self) {
        self.lock().writes.clear();
    }

    /// `(begin, end)` counts seen on the bus
    pub fn transactions(&self) -> (usize, usize) {
        let state = self.lock();
        (state.begins, state.ends)
    }

    /// Set the signal strength (0..=63) reported in RB
    pub fn set_rssi(&self, rssi: u8) {
        let mut state = self.lock();
        state.rssi = rssi.min(63);
        let rb = rb_word(state.rssi);
        state.regs[usize::from(RB)] = rb;
    }

    /// Frequencies a seek can land on
    pub fn set_stations(&self, stations: &[u16]) {
        let mut sorted = stations.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        self.lock().stations = sorted;
    }

    /// Make every subsequent write fail with a transport error
    pub fn fail_writes(&self, on: bool) {
        self.lock().fail_writes = on;
    }

    /// Make reads of register `addr` fail with a transport error, or stop
    /// failing with `None`
    pub fn fail_read_at(&self, addr: Option<u8>) {
        self.lock().fail_read_at = addr;
    }

    /// Present `frame` in the RDS block registers and flag it as ready
    pub fn push_rds(&self, frame: RdsFrame) {
        let mut state = self.lock();
        state.regs[usize::from(RDSA)] = frame.block1;
        state.regs[usize::from(RDSB)] = frame.block2;
        state.regs[usize::from(RDSC)] = frame.block3;
        state.regs[usize::from(RDSD)] = frame.block4;
        state.regs[usize::from(RA)] |= RA_RDS;
    }

    /// Clear the RDS-ready flag
    pub fn clear_rds(&self) {
        self.lock().regs[usize::from(RA)] &= !RA_RDS;
    }
}

impl Default for MockChip {
    fn default() -> Self {
        Self::new()
    }
}

impl BusPort for MockChip {
    fn begin(&mut self) -> RadioResult<()> {
        self.lock().begins += 1;
        Ok(())
    }

    fn end(&mut self) {
        self.lock().ends += 1;
    }

    fn write(&mut self, data: &[u8]) -> RadioResult<()> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(RadioError::Transport("[MOCK CHIP] write NACK".into()));
        }
        state.writes.push(data.to_vec());
        match *data {
            [addr] => {
                state.pointer = addr % REGISTER_COUNT as u8;
                Ok(())
            }
            [addr, hi, lo] => {
                state.store(addr, u16::from_be_bytes([hi, lo]));
                Ok(())
            }
            _ => Err(RadioError::Transport(format!(
                "[MOCK CHIP] unexpected {}-byte write",
                data.len()
            ))),
        }
    }

    fn read(&mut self, n: usize) -> RadioResult<Vec<u8>> {
        let mut state = self.lock();
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            if state.fail_read_at == Some(state.pointer) {
                return Err(RadioError::Transport(format!(
                    "[MOCK CHIP] read of 0x{:02X} NACK",
                    state.pointer
                )));
            }
            let word = state.regs[usize::from(state.pointer)];
            out.extend_from_slice(&word.to_be_bytes());
            state.pointer = (state.pointer + 1) % REGISTER_COUNT as u8;
        }
        out.truncate(n);
        Ok(out)
    }
}

impl MockChipState {
    fn store(&mut self, addr: u8, value: u16) {
        let addr = addr % REGISTER_COUNT as u8;
        self.regs[usize::from(addr)] = value;
        match addr {
            CHAN if value & CHAN_TUNE != 0 => {
                let channel = (value & CHAN_NR) >> CHAN_NR_SHIFT;
                self.lock_channel(channel);
                log::info!(
                    "[MOCK CHIP] TUNE → channel {channel} ({} in 10 kHz)",
                    self.band_low() + channel * FREQ_STEP
                );
            }
            CTRL if value & CTRL_SEEK != 0 => self.seek(value & CTRL_SEEKUP != 0),
            _ => {}
        }
    }

    fn band_low(&self) -> u16 {
        match self.regs[usize::from(CHAN)] & CHAN_BAND {
            CHAN_BAND_FMWORLD => 7600,
            _ => 8700,
        }
    }

    fn current_freq(&self) -> u16 {
        self.band_low() + (self.regs[usize::from(RA)] & RA_NR) * FREQ_STEP
    }

    fn lock_channel(&mut self, channel: u16) {
        let ra = &mut self.regs[usize::from(RA)];
        *ra = (*ra & RA_RDS) | RA_STC | (channel & RA_NR);
        self.regs[usize::from(RB)] = rb_word(self.rssi);
    }

    fn seek(&mut self, up: bool) {
        let current = self.current_freq();
        let low = self.band_low();
        let in_band = |f: &&u16| **f >= low && **f <= FREQ_HIGH;
        let target = if up {
            self.stations
                .iter()
                .filter(in_band)
                .find(|&&f| f > current)
                .or_else(|| self.stations.iter().find(in_band))
        } else {
            self.stations
                .iter()
                .rev()
                .filter(in_band)
                .find(|&&f| f < current)
                .or_else(|| self.stations.iter().rev().find(in_band))
        }
        .copied();

        match target {
            Some(freq) => {
                self.lock_channel((freq - low) / FREQ_STEP);
                log::info!(
                    "[MOCK CHIP] SEEK {} → {freq}",
                    if up { "UP" } else { "DOWN" }
                );
            }
            None => {
                self.regs[usize::from(RA)] |= RA_STC | RA_SF;
                log::info!("[MOCK CHIP] SEEK found nothing, staying at {current}");
            }
        }
    }
}

fn rb_word(rssi: u8) -> u16 {
    (u16::from(rssi) << RB_RSSI_SHIFT) | RB_FMTRUE | RB_FMREADY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::RegisterBank;

    #[test]
    fn select_then_read_walks_registers() {
        let mut chip = MockChip::new();
        chip.write(&[CHIPID]).unwrap();
        assert_eq!(chip.read(2).unwrap(), MOCK_CHIP_ID.to_be_bytes());
        // Pointer advanced to register 0x01
        assert_eq!(chip.read(2).unwrap(), [0, 0]);
    }

    #[test]
    fn tune_write_sets_channel_and_rssi() {
        let mut chip = MockChip::new();
        chip.set_rssi(42);
        let chan = (141u16 << CHAN_NR_SHIFT) | CHAN_TUNE;
        chip.write(&RegisterBank::encode_write(CHAN, chan)).unwrap();
        assert_eq!(chip.register(RA) & RA_NR, 141);
        assert_eq!(chip.register(RB) >> RB_RSSI_SHIFT, 42);
    }

    #[test]
    fn seek_wraps_around_band() {
        let mut chip = MockChip::new();
        chip.set_stations(&[8810, 9950, 10440]);
        let chan = (((10440u16 - 8700) / FREQ_STEP) << CHAN_NR_SHIFT) | CHAN_TUNE;
        chip.write(&RegisterBank::encode_write(CHAN, chan)).unwrap();

        chip.write(&RegisterBank::encode_write(CTRL, CTRL_SEEK | CTRL_SEEKUP)).unwrap();
        assert_eq!(chip.register(RA) & RA_NR, (8810 - 8700) / FREQ_STEP);

        chip.write(&RegisterBank::encode_write(CTRL, CTRL_SEEK)).unwrap();
        assert_eq!(chip.register(RA) & RA_NR, (10440 - 8700) / FREQ_STEP);
    }

    #[test]
    fn read_fault_hits_only_its_register() {
        let mut chip = MockChip::new();
        chip.fail_read_at(Some(RB));
        chip.write(&[RA]).unwrap();
        assert!(chip.read(2).is_ok());
        assert!(matches!(chip.read(2), Err(RadioError::Transport(_))));

        chip.fail_read_at(None);
        assert!(chip.read(2).is_ok());
    }

    #[test]
    fn failing_writes_report_transport() {
        let mut chip = MockChip::new();
        chip.fail_writes(true);
        assert!(matches!(chip.write(&[RA]), Err(RadioError::Transport(_))));
        assert!(chip.writes().is_empty());
    }
}
