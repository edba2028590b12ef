//! Integration tests: RadioController driving the simulated chip
//!
//! These tests run the controller against `MockChip`, which answers the same
//! register protocol as the hardware, and `RecordingDelay`, so nothing
//! actually sleeps. Wire-level effects are checked on the chip's registers
//! and write log.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rdaradio_lib::adapters::{MockChip, RecordingDelay};
use rdaradio_lib::chip::regs::*;
use rdaradio_lib::domain::{Band, RadioConfig, RadioError, RadioResult, TuneState};
use rdaradio_lib::rds::RdsFrame;
use rdaradio_lib::RadioController;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn make_radio(config: &RadioConfig) -> (RadioController, MockChip, RecordingDelay) {
    init_logger();
    let chip = MockChip::new();
    let delay = RecordingDelay::new();
    let radio = RadioController::new(Box::new(chip.clone()), Box::new(delay.clone()), config);
    (radio, chip, delay)
}

/// Controller that re-reads RSSI on every threshold check
fn eager_config() -> RadioConfig {
    RadioConfig {
        threshold_interval_secs: 0,
        ..RadioConfig::default()
    }
}

fn ready_radio(config: &RadioConfig) -> (RadioController, MockChip, RecordingDelay) {
    let (mut radio, chip, delay) = make_radio(config);
    radio.setup().unwrap();
    radio.tune().unwrap();
    chip.clear_writes();
    delay.clear();
    (radio, chip, delay)
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn construction_does_not_touch_the_bus() {
    let (radio, chip, delay) = make_radio(&RadioConfig::default());
    assert!(chip.writes().is_empty());
    assert_eq!(chip.transactions(), (0, 0));
    assert!(delay.calls().is_empty());
    assert_eq!(radio.state(), TuneState::Uninitialized);
}

#[test]
fn setup_and_tune_reach_tuned_state() {
    let (mut radio, chip, _) = make_radio(&RadioConfig::default());
    radio.setup().unwrap();
    assert_eq!(radio.state(), TuneState::Initialized);
    assert_eq!(chip.register(CTRL), 0xD00D);
    assert_eq!(chip.register(VOL), VOL_DEFAULT);

    radio.tune().unwrap();
    let status = radio.status();
    assert_eq!(status.state, TuneState::Tuned);
    assert_eq!(status.frequency, 10000);
    assert!(status.tuned);
    assert_eq!(radio.format_freq(), "100.0 MHz");
}

#[test]
fn term_silences_and_flushes_config_registers() {
    let (mut radio, chip, _) = ready_radio(&RadioConfig::default());
    radio.term().unwrap();

    assert_eq!(radio.volume(), 0);
    assert_eq!(chip.register(CTRL), 0x0000);
    assert_eq!(chip.register(VOL) & VOL_VOL, 0);

    let addrs: Vec<u8> = chip.register_writes().iter().map(|(a, _)| *a).collect();
    assert_eq!(addrs, [VOL, 0x02, 0x03, 0x04, 0x05, 0x06]);
    assert_eq!(radio.state(), TuneState::Uninitialized);
}

#[test]
fn soft_reset_holds_reset_bit_for_two_seconds() {
    let (mut radio, chip, delay) = ready_radio(&RadioConfig::default());
    radio.soft_reset().unwrap();

    let ctrl_writes: Vec<u16> = chip
        .register_writes()
        .into_iter()
        .filter(|(a, _)| *a == CTRL)
        .map(|(_, v)| v)
        .collect();
    assert_eq!(ctrl_writes.len(), 2);
    assert_ne!(ctrl_writes[0] & CTRL_RESET, 0);
    assert_eq!(ctrl_writes[1] & CTRL_RESET, 0);
    assert_eq!(delay.calls(), [Duration::from_secs(2)]);
}

#[test]
fn chip_id_is_read_from_register_zero() {
    let (mut radio, _, _) = make_radio(&RadioConfig::default());
    assert_eq!(radio.read_chip_id().unwrap(), 0x5804);
}

// ---------------------------------------------------------------------------
// Tuning
// ---------------------------------------------------------------------------

#[test]
fn set_freq_then_get_freq_agree_on_grid() {
    let (mut radio, _, _) = ready_radio(&RadioConfig::default());
    for freq in [8700u16, 9350, 10110, 10800] {
        assert_eq!(radio.set_freq(freq).unwrap(), freq);
        assert_eq!(radio.get_freq().unwrap(), freq);
    }
}

#[test]
fn set_freq_clamps_to_band_and_grid() {
    let (mut radio, _, _) = ready_radio(&RadioConfig::default());
    assert_eq!(radio.set_freq(12000).unwrap(), 10800);
    assert_eq!(radio.set_freq(8000).unwrap(), 8700);
    assert_eq!(radio.set_freq(10119).unwrap(), 10110);
}

#[test]
fn set_freq_waits_for_settle_and_volume() {
    let (mut radio, _, delay) = ready_radio(&RadioConfig::default());
    radio.set_freq(9800).unwrap();
    assert_eq!(
        delay.calls(),
        [Duration::from_millis(200), Duration::from_millis(300)]
    );
}

#[test]
fn set_freq_keeps_mute() {
    let (mut radio, chip, _) = ready_radio(&RadioConfig::default());
    radio.set_mute(true).unwrap();
    radio.set_freq(9000).unwrap();
    assert_eq!(chip.register(CTRL) & CTRL_UNMUTE, 0);
    assert!(radio.status().mute);
}

#[test]
fn failed_set_freq_keeps_previous_frequency() {
    let (mut radio, chip, _) = ready_radio(&RadioConfig::default());
    chip.fail_writes(true);
    assert!(matches!(radio.set_freq(10119), Err(RadioError::Transport(_))));
    assert_eq!(radio.frequency(), 10000);
    assert_eq!(radio.status().frequency, 10000);
}

#[test]
fn set_freq_gate_opens_at_threshold() {
    let (mut radio, chip, _) = ready_radio(&RadioConfig::default());
    chip.set_rssi(10);
    radio.set_freq(9800).unwrap();
    assert!(radio.rds_ready());

    chip.set_rssi(9);
    radio.set_freq(9900).unwrap();
    assert!(!radio.rds_ready());
}

#[test]
fn seek_walks_stations_and_wraps() {
    let (mut radio, chip, delay) = ready_radio(&RadioConfig::default());
    chip.set_stations(&[8810, 9950, 10440]);
    radio.set_freq(9000).unwrap();
    delay.clear();

    assert_eq!(radio.seek_up().unwrap(), 9950);
    assert_eq!(radio.seek_up().unwrap(), 10440);
    assert_eq!(radio.seek_up().unwrap(), 8810);
    assert_eq!(radio.seek_down().unwrap(), 10440);
    assert_eq!(radio.frequency(), 10440);
    assert_eq!(radio.state(), TuneState::Tuned);

    assert_eq!(delay.total(), Duration::from_secs(4));
    assert_eq!(chip.register(CTRL) & CTRL_SEEK, 0);
}

#[test]
fn seek_failure_keeps_previous_state() {
    let (mut radio, chip, _) = ready_radio(&RadioConfig::default());
    chip.fail_writes(true);
    assert!(matches!(radio.seek_down(), Err(RadioError::Transport(_))));
    assert_eq!(radio.state(), TuneState::Tuned);
}

#[test]
fn band_switch_moves_lower_edge() {
    let (mut radio, chip, _) = ready_radio(&RadioConfig::default());
    radio.set_band(Band::FmWorld).unwrap();
    assert_eq!(chip.register(CHAN) & CHAN_BAND, CHAN_BAND_FMWORLD);

    assert_eq!(radio.set_freq(7650).unwrap(), 7650);
    assert_eq!(radio.get_freq().unwrap(), 7650);

    radio.set_band(Band::Fm).unwrap();
    assert_eq!(radio.frequency(), 8700);
    assert_eq!(radio.band(), Band::Fm);
}

// ---------------------------------------------------------------------------
// Audio settings
// ---------------------------------------------------------------------------

#[test]
fn volume_above_ceiling_is_capped() {
    let (mut radio, chip, _) = ready_radio(&RadioConfig::default());
    radio.set_volume(200).unwrap();
    assert_eq!(radio.volume(), 15);
    assert_eq!(chip.register(VOL), 0x84DF);

    radio.set_volume(3).unwrap();
    assert_eq!(chip.register(VOL), 0x84D3);
}

#[test]
fn configured_max_volume_caps_below_hardware() {
    let config = RadioConfig {
        max_volume: 8,
        ..RadioConfig::default()
    };
    let (mut radio, chip, _) = ready_radio(&config);
    radio.set_volume(12).unwrap();
    assert_eq!(radio.volume(), 8);
    assert_eq!(chip.register(VOL) & VOL_VOL, 8);
}

#[test]
fn mute_is_idempotent() {
    let (mut radio, chip, _) = ready_radio(&RadioConfig::default());
    radio.set_mute(true).unwrap();
    let once = chip.register(CTRL);
    radio.set_mute(true).unwrap();
    assert_eq!(chip.register(CTRL), once);
    assert_eq!(once & CTRL_UNMUTE, 0);

    radio.set_mute(false).unwrap();
    assert_ne!(chip.register(CTRL) & CTRL_UNMUTE, 0);
}

#[test]
fn each_flag_setter_writes_one_register() {
    let (mut radio, chip, _) = ready_radio(&RadioConfig::default());
    let setters: [(fn(&mut RadioController, bool) -> RadioResult<()>, u8); 4] = [
        (RadioController::set_mute, CTRL),
        (RadioController::set_mono, CTRL),
        (RadioController::set_bass_boost, CTRL),
        (RadioController::set_soft_mute, R4),
    ];
    for (set, addr) in setters {
        for on in [true, false] {
            chip.clear_writes();
            set(&mut radio, on).unwrap();
            let writes = chip.register_writes();
            assert_eq!(writes.len(), 1, "{writes:?}");
            assert_eq!(writes[0].0, addr);
        }
    }
}

#[test]
fn flags_land_in_their_registers() {
    let (mut radio, chip, _) = ready_radio(&RadioConfig::default());
    radio.set_mono(true).unwrap();
    radio.set_bass_boost(false).unwrap();
    radio.set_soft_mute(true).unwrap();
    radio.set_rds(false).unwrap();

    let ctrl = chip.register(CTRL);
    assert_ne!(ctrl & CTRL_MONO, 0);
    assert_eq!(ctrl & CTRL_BASS, 0);
    assert_eq!(ctrl & CTRL_RDS, 0);
    assert_ne!(chip.register(R4) & R4_SOFTMUTE, 0);

    let status = radio.status();
    assert!(status.mono && status.soft_mute);
    assert!(!status.bass_boost && !status.rds_enabled);
}

// ---------------------------------------------------------------------------
// Signal strength and RDS gate
// ---------------------------------------------------------------------------

#[test]
fn rssi_and_status_refresh() {
    let (mut radio, chip, _) = ready_radio(&RadioConfig::default());
    chip.set_rssi(41);
    assert_eq!(radio.get_rssi().unwrap(), 41);

    chip.set_rssi(12);
    let status = radio.refresh_status().unwrap();
    assert_eq!(status.rssi, 12);
    assert!(status.tuned);
    assert_eq!(status.frequency, 10000);
}

#[test]
fn threshold_check_respects_interval() {
    let (mut radio, chip, _) = make_radio(&RadioConfig::default());
    chip.set_rssi(30);
    radio.setup().unwrap();
    radio.tune().unwrap();
    assert!(radio.rds_ready());

    // Within the 10 s interval the gate is not re-evaluated
    chip.set_rssi(2);
    assert!(radio.check_threshold().unwrap());
}

#[test]
fn threshold_gate_opens_at_threshold() {
    let (mut radio, chip, _) = ready_radio(&eager_config());
    chip.set_rssi(9);
    assert!(!radio.check_threshold().unwrap());
    chip.set_rssi(10);
    assert!(radio.check_threshold().unwrap());
}

#[test]
fn check_rds_forwards_only_changed_frames() {
    let (mut radio, chip, _) = ready_radio(&eager_config());
    chip.set_rssi(30);

    let frames = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&frames);
    radio.attach_frame_sink(move |frame: RdsFrame| sink.lock().unwrap().push(frame));
    assert!(radio.has_frame_sink());

    let first = RdsFrame::new(0x1234, 0x0800, 0x1234, 0x4142);
    chip.push_rds(first);
    assert!(radio.check_rds().unwrap());
    // Same blocks again: nothing new
    assert!(!radio.check_rds().unwrap());

    let second = RdsFrame::new(0x1234, 0x0801, 0x1234, 0x4344);
    chip.push_rds(second);
    assert!(radio.check_rds().unwrap());

    assert_eq!(*frames.lock().unwrap(), [first, second]);
}

#[test]
fn check_rds_failed_read_keeps_frame_for_retry() {
    let (mut radio, chip, _) = ready_radio(&eager_config());
    chip.set_rssi(30);

    let frames = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&frames);
    radio.attach_frame_sink(move |frame: RdsFrame| sink.lock().unwrap().push(frame));

    let first = RdsFrame::new(1, 2, 3, 4);
    chip.push_rds(first);
    assert!(radio.check_rds().unwrap());

    // Block A reads fine, block B faults
    let second = RdsFrame::new(9, 2, 3, 4);
    chip.push_rds(second);
    chip.fail_read_at(Some(RDSB));
    assert!(matches!(radio.check_rds(), Err(RadioError::Transport(_))));
    assert_eq!(radio.registers().get(RDSA), 1);

    chip.fail_read_at(None);
    assert!(radio.check_rds().unwrap());
    assert_eq!(*frames.lock().unwrap(), [first, second]);
}

#[test]
fn check_rds_closed_gate_and_no_data() {
    let (mut radio, chip, _) = ready_radio(&eager_config());
    let frames = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&frames);
    radio.attach_frame_sink(move |frame: RdsFrame| sink.lock().unwrap().push(frame));

    chip.set_rssi(3);
    chip.push_rds(RdsFrame::new(1, 2, 3, 4));
    assert!(!radio.check_rds().unwrap());

    chip.set_rssi(30);
    chip.clear_rds();
    assert!(!radio.check_rds().unwrap());
    assert!(!radio.status().rds_available);
    assert!(frames.lock().unwrap().is_empty());

    assert!(radio.detach_frame_sink().is_some());
    assert!(!radio.has_frame_sink());
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

#[test]
fn every_transaction_is_closed_even_on_failure() {
    let (mut radio, chip, _) = ready_radio(&RadioConfig::default());
    radio.set_volume(5).unwrap();
    radio.refresh_status().unwrap();

    chip.fail_writes(true);
    assert!(matches!(radio.set_volume(6), Err(RadioError::Transport(_))));
    assert!(radio.get_freq().is_err());

    let (begins, ends) = chip.transactions();
    assert!(begins > 0);
    assert_eq!(begins, ends);
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn saved_config_drives_a_new_controller() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("radio.json");

    let config = RadioConfig {
        band: Band::FmWorld,
        frequency: 8255,
        volume: 6,
        ..RadioConfig::default()
    };
    config.save(&path).unwrap();
    let loaded = RadioConfig::load(&path).unwrap();
    assert_eq!(loaded, config);

    let (radio, _, _) = make_radio(&loaded);
    assert_eq!(radio.band(), Band::FmWorld);
    assert_eq!(radio.frequency(), 8250);
    assert_eq!(radio.volume(), 6);
}

#[test]
fn missing_config_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = RadioConfig::load(dir.path().join("absent.json"));
    assert!(matches!(result, Err(RadioError::Config(_))));
}
