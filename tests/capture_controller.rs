//! Capture controller lifecycle tests against a scripted backend.
//!
//! The scripted backend records every open and close so the tests can
//! check that only one session is ever live and that failed
//! reconfigurations leave the previous configuration in place.

mod common;

use camview::camera::{
    CameraError, CaptureController, Device, PixelEncoding, Resolution, SessionState,
};
use common::{device, Collector, ScriptedBackend};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_no_devices_fails_fast() {
    let result = CaptureController::new(ScriptedBackend::new(Vec::new()));
    assert!(matches!(result, Err(CameraError::NoDevices)));
}

#[test]
fn test_stop_when_never_started() {
    let mut controller = CaptureController::new(ScriptedBackend::new(vec![device("a")])).unwrap();
    controller.stop();
    controller.stop();
    assert!(matches!(controller.state(), SessionState::Unconfigured));
    assert!(controller.active_configuration().is_none());
}

#[test]
fn test_start_applies_preferred_format_and_bounds() {
    let mut controller = CaptureController::new(ScriptedBackend::new(vec![device("a")])).unwrap();
    controller.start().unwrap();
    assert!(controller.is_running());

    let config = controller.active_configuration().unwrap();
    assert_eq!(config.device.id, "a");
    // 16x12 only reaches 24 fps, so the 30 fps 8x6 mode wins
    assert_eq!(config.format.resolution, Resolution::new(8, 6));
    let bounds = config.frame_durations.unwrap();
    assert_eq!(bounds.min, Duration::from_secs_f64(1.0 / 30.0));
    assert_eq!(bounds.max, Duration::from_secs(1));
    assert_eq!(config.output_encoding, PixelEncoding::Rgba);
}

#[test]
fn test_restart_tears_down_previous_session() {
    let backend = ScriptedBackend::new(vec![device("a")]);
    let journal = Arc::clone(&backend.journal);
    let mut controller = CaptureController::new(backend).unwrap();

    controller.start().unwrap();
    controller.start().unwrap();
    assert_eq!(journal.opened.lock().unwrap().len(), 2);
    assert_eq!(journal.closed.load(Ordering::SeqCst), 1);

    controller.stop();
    assert_eq!(journal.closed.load(Ordering::SeqCst), 2);
    assert_eq!(journal.max_live.load(Ordering::SeqCst), 1);
    assert!(matches!(controller.state(), SessionState::Stopped(_)));
    assert!(!controller.is_running());
}

#[test]
fn test_switch_round_trip_matches_single_start() {
    let devices = vec![device("a"), device("b")];

    let mut reference = CaptureController::new(ScriptedBackend::new(devices.clone())).unwrap();
    reference.start().unwrap();
    let expected = reference.active_configuration().unwrap().clone();
    reference.stop();

    let backend = ScriptedBackend::new(devices.clone());
    let journal = Arc::clone(&backend.journal);
    let mut controller = CaptureController::new(backend).unwrap();
    controller.start().unwrap();
    controller.switch_device(&devices[1]).unwrap();
    assert_eq!(controller.active_configuration().unwrap().device.id, "b");
    controller.switch_device(&devices[0]).unwrap();

    assert_eq!(controller.active_configuration(), Some(&expected));
    assert_eq!(controller.active_device_index(), 0);
    assert!(controller.is_running());
    assert_eq!(*journal.opened.lock().unwrap(), ["a", "b", "a"]);
    assert_eq!(journal.max_live.load(Ordering::SeqCst), 1);
}

#[test]
fn test_switch_to_unknown_device_is_noop() {
    let backend = ScriptedBackend::new(vec![device("a")]);
    let journal = Arc::clone(&backend.journal);
    let mut controller = CaptureController::new(backend).unwrap();
    controller.start().unwrap();

    controller.switch_device(&device("zz")).unwrap();
    assert!(controller.is_running());
    assert_eq!(controller.active_configuration().unwrap().device.id, "a");
    assert_eq!(journal.opened.lock().unwrap().len(), 1);
}

#[test]
fn test_rejected_switch_restores_prior_device() {
    let devices = vec![device("a"), device("b")];
    let backend = ScriptedBackend::new(devices.clone()).rejecting("b");
    let journal = Arc::clone(&backend.journal);
    let mut controller = CaptureController::new(backend).unwrap();
    controller.start().unwrap();

    let result = controller.switch_device(&devices[1]);
    assert!(matches!(result, Err(CameraError::ConfigurationRejected(_))));
    assert_eq!(controller.active_device_index(), 0);
    assert_eq!(controller.active_configuration().unwrap().device.id, "a");
    assert!(controller.is_running());
    assert_eq!(*journal.opened.lock().unwrap(), ["a", "a"]);
    assert_eq!(journal.max_live.load(Ordering::SeqCst), 1);
}

#[test]
fn test_rejected_switch_while_stopped_stays_stopped() {
    let devices = vec![device("a"), device("b")];
    let mut controller =
        CaptureController::new(ScriptedBackend::new(devices.clone()).rejecting("b")).unwrap();
    controller.start().unwrap();
    controller.stop();

    assert!(controller.switch_device(&devices[1]).is_err());
    assert_eq!(controller.active_device_index(), 0);
    assert!(!controller.is_running());
    assert!(matches!(controller.state(), SessionState::Stopped(_)));
}

#[test]
fn test_unlocked_device_can_be_retried() {
    let devices = vec![device("a"), device("b")];
    let backend = ScriptedBackend::new(devices.clone()).rejecting("b");
    let locked = Arc::clone(&backend.locked);
    let mut controller = CaptureController::new(backend).unwrap();
    controller.start().unwrap();
    assert!(controller.switch_device(&devices[1]).is_err());

    locked.lock().unwrap().clear();
    controller.switch_device(&devices[1]).unwrap();
    assert_eq!(controller.active_device_index(), 1);
    assert_eq!(controller.active_configuration().unwrap().device.id, "b");
}

#[test]
fn test_rejected_first_start_stays_unconfigured() {
    let mut controller =
        CaptureController::new(ScriptedBackend::new(vec![device("a")]).rejecting("a")).unwrap();
    assert!(controller.start().is_err());
    assert!(matches!(controller.state(), SessionState::Unconfigured));
}

#[test]
fn test_device_without_formats() {
    let bare = Device {
        id: "bare".to_string(),
        name: "Bare".to_string(),
        formats: Vec::new(),
    };
    let mut controller = CaptureController::new(ScriptedBackend::new(vec![bare])).unwrap();
    assert!(matches!(controller.start(), Err(CameraError::NoFormats(_))));
    assert!(matches!(controller.state(), SessionState::Unconfigured));
}

#[test]
fn test_select_device_before_start() {
    let mut controller =
        CaptureController::new(ScriptedBackend::new(vec![device("a"), device("b")])).unwrap();
    controller.select_device(1).unwrap();
    assert_eq!(controller.active_device().id, "b");
    assert!(!controller.is_running());
    assert!(matches!(
        controller.select_device(2),
        Err(CameraError::DeviceNotFound(2))
    ));

    controller.start().unwrap();
    assert_eq!(controller.active_configuration().unwrap().device.id, "b");
}

#[test]
fn test_frames_arrive_in_capture_order() {
    let mut controller = CaptureController::new(ScriptedBackend::new(vec![device("a")])).unwrap();
    let collector = Arc::new(Collector::default());
    controller.set_observer(&collector);
    controller.start().unwrap();

    let seen = collector.wait_for(10);
    controller.stop();

    for (i, sequence) in seen.iter().enumerate() {
        assert_eq!(*sequence, i as u64);
    }
    assert!(controller.stats().delivered() >= 10);
}

#[test]
fn test_no_frames_after_stop_returns() {
    let mut controller = CaptureController::new(ScriptedBackend::new(vec![device("a")])).unwrap();
    let collector = Arc::new(Collector::default());
    controller.set_observer(&collector);
    controller.start().unwrap();
    collector.wait_for(3);
    controller.stop();

    let count = collector.sequences.lock().unwrap().len();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(collector.sequences.lock().unwrap().len(), count);
}

#[test]
fn test_dropped_observer_discards_frames() {
    let mut controller = CaptureController::new(ScriptedBackend::new(vec![device("a")])).unwrap();
    let collector = Arc::new(Collector::default());
    controller.set_observer(&collector);
    drop(collector);

    controller.start().unwrap();
    thread::sleep(Duration::from_millis(20));
    controller.stop();
    assert_eq!(controller.stats().delivered(), 0);
}

#[test]
fn test_dropped_samples_are_counted() {
    let mut controller =
        CaptureController::new(ScriptedBackend::new(vec![device("a")]).dropping_every(2))
            .unwrap();
    let collector = Arc::new(Collector::default());
    controller.set_observer(&collector);
    controller.start().unwrap();

    let seen = collector.wait_for(5);
    controller.stop();

    assert!(controller.stats().dropped() >= 4);
    // Drops do not consume sequence numbers
    assert_eq!(&seen[..5], &[0, 1, 2, 3, 4]);
}
