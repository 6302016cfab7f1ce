//! End-to-end capture from the synthetic pattern backend.

use camview::camera::{
    CaptureBackend, CaptureController, Frame, FrameObserver, PatternBackend, Resolution,
};
use camview::menu::DeviceMenu;
use std::sync::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Default)]
struct LastFrame {
    frames: Mutex<Vec<Frame>>,
}

impl FrameObserver for LastFrame {
    fn did_capture_frame(&self, frame: Frame) {
        self.frames.lock().unwrap().push(frame);
    }
}

impl LastFrame {
    fn wait_for(&self, count: usize) -> Vec<Frame> {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            {
                let frames = self.frames.lock().unwrap();
                if frames.len() >= count {
                    return frames.clone();
                }
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("timed out waiting for {} frames", count);
    }

    fn clear(&self) {
        self.frames.lock().unwrap().clear();
    }
}

#[test]
fn test_pattern_devices_populate_menu() {
    let devices = PatternBackend::default().devices().unwrap();
    let menu = DeviceMenu::new(&devices);
    assert_eq!(menu.len(), 2);
    assert_eq!(menu.selected_title(), Some("Test Pattern (color bars)"));
}

#[test]
fn test_pattern_capture_delivers_rgba_frames() {
    let mut controller = CaptureController::new(PatternBackend::default()).unwrap();
    let observer = Arc::new(LastFrame::default());
    controller.set_observer(&observer);
    controller.start().unwrap();

    let config = controller.active_configuration().unwrap();
    assert_eq!(config.format.resolution, Resolution::new(1280, 720));

    let frames = observer.wait_for(2);
    controller.stop();

    let frame = &frames[0];
    assert_eq!(frame.extent(), Resolution::new(1280, 720));
    assert_eq!(frame.data.len(), 1280 * 720 * Frame::BYTES_PER_PIXEL);
    assert_eq!(frames[1].sequence, frames[0].sequence + 1);
    assert!(frames[1].timestamp >= frames[0].timestamp);
}

#[test]
fn test_pattern_switch_changes_source() {
    let mut controller = CaptureController::new(PatternBackend::default()).unwrap();
    let observer = Arc::new(LastFrame::default());
    controller.set_observer(&observer);
    controller.start().unwrap();
    let bars = observer.wait_for(1).remove(0);

    let gradient_device = controller.devices()[1].clone();
    controller.switch_device(&gradient_device).unwrap();
    observer.clear();
    let gradient = observer.wait_for(1).remove(0);
    controller.stop();

    assert_eq!(
        controller.active_configuration().unwrap().device.id,
        "pattern:gradient"
    );
    assert_ne!(bars.data, gradient.data);
}
