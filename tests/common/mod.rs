//! Scripted capture backend shared by the integration tests.
//!
//! Every open and close is recorded so tests can check that only one
//! session is ever live. Devices can be locked (open fails) and the whole
//! backend can be gated behind an access flag, like a platform camera stack
//! before the user grants permission.

#![allow(dead_code)]

use camview::camera::{
    ActiveConfiguration, CameraError, CaptureBackend, ColorSpace, Device, Format, Frame,
    FrameObserver, FrameRateRange, FrameStream, PixelEncoding, Resolution, Sample,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Default)]
pub struct Journal {
    pub opened: Mutex<Vec<String>>,
    pub closed: AtomicUsize,
    pub live: AtomicUsize,
    pub max_live: AtomicUsize,
    pub enumerations: AtomicUsize,
}

pub struct ScriptedBackend {
    devices: Vec<Device>,
    pub locked: Arc<Mutex<Vec<String>>>,
    pub access: Arc<AtomicBool>,
    deny_open: bool,
    drop_every: Option<u64>,
    pub journal: Arc<Journal>,
}

impl ScriptedBackend {
    pub fn new(devices: Vec<Device>) -> Self {
        Self {
            devices,
            locked: Arc::new(Mutex::new(Vec::new())),
            access: Arc::new(AtomicBool::new(true)),
            deny_open: false,
            drop_every: None,
            journal: Arc::new(Journal::default()),
        }
    }

    /// Opening `id` fails until it is removed from `locked`.
    pub fn rejecting(self, id: &str) -> Self {
        self.locked.lock().unwrap().push(id.to_string());
        self
    }

    /// Enumeration fails until `access` is set.
    pub fn without_access(self) -> Self {
        self.access.store(false, Ordering::SeqCst);
        self
    }

    /// Opening any device fails with a permission error.
    pub fn denying_open(mut self) -> Self {
        self.deny_open = true;
        self
    }

    pub fn dropping_every(mut self, n: u64) -> Self {
        self.drop_every = Some(n);
        self
    }
}

impl CaptureBackend for ScriptedBackend {
    type Stream = ScriptedStream;

    fn devices(&self) -> Result<Vec<Device>, CameraError> {
        self.journal.enumerations.fetch_add(1, Ordering::SeqCst);
        if !self.access.load(Ordering::SeqCst) {
            return Err(CameraError::QueryFailed("not authorized".to_string()));
        }
        Ok(self.devices.clone())
    }

    fn open(&self, config: &ActiveConfiguration) -> Result<ScriptedStream, CameraError> {
        if self.deny_open {
            return Err(CameraError::PermissionDenied);
        }
        if self.locked.lock().unwrap().contains(&config.device.id) {
            return Err(CameraError::ConfigurationRejected(format!(
                "{} is locked",
                config.device.id
            )));
        }

        self.journal
            .opened
            .lock()
            .unwrap()
            .push(config.device.id.clone());
        let live = self.journal.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.journal.max_live.fetch_max(live, Ordering::SeqCst);

        Ok(ScriptedStream {
            resolution: config.format.resolution,
            drop_every: self.drop_every,
            samples: 0,
            journal: Arc::clone(&self.journal),
        })
    }
}

pub struct ScriptedStream {
    resolution: Resolution,
    drop_every: Option<u64>,
    samples: u64,
    journal: Arc<Journal>,
}

impl FrameStream for ScriptedStream {
    fn next_sample(&mut self) -> Result<Sample, CameraError> {
        thread::sleep(Duration::from_millis(1));
        self.samples += 1;
        if self.drop_every.is_some_and(|n| self.samples % n == 0) {
            return Ok(Sample::Dropped);
        }

        let (w, h) = (self.resolution.width, self.resolution.height);
        Ok(Sample::Frame(Frame {
            data: vec![0x80; (w * h) as usize * Frame::BYTES_PER_PIXEL],
            width: w,
            height: h,
            color_space: ColorSpace::Srgb,
            sequence: u64::MAX,
            timestamp: Instant::now(),
        }))
    }

    fn close(&mut self) {
        self.journal.live.fetch_sub(1, Ordering::SeqCst);
        self.journal.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct Collector {
    pub sequences: Mutex<Vec<u64>>,
}

impl FrameObserver for Collector {
    fn did_capture_frame(&self, frame: Frame) {
        self.sequences.lock().unwrap().push(frame.sequence);
    }
}

impl Collector {
    pub fn wait_for(&self, count: usize) -> Vec<u64> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            let seen = self.sequences.lock().unwrap().clone();
            if seen.len() >= count {
                return seen;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("timed out waiting for {} frames", count);
    }
}

pub fn format(width: u32, height: u32, max_rate: f64) -> Format {
    Format::new(
        Resolution::new(width, height),
        PixelEncoding::Yuyv,
        vec![FrameRateRange::new(1.0, max_rate)],
    )
}

pub fn device(id: &str) -> Device {
    Device {
        id: id.to_string(),
        name: format!("Camera {}", id.to_uppercase()),
        formats: vec![format(4, 3, 60.0), format(8, 6, 30.0), format(16, 12, 24.0)],
    }
}
