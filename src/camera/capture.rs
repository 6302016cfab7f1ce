//! Capture controller: device selection and session lifecycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, Weak};
use std::thread::{self, JoinHandle};

use super::backend::{CaptureBackend, FrameObserver};
use super::capture_loop::{run_capture_loop, CaptureCommand, CaptureJob, CaptureStats, ObserverSlot};
use super::format::{frame_duration_bounds, select_format};
use super::types::{ActiveConfiguration, CameraError, Device, PixelEncoding};

/// Handle to a running capture thread.
pub struct SessionHandle {
    thread: Option<JoinHandle<()>>,
    command_tx: Sender<CaptureCommand>,
    stop_signal: Arc<AtomicBool>,
}

impl SessionHandle {
    fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Signal the thread and wait for it to exit.
    fn shutdown(mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        // Also send via channel in case the thread checks commands first
        let _ = self.command_tx.send(CaptureCommand::Stop);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                log::error!("Capture thread panicked");
            }
        }
    }
}

/// Lifecycle of the capture session.
pub enum SessionState {
    /// Never successfully configured
    Unconfigured,
    /// Configured once, not delivering frames
    Stopped(ActiveConfiguration),
    /// Delivering frames on the capture thread
    Running {
        config: ActiveConfiguration,
        handle: SessionHandle,
    },
}

impl SessionState {
    pub fn configuration(&self) -> Option<&ActiveConfiguration> {
        match self {
            SessionState::Unconfigured => None,
            SessionState::Stopped(config) => Some(config),
            SessionState::Running { config, .. } => Some(config),
        }
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Unconfigured => f.write_str("Unconfigured"),
            SessionState::Stopped(config) => f.debug_tuple("Stopped").field(config).finish(),
            SessionState::Running { config, .. } => {
                f.debug_struct("Running").field("config", config).finish_non_exhaustive()
            }
        }
    }
}

/// Owns the camera session and delivers decoded frames to an observer.
///
/// Devices are enumerated once at construction. [`start`](Self::start)
/// configures the active device and spawns a capture thread;
/// [`switch_device`](Self::switch_device) fully stops before reconfiguring,
/// so only one configuration is ever live.
pub struct CaptureController<B: CaptureBackend> {
    backend: Arc<B>,
    devices: Vec<Device>,
    active_device: usize,
    observer: ObserverSlot,
    stats: Arc<CaptureStats>,
    state: SessionState,
}

impl<B: CaptureBackend> std::fmt::Debug for CaptureController<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureController")
            .field("devices", &self.devices.len())
            .field("active_device", &self.active_device)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<B: CaptureBackend> CaptureController<B> {
    /// Enumerate devices and select the first one.
    ///
    /// # Errors
    /// * `CameraError::NoDevices` - the backend found nothing to capture from
    /// * `CameraError::QueryFailed` - the backend could not be queried
    pub fn new(backend: B) -> Result<Self, CameraError> {
        let devices = backend.devices()?;
        if devices.is_empty() {
            return Err(CameraError::NoDevices);
        }

        log::info!("Found {} camera device(s)", devices.len());
        for (i, device) in devices.iter().enumerate() {
            log::debug!("  [{}] {} with {} format(s)", i, device, device.formats.len());
        }

        Ok(Self {
            backend: Arc::new(backend),
            devices,
            active_device: 0,
            observer: Arc::new(Mutex::new(None)),
            stats: Arc::new(CaptureStats::default()),
            state: SessionState::Unconfigured,
        })
    }

    /// Devices in discovery order.
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn active_device(&self) -> &Device {
        &self.devices[self.active_device]
    }

    pub fn active_device_index(&self) -> usize {
        self.active_device
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The live (or last applied) configuration.
    pub fn active_configuration(&self) -> Option<&ActiveConfiguration> {
        self.state.configuration()
    }

    pub fn stats(&self) -> &CaptureStats {
        &self.stats
    }

    /// Register the frame observer without taking ownership of it.
    ///
    /// Once the last strong reference is dropped, frames are discarded.
    pub fn set_observer<O: FrameObserver + 'static>(&self, observer: &Arc<O>) {
        let weak: Weak<O> = Arc::downgrade(observer);
        self.register_observer(weak);
    }

    /// Register an already downgraded observer.
    pub fn register_observer(&self, observer: Weak<dyn FrameObserver>) {
        if let Ok(mut slot) = self.observer.lock() {
            *slot = Some(observer);
        }
    }

    /// Check if the capture thread is currently delivering frames.
    pub fn is_running(&self) -> bool {
        match &self.state {
            SessionState::Running { handle, .. } => !handle.is_finished(),
            _ => false,
        }
    }

    /// Build the configuration `start` would apply to `device`.
    ///
    /// # Errors
    /// * `CameraError::NoFormats` - the device lists no capture formats
    pub fn configure(device: &Device) -> Result<ActiveConfiguration, CameraError> {
        let format = select_format(&device.formats)
            .ok_or_else(|| CameraError::NoFormats(device.name.clone()))?
            .clone();
        let frame_durations = frame_duration_bounds(&format);

        Ok(ActiveConfiguration {
            device: device.clone(),
            format,
            frame_durations,
            output_encoding: PixelEncoding::Rgba,
        })
    }

    /// Tear down any existing session and start a fresh one on the active device.
    ///
    /// On failure the previous configuration stays recorded but nothing is
    /// delivering frames.
    ///
    /// # Errors
    /// * `CameraError::NoFormats` - the device lists no capture formats
    /// * any error the backend reports while opening the stream
    pub fn start(&mut self) -> Result<(), CameraError> {
        self.stop();

        let config = Self::configure(self.active_device())?;

        let stop_signal = Arc::new(AtomicBool::new(false));
        let (command_tx, command_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        let job = CaptureJob {
            backend: Arc::clone(&self.backend),
            config: config.clone(),
            observer: Arc::clone(&self.observer),
            stats: Arc::clone(&self.stats),
            stop: Arc::clone(&stop_signal),
            commands: command_rx,
            ready: ready_tx,
        };

        let thread = thread::Builder::new()
            .name("camera-capture".to_string())
            .spawn(move || run_capture_loop(job))
            .map_err(|e| CameraError::StreamFailed(e.to_string()))?;

        let handle = SessionHandle {
            thread: Some(thread),
            command_tx,
            stop_signal,
        };

        // Wait for the thread to report success or failure
        let opened = ready_rx.recv().unwrap_or_else(|_| {
            Err(CameraError::StreamFailed(
                "Capture thread terminated unexpectedly".to_string(),
            ))
        });

        match opened {
            Ok(()) => {
                log::info!("Capture started: {}", config);
                self.state = SessionState::Running { config, handle };
                Ok(())
            }
            Err(e) => {
                handle.shutdown();
                log::warn!("Failed to configure {}: {}", config.device.name, e);
                Err(e)
            }
        }
    }

    /// Stop delivering frames. Safe to call when not running.
    ///
    /// Returns once the capture thread has exited; a callback already in
    /// flight completes first.
    pub fn stop(&mut self) {
        let state = std::mem::replace(&mut self.state, SessionState::Unconfigured);
        self.state = match state {
            SessionState::Running { config, handle } => {
                handle.shutdown();
                log::info!("Capture stopped: {}", config.device.name);
                SessionState::Stopped(config)
            }
            other => other,
        };
    }

    /// Make device `index` active without starting capture.
    ///
    /// A running session is restarted on the new device.
    ///
    /// # Errors
    /// * `CameraError::DeviceNotFound` - `index` is past the end of the device list
    pub fn select_device(&mut self, index: usize) -> Result<(), CameraError> {
        if index >= self.devices.len() {
            return Err(CameraError::DeviceNotFound(index));
        }
        if matches!(self.state, SessionState::Running { .. }) {
            let device = self.devices[index].clone();
            return self.switch_device(&device);
        }
        self.active_device = index;
        Ok(())
    }

    /// Stop, make `device` active, and start again.
    ///
    /// Devices are matched by id; one that was not enumerated is ignored.
    /// If `device` cannot be started, the previous device stays active and
    /// is restarted when it was running.
    pub fn switch_device(&mut self, device: &Device) -> Result<(), CameraError> {
        let Some(index) = self.devices.iter().position(|d| d.id == device.id) else {
            log::debug!("Ignoring switch to unknown device {}", device);
            return Ok(());
        };

        let previous = self.active_device;
        let was_running = matches!(self.state, SessionState::Running { .. });

        self.stop();
        self.active_device = index;
        log::info!("Switching to {}", self.devices[index].name);
        if let Err(e) = self.start() {
            self.active_device = previous;
            if was_running {
                log::info!("Restoring {}", self.devices[previous].name);
                if let Err(restore) = self.start() {
                    log::warn!("Failed to restore {}: {}", self.devices[previous].name, restore);
                }
            }
            return Err(e);
        }
        Ok(())
    }
}

impl<B: CaptureBackend> Drop for CaptureController<B> {
    fn drop(&mut self) {
        self.stop();
    }
}
