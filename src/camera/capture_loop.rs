//! Background capture thread implementation.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, Weak};

use super::backend::{CaptureBackend, FrameObserver, FrameStream, Sample};
use super::types::{ActiveConfiguration, CameraError, Frame};

/// Commands sent to the capture thread.
pub enum CaptureCommand {
    Stop,
}

/// Non-owning observer registration shared with the capture thread.
pub(crate) type ObserverSlot = Arc<Mutex<Option<Weak<dyn FrameObserver>>>>;

/// Counters shared between the controller and its capture threads.
#[derive(Debug, Default)]
pub struct CaptureStats {
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl CaptureStats {
    /// Frames handed to a live observer.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Samples discarded by the capture layer.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Everything the capture thread needs, moved into it at spawn.
pub(crate) struct CaptureJob<B: CaptureBackend> {
    pub backend: Arc<B>,
    pub config: ActiveConfiguration,
    pub observer: ObserverSlot,
    pub stats: Arc<CaptureStats>,
    pub stop: Arc<AtomicBool>,
    pub commands: Receiver<CaptureCommand>,
    pub ready: Sender<Result<(), CameraError>>,
}

/// Run the capture loop in a background thread.
///
/// Reports on `ready` once the stream is open (or failed to open), then
/// delivers frames in capture order until stopped or the stream fails.
pub(crate) fn run_capture_loop<B: CaptureBackend>(job: CaptureJob<B>) {
    let CaptureJob {
        backend,
        config,
        observer,
        stats,
        stop,
        commands,
        ready,
    } = job;

    let mut stream = match backend.open(&config) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    let _ = ready.send(Ok(()));

    let mut sequence = 0u64;
    while !stop.load(Ordering::Relaxed) {
        if let Ok(CaptureCommand::Stop) = commands.try_recv() {
            break;
        }

        match stream.next_sample() {
            Ok(Sample::Frame(mut frame)) => {
                frame.sequence = sequence;
                sequence += 1;
                deliver(&observer, &stats, frame);
            }
            Ok(Sample::Dropped) => {
                stats.dropped.fetch_add(1, Ordering::Relaxed);
                log::trace!("Dropped sample after frame {}", sequence);
            }
            Err(e) => {
                log::warn!("Capture stream for {} ended: {}", config.device.name, e);
                break;
            }
        }
    }

    stream.close();
}

fn deliver(observer: &ObserverSlot, stats: &CaptureStats, frame: Frame) {
    let target = observer
        .lock()
        .ok()
        .and_then(|slot| slot.as_ref().and_then(Weak::upgrade));

    // Nobody is listening (or the listener is gone): discard.
    if let Some(target) = target {
        target.did_capture_frame(frame);
        stats.delivered.fetch_add(1, Ordering::Relaxed);
    }
}
