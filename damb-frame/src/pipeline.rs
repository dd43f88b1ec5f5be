//! Threaded mix pipeline
//!
//! Producers push per-frame inputs through a channel; a worker thread joins
//! each frame's primary and secondary, mixes them, and emits the result.

use crate::frame::{AudioFrame, ClipInfo};
use crate::join::{FrameJoin, Role};
use crate::PipelineError;
use crossbeam::channel::{self, Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use damb_mix::{AudioMixer, MixConfig};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const INPUT_CAPACITY: usize = 32;
const OUTPUT_CAPACITY: usize = 32;
const POLL_INTERVAL: Duration = Duration::from_millis(5);

struct PipelineInput {
    n: u64,
    role: Role,
    frame: AudioFrame,
}

/// One mixed frame, or why frame `n` could not be mixed
#[derive(Debug)]
pub struct MixedOutput {
    pub n: u64,
    pub result: Result<AudioFrame, PipelineError>,
}

/// Cloneable handle for an upstream producer
#[derive(Clone)]
pub struct PipelineSender {
    tx: Sender<PipelineInput>,
}

impl PipelineSender {
    /// Deliver one input; blocks while the pipeline is saturated
    pub fn submit(&self, n: u64, role: Role, frame: AudioFrame) -> Result<(), PipelineError> {
        self.tx
            .send(PipelineInput { n, role, frame })
            .map_err(|_| PipelineError::Disconnected)
    }
}

/// Two-input mixer running on its own thread
///
/// Outputs go through a bounded channel; when the consumer falls behind the
/// worker stops pulling inputs, which in turn blocks producers.
pub struct MixPipeline {
    clip: ClipInfo,
    sender: Option<PipelineSender>,
    output_rx: Receiver<MixedOutput>,
    stats: Arc<PipelineCounters>,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct PipelineCounters {
    frames_mixed: AtomicU64,
    frames_dropped: AtomicU64,
}

/// State owned by the worker thread
struct MixWorker {
    mixer: AudioMixer,
    join: FrameJoin,
    clip: ClipInfo,
    output_tx: Sender<MixedOutput>,
    stats: Arc<PipelineCounters>,
    running: Arc<AtomicBool>,
}

impl MixWorker {
    fn run(mut self, input_rx: Receiver<PipelineInput>) {
        loop {
            match input_rx.recv_timeout(POLL_INTERVAL) {
                Ok(input) => {
                    if !self.handle(input) {
                        break;
                    }
                }
                // Stopping only once the queue is empty keeps every
                // submitted pair
                Err(RecvTimeoutError::Timeout) if self.running.load(Ordering::Relaxed) => {}
                Err(_) => break,
            }
        }

        let pending = self.join.pending();
        if pending > 0 {
            log::warn!("Mix pipeline dropped {} incomplete frames", pending);
        }
        log::info!("Mix pipeline thread exiting");
    }

    /// Returns `false` once nobody can receive outputs any more
    fn handle(&mut self, input: PipelineInput) -> bool {
        let n = input.n;

        let result = match self.join.submit(n, input.role, input.frame) {
            Ok(false) => return true,
            Ok(true) => match self.join.try_take(n) {
                Some((primary, secondary)) => self.mix(n, &primary, &secondary),
                None => return true,
            },
            Err(err) => Err(err),
        };

        self.emit(MixedOutput { n, result })
    }

    fn mix(&mut self, n: u64, primary: &AudioFrame, secondary: &AudioFrame) -> Result<AudioFrame, PipelineError> {
        if !self.clip.matches_frame(primary) {
            log::warn!(
                "Frame {} carries {:?} sample frames, clip timing implies {:.1}",
                n,
                primary.sample_frames(),
                self.clip.samples_per_frame(primary.info.sample_rate)
            );
        }

        let mixed = self.mixer.mix_frame(primary.as_buffer(), secondary.as_buffer())?;
        self.stats.frames_mixed.fetch_add(1, Ordering::Relaxed);
        log::debug!("Mixed frame {}", n);

        Ok(AudioFrame::new(mixed.data.to_vec(), mixed.info))
    }

    /// Blocks while the output is full; gives up on a frame only after
    /// shutdown has been requested
    fn emit(&self, mut output: MixedOutput) -> bool {
        loop {
            match self.output_tx.send_timeout(output, POLL_INTERVAL) {
                Ok(()) => return true,
                Err(SendTimeoutError::Timeout(rejected)) => {
                    if !self.running.load(Ordering::Relaxed) {
                        self.stats.frames_dropped.fetch_add(1, Ordering::Relaxed);
                        log::warn!("Output full during shutdown, dropping frame {}", rejected.n);
                        return true;
                    }
                    output = rejected;
                }
                Err(SendTimeoutError::Disconnected(_)) => return false,
            }
        }
    }
}

impl MixPipeline {
    /// Validate both clips and start the worker.
    ///
    /// The output clip takes the primary's length and rate.
    pub fn spawn(config: MixConfig, primary: ClipInfo, secondary: ClipInfo) -> Result<Self, PipelineError> {
        primary.validate()?;
        secondary.validate()?;
        let mixer = AudioMixer::new(config)?;

        let (input_tx, input_rx) = channel::bounded(INPUT_CAPACITY);
        let (output_tx, output_rx) = channel::bounded(OUTPUT_CAPACITY);
        let stats = Arc::new(PipelineCounters::default());
        let running = Arc::new(AtomicBool::new(true));

        let worker = MixWorker {
            mixer,
            join: FrameJoin::new(),
            clip: primary,
            output_tx,
            stats: stats.clone(),
            running: running.clone(),
        };

        let thread_handle = thread::Builder::new()
            .name("damb-mix".to_string())
            .spawn(move || worker.run(input_rx))
            .map_err(|err| PipelineError::Spawn(err.to_string()))?;

        Ok(MixPipeline {
            clip: primary,
            sender: Some(PipelineSender { tx: input_tx }),
            output_rx,
            stats,
            running,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn clip_info(&self) -> ClipInfo {
        self.clip
    }

    /// Handle for a producer; fails once the pipeline is shut down
    pub fn sender(&self) -> Result<PipelineSender, PipelineError> {
        self.sender.clone().ok_or(PipelineError::Disconnected)
    }

    /// Deliver one input from this thread
    pub fn submit(&self, n: u64, role: Role, frame: AudioFrame) -> Result<(), PipelineError> {
        self.sender()?.submit(n, role, frame)
    }

    /// Wait for the next mixed frame, in completion order.
    ///
    /// After shutdown this keeps returning buffered outputs, then fails.
    pub fn recv(&self) -> Result<MixedOutput, PipelineError> {
        self.output_rx.recv().map_err(|_| PipelineError::Disconnected)
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<MixedOutput> {
        self.output_rx.recv_timeout(timeout).ok()
    }

    pub fn frames_mixed(&self) -> u64 {
        self.stats.frames_mixed.load(Ordering::Relaxed)
    }

    /// Mixed frames discarded because the output was full at shutdown
    pub fn frames_dropped(&self) -> u64 {
        self.stats.frames_dropped.load(Ordering::Relaxed)
    }

    /// Stop accepting inputs, mix everything already queued, and wait for
    /// the worker.
    ///
    /// Outputs stay readable through [`MixPipeline::recv`] up to the output
    /// capacity; anything beyond it is dropped and counted.
    pub fn shutdown(&mut self) {
        self.sender = None;
        self.running.store(false, Ordering::Relaxed);

        if let Some(handle) = self.thread_handle.take() {
            handle.join().ok();
        }
    }
}

impl Drop for MixPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}
