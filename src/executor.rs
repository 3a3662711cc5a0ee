//! Batch resize execution and progress reporting.
//!
//! ## Run Lifecycle
//!
//! ```text
//! caller thread                          worker thread
//! ─────────────                          ─────────────
//! validate ratio + batch
//! ResizeExecutor::start ───spawn───────▶ run_batch
//!                                          for each path, in order:
//!                                            open → fit → write   (or record failure)
//!   RunHandle::drive ◀──── FileWritten / FileFailed
//!     observer.on_*  ◀──── Progress { percent }
//!                    ◀──── Completed(report)      (exactly once)
//! ```
//!
//! Per file the state machine is `Pending → Opened → {Static | Animated} →
//! Written | Failed`. A failure of any kind (unreadable file, decode error,
//! source too small for the ratio, full disk, a panic inside the image
//! codec) is recorded in the [`BatchReport`] and the batch moves on. The
//! completed count advances for failures too, so progress always ends at
//! 100 unless the run is cancelled.
//!
//! ## Threading
//!
//! Exactly one worker thread per run, processing files sequentially. The
//! only state shared with the caller is the event channel, the liveness
//! flag, and the cancel flag. Observer callbacks run on whichever thread
//! calls [`RunHandle::drive`], never on the worker.

use crate::config::ResizerConfig;
use crate::imaging::{FittedImage, ImageBackend, SourceImage, fit_source};
use crate::imaging::{BackendError, PlanError};
use crate::naming::{self, DEFAULT_SUFFIX, OutputKind, SuffixError};
use crate::ratio::Ratio;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Per-file failure. Never aborts the batch.
#[derive(Error, Debug)]
pub enum ResizeError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("cannot derive an output file name from {0}")]
    OutputName(PathBuf),
    #[error("image processing panicked: {0}")]
    Panicked(String),
}

/// Reasons a run is refused before any file is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartError {
    #[error("no images to resize")]
    EmptyBatch,
    #[error("batch entry {index} is an empty path")]
    EmptyPath { index: usize },
    #[error(transparent)]
    InvalidSuffix(#[from] SuffixError),
    #[error("a resize run is already in progress")]
    AlreadyRunning,
    #[error("failed to spawn resize worker: {0}")]
    Spawn(String),
}

/// Check the caller-side preconditions of a batch.
pub fn validate_batch(batch: &[PathBuf]) -> Result<(), StartError> {
    if batch.is_empty() {
        return Err(StartError::EmptyBatch);
    }
    if let Some(index) = batch.iter().position(|p| p.as_os_str().is_empty()) {
        return Err(StartError::EmptyPath { index });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeOptions {
    /// Inserted between the file stem and the extension.
    pub suffix: String,
}

impl ResizeOptions {
    /// Options with a checked output suffix.
    pub fn new(suffix: impl Into<String>) -> Result<Self, SuffixError> {
        let suffix = suffix.into();
        naming::validate_suffix(&suffix)?;
        Ok(Self { suffix })
    }

    /// Re-check the suffix; the field is public and may have been edited.
    pub fn validate(&self) -> Result<(), SuffixError> {
        naming::validate_suffix(&self.suffix)
    }

    pub fn from_config(config: &ResizerConfig) -> Self {
        Self {
            suffix: config.resize.suffix.clone(),
        }
    }
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

/// Result for one batch entry.
#[derive(Debug)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub result: Result<PathBuf, ResizeError>,
}

/// Aggregate of a run, in batch order.
///
/// Holds one [`FileOutcome`] per processed path. When the run was cancelled,
/// `files.len() < total` and the tail of the batch was never opened.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub total: usize,
    pub files: Vec<FileOutcome>,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.result.is_ok()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = (&Path, &ResizeError)> {
        self.files
            .iter()
            .filter_map(|f| f.result.as_ref().err().map(|e| (f.source.as_path(), e)))
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Path> {
        self.files
            .iter()
            .filter_map(|f| f.result.as_ref().ok().map(PathBuf::as_path))
    }
}

/// Events published by a run, in the order they happen.
#[derive(Debug)]
pub enum ResizeEvent {
    Started {
        total: usize,
        ratio: Ratio,
    },
    FileWritten {
        index: usize,
        source: PathBuf,
        output: PathBuf,
    },
    FileFailed {
        index: usize,
        source: PathBuf,
        message: String,
    },
    /// Published after every processed file, success or failure.
    Progress {
        completed: usize,
        total: usize,
        percent: u8,
    },
    /// Published exactly once, last.
    Completed(BatchReport),
}

/// Receives run callbacks on the caller's own thread.
pub trait ProgressObserver {
    /// Called after every processed file with `floor(completed * 100 / total)`.
    fn on_progress(&mut self, percent: u8);

    /// Called exactly once when the run ends, however many files failed.
    fn on_complete(&mut self, report: &BatchReport);

    /// A single file could not be resized; the batch continues.
    fn on_file_error(&mut self, path: &Path, message: &str) {
        let _ = (path, message);
    }

    /// A single file was resized and written.
    fn on_file_done(&mut self, source: &Path, output: &Path) {
        let _ = (source, output);
    }
}

impl ResizeEvent {
    /// Forward this event to the matching observer callback.
    pub fn dispatch(&self, observer: &mut impl ProgressObserver) {
        match self {
            ResizeEvent::Started { .. } => {}
            ResizeEvent::FileWritten { source, output, .. } => {
                observer.on_file_done(source, output)
            }
            ResizeEvent::FileFailed {
                source, message, ..
            } => observer.on_file_error(source, message),
            ResizeEvent::Progress { percent, .. } => observer.on_progress(*percent),
            ResizeEvent::Completed(report) => observer.on_complete(report),
        }
    }
}

/// Integer percentage of `completed` over `total`, rounded down.
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (completed.min(total) * 100 / total) as u8
}

/// Cooperative cancellation flag, checked by the worker between files.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Open, fit, and write one file.
fn resize_file(
    backend: &dyn ImageBackend,
    source_path: &Path,
    ratio: Ratio,
    options: &ResizeOptions,
) -> Result<PathBuf, ResizeError> {
    let source = backend.open(source_path)?;
    let kind = match &source {
        SourceImage::Static { format, .. } => {
            OutputKind::Static(naming::static_output_format(source_path, *format))
        }
        SourceImage::Animated { .. } => OutputKind::Animated,
    };
    let output = naming::output_path(source_path, kind, &options.suffix)
        .ok_or_else(|| ResizeError::OutputName(source_path.to_path_buf()))?;
    debug!(
        source = %source_path.display(),
        frames = source.frame_count(),
        "opened"
    );

    match fit_source(source, ratio)? {
        FittedImage::Static { image, .. } => backend.save_static(&image, kind.format(), &output)?,
        FittedImage::Animated { frames } => backend.save_animated(frames, &output)?,
    }
    Ok(output)
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Resize every path in `batch` on the current thread, publishing events
/// through `emit`.
///
/// Files are processed strictly in order. One `Progress` event follows every
/// processed file and `Completed` is always the final event.
pub fn run_batch(
    backend: &dyn ImageBackend,
    batch: &[PathBuf],
    ratio: Ratio,
    options: &ResizeOptions,
    cancel: &CancelFlag,
    mut emit: impl FnMut(ResizeEvent),
) {
    let total = batch.len();
    info!(total, %ratio, "starting resize batch");
    emit(ResizeEvent::Started { total, ratio });

    let mut report = BatchReport {
        total,
        ..Default::default()
    };

    for (index, path) in batch.iter().enumerate() {
        if cancel.is_cancelled() {
            info!(processed = index, total, "resize batch cancelled");
            report.cancelled = true;
            break;
        }

        let result = catch_unwind(AssertUnwindSafe(|| {
            resize_file(backend, path, ratio, options)
        }))
        .unwrap_or_else(|payload| Err(ResizeError::Panicked(panic_message(payload))));

        match &result {
            Ok(output) => {
                info!(source = %path.display(), output = %output.display(), "resized");
                emit(ResizeEvent::FileWritten {
                    index,
                    source: path.clone(),
                    output: output.clone(),
                });
            }
            Err(e) => {
                warn!(source = %path.display(), error = %e, "resize failed, continuing");
                emit(ResizeEvent::FileFailed {
                    index,
                    source: path.clone(),
                    message: e.to_string(),
                });
            }
        }
        report.files.push(FileOutcome {
            source: path.clone(),
            result,
        });

        let completed = index + 1;
        emit(ResizeEvent::Progress {
            completed,
            total,
            percent: progress_percent(completed, total),
        });
    }

    info!(
        succeeded = report.succeeded(),
        failed = report.files.len() - report.succeeded(),
        "resize batch complete"
    );
    emit(ResizeEvent::Completed(report));
}

/// Clears the executor's liveness flag when the worker exits, panic or not.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs batches on a background worker, one at a time.
///
/// Holds the backend and options for its runs; there is no process-wide
/// state, so independent executors can run side by side.
pub struct ResizeExecutor<B> {
    backend: Arc<B>,
    options: ResizeOptions,
    running: Arc<AtomicBool>,
}

impl<B: ImageBackend + 'static> ResizeExecutor<B> {
    pub fn new(backend: B, options: ResizeOptions) -> Self {
        Self {
            backend: Arc::new(backend),
            options,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn options(&self) -> &ResizeOptions {
        &self.options
    }

    /// Whether a run started by this executor is still in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Start a run on a new worker thread.
    ///
    /// Fails without side effects if the batch or the output suffix is
    /// invalid, or a run is already active; in the latter case the request
    /// is simply dropped.
    pub fn start(&self, batch: Vec<PathBuf>, ratio: Ratio) -> Result<RunHandle, StartError> {
        validate_batch(&batch)?;
        self.options.validate()?;
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("resize run requested while another is active, ignoring");
            return Err(StartError::AlreadyRunning);
        }

        let (tx, rx) = mpsc::channel();
        let cancel = CancelFlag::new();
        let worker_cancel = cancel.clone();
        let backend = Arc::clone(&self.backend);
        let options = self.options.clone();
        let guard = RunningGuard(Arc::clone(&self.running));

        let spawned = thread::Builder::new()
            .name("resize-worker".into())
            .spawn(move || {
                let _guard = guard;
                run_batch(
                    backend.as_ref(),
                    &batch,
                    ratio,
                    &options,
                    &worker_cancel,
                    |event| {
                        // Receiver gone means nobody is listening; keep working
                        let _ = tx.send(event);
                    },
                );
            });

        match spawned {
            Ok(worker) => Ok(RunHandle {
                events: rx,
                cancel,
                worker,
            }),
            Err(e) => {
                // The closure (and its guard) was dropped, clearing the flag
                Err(StartError::Spawn(e.to_string()))
            }
        }
    }
}

/// Caller-side end of a run.
pub struct RunHandle {
    events: Receiver<ResizeEvent>,
    cancel: CancelFlag,
    worker: JoinHandle<()>,
}

impl RunHandle {
    /// Ask the worker to stop before the next file.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A clone of the cancel flag, for cancelling from another thread
    /// while [`drive`](Self::drive) blocks.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Raw event stream, for callers that poll from their own event loop.
    pub fn events(&self) -> &Receiver<ResizeEvent> {
        &self.events
    }

    /// Block until the run ends, dispatching every event to `observer` on
    /// the current thread, then join the worker.
    ///
    /// Returns the batch report, or `None` if the worker died without
    /// completing.
    pub fn drive(self, observer: &mut impl ProgressObserver) -> Option<BatchReport> {
        let mut report = None;
        for event in self.events.iter() {
            event.dispatch(observer);
            if let ResizeEvent::Completed(r) = event {
                report = Some(r);
            }
        }
        if self.worker.join().is_err() {
            warn!("resize worker terminated abnormally");
        }
        report
    }
}
