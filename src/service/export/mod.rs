//! Chunked, pausable, cancellable export of synthesized numbers.
//!
//! An [`ExportSession`] owns one worker thread that runs the synthesis loop,
//! accumulates lines in a [`ChunkBuffer`] and writes full chunks to a
//! [`ByteSink`]. Observers talk to the worker only through the shared
//! [`SessionControl`].
//!
//! [`ExportCoordinator`] keeps at most one live session per service and
//! resolves output names inside the configured output directory.

mod buffer;
mod control;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

pub use buffer::ChunkBuffer;
pub use control::SessionControl;

use crate::config::ExportConfig;
use crate::domain::{ExportSummary, GenerationRequest, SessionSnapshot, SessionState};
use crate::error::{AppError, ExportError};
use crate::service::synthesizer::Synthesizer;
use crate::storage::{ByteSink, FileSink};

/// Counter of numbers handed to sinks.
pub const METRIC_NUMBERS_GENERATED: &str = "luhngen_numbers_generated_total";
/// Counter of bytes handed to sinks.
pub const METRIC_BYTES_WRITTEN: &str = "luhngen_bytes_written_total";
/// Counter of finished sessions, labelled by outcome.
pub const METRIC_SESSIONS: &str = "luhngen_export_sessions_total";
/// Gauge of sessions currently running or paused.
pub const METRIC_ACTIVE: &str = "luhngen_export_active";

/// Default chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Default upper bound on a single pause wait.
pub const DEFAULT_PAUSE_POLL: Duration = Duration::from_millis(250);

/// Per-session tuning.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Bytes per sink write.
    pub chunk_size: usize,

    /// Upper bound on a single pause wait.
    pub pause_poll_interval: Duration,

    /// Seed for a reproducible run; OS entropy when `None`.
    pub seed: Option<u64>,

    /// Destination name shown in snapshots.
    pub output: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            pause_poll_interval: DEFAULT_PAUSE_POLL,
            seed: None,
            output: "memory".to_string(),
        }
    }
}

impl ExportOptions {
    /// Options taken from the export configuration.
    #[must_use]
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            pause_poll_interval: Duration::from_millis(config.pause_poll_ms),
            ..Self::default()
        }
    }

    /// Set the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Set the destination name.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }
}

/// Handle to a running export.
///
/// Dropping the handle cancels the worker and waits for it, so no thread
/// outlives its session.
#[derive(Debug)]
pub struct ExportSession {
    control: Arc<SessionControl>,
    worker: Option<JoinHandle<Result<ExportSummary, ExportError>>>,
}

impl ExportSession {
    /// Start exporting `request` into `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Spawn`] if the worker thread cannot be created.
    pub fn start(
        request: GenerationRequest,
        sink: Box<dyn ByteSink>,
        options: ExportOptions,
    ) -> Result<Self, ExportError> {
        let control = Arc::new(SessionControl::new(request.count(), options.output.clone()));
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let synth = Synthesizer::from(request);

        control.mark_running();
        info!(
            session_id = %control.id(),
            count = control.requested(),
            output = %options.output,
            chunk_size = options.chunk_size,
            seeded = options.seed.is_some(),
            "Export session started"
        );

        let worker = Worker {
            control: Arc::clone(&control),
            synth,
            sink,
            rng,
            buffer: ChunkBuffer::new(options.chunk_size),
            pause_poll: options.pause_poll_interval,
        };

        metrics::gauge!(METRIC_ACTIVE).increment(1.0);
        let spawned = thread::Builder::new()
            .name(format!("export-{}", control.id().simple()))
            .spawn(move || worker.run());

        match spawned {
            Ok(handle) => Ok(Self {
                control,
                worker: Some(handle),
            }),
            Err(e) => {
                metrics::gauge!(METRIC_ACTIVE).decrement(1.0);
                control.finish(SessionState::Failed, Some(e.to_string()));
                Err(ExportError::Spawn(e))
            }
        }
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> uuid::Uuid {
        self.control.id()
    }

    /// Pause production. Returns `false` unless the session was running.
    ///
    /// Progress is frozen as soon as this returns. A chunk write already under
    /// way still reaches the sink; its count is published after `resume`.
    pub fn pause(&self) -> bool {
        let paused = self.control.pause();
        if paused {
            info!(session_id = %self.control.id(), produced = self.control.produced(), "Export session paused");
        }
        paused
    }

    /// Resume production. Returns `false` unless the session was paused.
    pub fn resume(&self) -> bool {
        let resumed = self.control.resume();
        if resumed {
            info!(session_id = %self.control.id(), produced = self.control.produced(), "Export session resumed");
        }
        resumed
    }

    /// Request cancellation. Returns `false` if already finished or cancelled.
    pub fn cancel(&self) -> bool {
        let cancelled = self.control.cancel();
        if cancelled {
            info!(session_id = %self.control.id(), produced = self.control.produced(), "Export session cancel requested");
        }
        cancelled
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.control.state()
    }

    /// Fraction of the requested count produced.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.control.progress()
    }

    /// Point-in-time view of the session.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.control.snapshot()
    }

    /// Whether the worker reached a terminal state.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.control.state().is_terminal()
    }

    /// Wait for the worker and return its outcome.
    ///
    /// # Errors
    ///
    /// Returns the fatal error of a failed session, or
    /// [`ExportError::WorkerPanicked`].
    pub fn join(mut self) -> Result<ExportSummary, ExportError> {
        self.join_worker()
    }

    fn join_worker(&mut self) -> Result<ExportSummary, ExportError> {
        let Some(worker) = self.worker.take() else {
            return Err(ExportError::WorkerPanicked);
        };
        worker.join().map_err(|_| ExportError::WorkerPanicked)?
    }
}

impl Drop for ExportSession {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.control.cancel();
            if let Err(e) = self.join_worker() {
                debug!(session_id = %self.control.id(), error = %e, "Export session dropped with error");
            }
        }
    }
}

/// The synthesis loop and everything it owns.
struct Worker {
    control: Arc<SessionControl>,
    synth: Synthesizer,
    sink: Box<dyn ByteSink>,
    rng: StdRng,
    buffer: ChunkBuffer,
    pause_poll: Duration,
}

impl Worker {
    fn run(mut self) -> Result<ExportSummary, ExportError> {
        let requested = self.control.requested();
        let mut produced = 0u64;
        let mut flushed = 0u64;
        let mut bytes_written = 0u64;
        let mut failure = None;

        while produced < requested {
            self.control.wait_while_paused(self.pause_poll);
            if self.control.is_cancelled() {
                break;
            }

            self.synth.write_next(&mut self.rng, self.buffer.writer());
            produced += 1;

            if self.buffer.len() >= self.buffer.chunk_size() {
                self.control.wait_while_paused(self.pause_poll);
                match self.flush_full_chunks() {
                    Ok(bytes) => {
                        bytes_written += bytes;
                        self.publish(produced, &mut flushed, bytes);
                    }
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }
        }

        if failure.is_none() {
            match self.flush_rest() {
                Ok(bytes) => {
                    bytes_written += bytes;
                    self.publish(produced, &mut flushed, bytes);
                }
                Err(e) => failure = Some(e),
            }
        }

        let closed = self.sink.close();
        if failure.is_none() {
            failure = closed.err();
        } else if let Err(e) = closed {
            warn!(session_id = %self.control.id(), error = %e, "Failed to close sink after write error");
        }

        metrics::gauge!(METRIC_ACTIVE).decrement(1.0);

        if let Some(e) = failure {
            self.control.finish(SessionState::Failed, Some(e.to_string()));
            metrics::counter!(METRIC_SESSIONS, "outcome" => SessionState::Failed.to_string()).increment(1);
            warn!(
                session_id = %self.control.id(),
                produced,
                bytes_written,
                error = %e,
                "Export session failed"
            );
            return Err(ExportError::SinkWrite(e));
        }

        let state = if produced == requested {
            SessionState::Completed
        } else {
            SessionState::Stopped
        };
        self.control.finish(state, None);
        metrics::counter!(METRIC_SESSIONS, "outcome" => state.to_string()).increment(1);
        info!(
            session_id = %self.control.id(),
            produced,
            requested,
            bytes_written,
            state = %state,
            "Export session finished"
        );

        Ok(ExportSummary {
            state,
            produced,
            requested,
            bytes_written,
        })
    }

    fn flush_full_chunks(&mut self) -> io::Result<u64> {
        let mut written = 0u64;
        while let Some(chunk) = self.buffer.take_chunk() {
            self.sink.write_all(&chunk)?;
            written += chunk.len() as u64;
        }
        Ok(written)
    }

    fn flush_rest(&mut self) -> io::Result<u64> {
        match self.buffer.take_rest() {
            Some(rest) => {
                self.sink.write_all(&rest)?;
                Ok(rest.len() as u64)
            }
            None => Ok(0),
        }
    }

    fn publish(&self, produced: u64, flushed: &mut u64, bytes: u64) {
        self.control.publish_produced(produced, self.pause_poll);
        metrics::counter!(METRIC_NUMBERS_GENERATED).increment(produced - *flushed);
        metrics::counter!(METRIC_BYTES_WRITTEN).increment(bytes);
        *flushed = produced;
    }
}

/// Owns the single export session of a service.
#[derive(Debug)]
pub struct ExportCoordinator {
    output_dir: PathBuf,
    options: ExportOptions,
    current: Mutex<Option<ExportSession>>,
}

impl ExportCoordinator {
    /// Create a coordinator writing into `config.output_dir`.
    #[must_use]
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            options: ExportOptions::from_config(config),
            current: Mutex::new(None),
        }
    }

    /// Output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Start a new session writing to `output_name` inside the output directory.
    ///
    /// # Errors
    ///
    /// - [`AppError::SessionActive`] if a session is running or paused
    /// - [`AppError::BadRequest`] if `output_name` has no usable file name
    /// - [`AppError::Sink`] if the output file cannot be created
    pub fn start(
        &self,
        request: GenerationRequest,
        output_name: &str,
        seed: Option<u64>,
    ) -> Result<SessionSnapshot, AppError> {
        let mut current = self.current.lock();
        if current.as_ref().is_some_and(|s| s.state().is_live()) {
            return Err(AppError::SessionActive);
        }
        // Reap the finished session before opening a new sink.
        drop(current.take());

        let file_name = sanitize_file_name(output_name)
            .ok_or_else(|| AppError::BadRequest(format!("invalid output name '{output_name}'")))?;
        let path = self.output_dir.join(file_name);

        let sink = std::fs::create_dir_all(&self.output_dir)
            .and_then(|()| FileSink::create(&path))
            .map_err(|source| ExportError::SinkOpen {
                path: path.display().to_string(),
                source,
            })?;

        let options = self
            .options
            .clone()
            .with_seed(seed)
            .with_output(path.display().to_string());
        let session = ExportSession::start(request, Box::new(sink), options)?;
        let snapshot = session.snapshot();
        *current = Some(session);

        Ok(snapshot)
    }

    /// Pause the current session.
    ///
    /// # Errors
    ///
    /// [`AppError::NoSession`] or [`AppError::InvalidTransition`].
    pub fn pause(&self) -> Result<SessionSnapshot, AppError> {
        self.control("pause", ExportSession::pause)
    }

    /// Resume the current session.
    ///
    /// # Errors
    ///
    /// [`AppError::NoSession`] or [`AppError::InvalidTransition`].
    pub fn resume(&self) -> Result<SessionSnapshot, AppError> {
        self.control("resume", ExportSession::resume)
    }

    /// Cancel the current session.
    ///
    /// # Errors
    ///
    /// [`AppError::NoSession`] or [`AppError::InvalidTransition`].
    pub fn cancel(&self) -> Result<SessionSnapshot, AppError> {
        self.control("cancel", ExportSession::cancel)
    }

    /// Snapshot of the current (or last) session.
    ///
    /// # Errors
    ///
    /// [`AppError::NoSession`] if no session was ever started.
    pub fn snapshot(&self) -> Result<SessionSnapshot, AppError> {
        self.current
            .lock()
            .as_ref()
            .map(ExportSession::snapshot)
            .ok_or(AppError::NoSession)
    }

    /// Cancel and join the current session.
    pub fn shutdown(&self) -> Option<Result<ExportSummary, ExportError>> {
        let session = self.current.lock().take()?;
        session.cancel();
        Some(session.join())
    }

    fn control(
        &self,
        action: &str,
        apply: impl FnOnce(&ExportSession) -> bool,
    ) -> Result<SessionSnapshot, AppError> {
        let current = self.current.lock();
        let session = current.as_ref().ok_or(AppError::NoSession)?;
        if !apply(session) {
            return Err(AppError::InvalidTransition(action.to_string()));
        }
        Ok(session.snapshot())
    }
}

/// Keep only the final path component, replacing anything outside
/// `[A-Za-z0-9._-]` with `_`.
fn sanitize_file_name(name: &str) -> Option<String> {
    let base = Path::new(name.trim()).file_name()?.to_str()?;
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        None
    } else {
        Some(cleaned)
    }
}
