/// Search module — runs file sessions over a list of wordlists.
///
/// Files are searched strictly one after another on a single worker thread,
/// so the frontend sees one coherent progress bar and an ordered event log:
/// every event of file N arrives before any event of file N+1.
///
/// Cancellation is cooperative. `SearchHandle::cancel` sets a shared flag
/// that the worker polls after every chunk, before every file, and during
/// the pause between files.
pub mod events;
pub mod session;

use crate::error::SearchError;
use crate::model::SearchRequest;
use crate::transport::Transport;
use events::{EventSink, RunStatus, RunSummary, SearchEvent};
use session::{search_file, SessionContext};

use crossbeam_channel::Receiver;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Read buffer size per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Gap between files so progress observers can catch up.
pub const INTER_FILE_PAUSE: Duration = Duration::from_millis(200);

/// Granularity at which the inter-file pause checks for cancellation.
const PAUSE_POLL: Duration = Duration::from_millis(10);

/// Maximum number of events that may queue up in the channel.
///
/// Progress is emitted once per chunk; at 64 KiB chunks this is ~1 GiB of
/// body before a frontend that stopped draining blocks the worker.
pub const EVENT_CHANNEL_CAPACITY: usize = 16_384;

/// Engine knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub chunk_size: usize,
    pub inter_file_pause: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            inter_file_pause: INTER_FILE_PAUSE,
        }
    }
}

/// Shared stop flag. Set once by the frontend, read by the worker.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Overall progress across the run.
///
/// Divides by `file_count - 1` (at least 1) so the bar starts moving on the
/// first file and reaches the end while the last file is still streaming;
/// the result is clamped to `[0, 1]`.
pub fn overall_fraction(file_index: usize, file_count: usize, file_fraction: f64) -> f64 {
    let denom = file_count.saturating_sub(1).max(1) as f64;
    ((file_index as f64 + file_fraction) / denom).clamp(0.0, 1.0)
}

/// Run a whole search on the calling thread, writing events into `sink`.
///
/// Returns `Err` only for an invalid request, before anything is fetched.
/// Per-file transport failures become `SearchEvent::Error` and the run moves
/// on; cancellation ends the run with `RunStatus::Stopped`. The final event
/// is always `SearchEvent::Finished`.
pub fn run_search(
    request: &SearchRequest,
    transport: &dyn Transport,
    options: &SearchOptions,
    cancel: &CancelToken,
    sink: &mut dyn EventSink,
) -> Result<RunSummary, SearchError> {
    request.validate()?;

    let start = Instant::now();
    let targets = request.targets();
    let ctx = SessionContext {
        base_url: &request.base_url,
        targets: &targets,
        transport,
        options,
        cancel,
        file_count: request.files.len(),
    };
    info!("starting search for {}", request.describe());

    let mut summary = RunSummary {
        status: RunStatus::Done,
        files_processed: 0,
        files_matched: 0,
        files_failed: 0,
        bytes_read: 0,
        elapsed_ms: 0,
    };

    for (index, file) in request.files.iter().enumerate() {
        if cancel.is_cancelled() {
            summary.status = RunStatus::Stopped;
            break;
        }
        if index > 0 && !pause(options.inter_file_pause, cancel) {
            summary.status = RunStatus::Stopped;
            break;
        }

        match search_file(&ctx, index, file, sink) {
            Ok(report) => {
                summary.files_processed += 1;
                summary.bytes_read += report.bytes_read;
                if report.matched {
                    summary.files_matched += 1;
                }
            }
            Err(SearchError::Cancelled) => {
                info!(file = file.as_str(), "fetch aborted");
                summary.status = RunStatus::Stopped;
                break;
            }
            Err(err) => {
                warn!(file = file.as_str(), error = %err, "failed to load list");
                summary.files_processed += 1;
                summary.files_failed += 1;
                sink.emit(SearchEvent::Error {
                    file: file.clone(),
                    message: err.to_string(),
                });
            }
        }
    }

    summary.elapsed_ms = start.elapsed().as_millis() as u64;
    info!(
        status = ?summary.status,
        processed = summary.files_processed,
        matched = summary.files_matched,
        failed = summary.files_failed,
        "search finished"
    );
    sink.emit(SearchEvent::Finished(summary.clone()));
    Ok(summary)
}

/// Sleep for `duration` unless cancelled first. Returns false on cancel.
fn pause(duration: Duration, cancel: &CancelToken) -> bool {
    let deadline = Instant::now() + duration;
    loop {
        if cancel.is_cancelled() {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(PAUSE_POLL.min(deadline - now));
    }
}

/// Handle to a running or completed search. Allows cancellation and
/// receiving events.
pub struct SearchHandle {
    /// Receiver for events from the search thread.
    pub events_rx: Receiver<SearchEvent>,
    cancel: CancelToken,
    files_matched: Arc<AtomicUsize>,
    thread: Option<thread::JoinHandle<()>>,
}

impl SearchHandle {
    /// Request the search to stop at the next chunk boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Number of files with a match so far.
    pub fn files_matched(&self) -> usize {
        self.files_matched.load(Ordering::Relaxed)
    }

    /// Start the match counter over, for a frontend that cleared its results
    /// while the search keeps running.
    pub fn reset_files_matched(&self) {
        self.files_matched.store(0, Ordering::Relaxed);
    }

    /// True once the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Block until the worker thread exits.
    pub fn join(mut self) {
        if let Some(t) = self.thread.take() {
            if t.join().is_err() {
                warn!("search thread panicked");
            }
        }
    }
}

/// Forwards to the channel and keeps the handle's match counter current.
struct CountingSink {
    tx: crossbeam_channel::Sender<SearchEvent>,
    files_matched: Arc<AtomicUsize>,
}

impl EventSink for CountingSink {
    fn emit(&mut self, event: SearchEvent) {
        if matches!(event, SearchEvent::Match(_)) {
            self.files_matched.fetch_add(1, Ordering::Relaxed);
        }
        self.tx.emit(event);
    }
}

/// Start a new search on a background thread.
///
/// The request is validated here, so an invalid request fails immediately
/// without spawning anything.
pub fn start_search(
    request: SearchRequest,
    transport: Arc<dyn Transport>,
    options: SearchOptions,
) -> Result<SearchHandle, SearchError> {
    request.validate()?;

    let (tx, events_rx) = crossbeam_channel::bounded::<SearchEvent>(EVENT_CHANNEL_CAPACITY);
    let cancel = CancelToken::new();
    let files_matched = Arc::new(AtomicUsize::new(0));

    let worker_cancel = cancel.clone();
    let mut sink = CountingSink {
        tx,
        files_matched: files_matched.clone(),
    };

    let thread = thread::Builder::new()
        .name("listsleuth-search".into())
        .spawn(move || {
            if let Err(err) = run_search(
                &request,
                transport.as_ref(),
                &options,
                &worker_cancel,
                &mut sink,
            ) {
                warn!(error = %err, "search did not start");
            }
        })?;

    Ok(SearchHandle {
        events_rx,
        cancel,
        files_matched,
        thread: Some(thread),
    })
}
