/// Search controller — the control surface a frontend drives.
///
/// Centralises the state a frontend reads: phase, per-file results, found
/// count, current progress, and a timestamped activity log. The search
/// thread communicates via its channel; state updates happen in `pump()` /
/// `wait_event()`, which a GUI would call once per frame and a CLI in a loop.
use crate::error::SearchError;
use crate::model::{MatchPosition, SearchRequest};
use crate::search::events::{RunStatus, RunSummary, SearchEvent};
use crate::search::{start_search, SearchHandle, SearchOptions};
use crate::transport::Transport;
use chrono::{DateTime, Local};
use crossbeam_channel::RecvTimeoutError;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Maximum number of events drained from the channel per `pump()` call.
///
/// Keeps a large backlog from stalling a render thread.
const MAX_EVENTS_PER_PUMP: usize = 500;

/// Maximum log entries retained; the oldest are dropped first.
pub const MAX_LOG_ENTRIES: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No search has run since the controller was created.
    Idle,
    Searching,
    /// The last run attempted every file.
    Done,
    /// The last run was stopped early.
    Stopped,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Found {
        line_number: u64,
        position: MatchPosition,
        matched_text: String,
        bytes_read: u64,
        total_bytes: Option<u64>,
    },
    NotFound {
        message: String,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileResult {
    pub file: String,
    pub outcome: FileOutcome,
    pub at: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub message: String,
}

pub struct SearchController {
    transport: Arc<dyn Transport>,
    options: SearchOptions,
    handle: Option<SearchHandle>,
    started: Option<Instant>,
    /// Bytes of finished files, plus the latest count for the current one.
    bytes_done: u64,
    file_bytes: u64,

    pub phase: Phase,
    /// Results in arrival order (file order).
    pub results: Vec<FileResult>,
    /// Files with a match since the last `start` or `clear`.
    pub found_count: usize,
    pub overall_fraction: f64,
    pub current_file: Option<String>,
    pub last_summary: Option<RunSummary>,
    pub log: VecDeque<LogEntry>,
}

impl SearchController {
    pub fn new(transport: Arc<dyn Transport>, options: SearchOptions) -> Self {
        Self {
            transport,
            options,
            handle: None,
            started: None,
            bytes_done: 0,
            file_bytes: 0,
            phase: Phase::Idle,
            results: Vec::new(),
            found_count: 0,
            overall_fraction: 0.0,
            current_file: None,
            last_summary: None,
            log: VecDeque::new(),
        }
    }

    pub fn is_searching(&self) -> bool {
        self.phase == Phase::Searching
    }

    /// Start a search, replacing any previous results.
    ///
    /// A running search is stopped first. An invalid request leaves the
    /// controller, and any search still running, unchanged apart from a log
    /// entry.
    pub fn start(&mut self, request: SearchRequest) -> Result<(), SearchError> {
        if let Err(err) = request.validate() {
            let err = SearchError::from(err);
            self.push_log(format!("error: {err}"));
            return Err(err);
        }
        self.stop();

        let description = request.describe();
        let handle = match start_search(request, self.transport.clone(), self.options.clone()) {
            Ok(h) => h,
            Err(err) => {
                self.push_log(format!("error: {err}"));
                return Err(err);
            }
        };

        self.results.clear();
        self.found_count = 0;
        self.overall_fraction = 0.0;
        self.current_file = None;
        self.last_summary = None;
        self.started = Some(Instant::now());
        self.bytes_done = 0;
        self.file_bytes = 0;
        self.log.clear();
        self.push_log(format!("starting search for {description}"));

        self.handle = Some(handle);
        self.phase = Phase::Searching;
        Ok(())
    }

    /// Stop the running search.
    ///
    /// Takes effect immediately: the phase becomes `Stopped` and the worker is
    /// detached. A worker blocked on a stalled read exits on its own once the
    /// read returns and it sees the cancelled token; nothing it sends after
    /// this point is applied.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        handle.cancel();

        let summary = self.stopped_summary();
        info!(
            processed = summary.files_processed,
            matched = summary.files_matched,
            "search stopped manually"
        );
        self.phase = Phase::Stopped;
        self.current_file = None;
        self.last_summary = Some(summary);
        self.push_log("search stopped manually".to_string());
    }

    /// Reset accumulated results and the found counter.
    pub fn clear(&mut self) {
        self.results.clear();
        self.found_count = 0;
        if let Some(handle) = &self.handle {
            handle.reset_files_matched();
        }
        self.push_log("results cleared".to_string());
    }

    /// Summary of what arrived before a manual stop.
    fn stopped_summary(&self) -> RunSummary {
        let files_failed = self
            .results
            .iter()
            .filter(|r| matches!(r.outcome, FileOutcome::Error { .. }))
            .count();
        RunSummary {
            status: RunStatus::Stopped,
            files_processed: self.results.len(),
            files_matched: self.found_count,
            files_failed,
            bytes_read: self.bytes_done + self.file_bytes,
            elapsed_ms: self.started.map_or(0, |t| t.elapsed().as_millis() as u64),
        }
    }

    /// Drain pending events without blocking.
    ///
    /// Returns `true` if anything changed.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;
        for _ in 0..MAX_EVENTS_PER_PUMP {
            let event = match self.handle.as_ref().map(|h| h.events_rx.try_recv()) {
                Some(Ok(event)) => event,
                _ => break,
            };
            self.apply(&event);
            changed = true;
        }
        changed
    }

    /// Wait up to `timeout` for the next event, apply it, and return it.
    ///
    /// Returns `None` on timeout or when no search is running.
    pub fn wait_event(&mut self, timeout: Duration) -> Option<SearchEvent> {
        let handle = self.handle.as_ref()?;
        match handle.events_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.apply(&event);
                Some(event)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                // Worker exited without a final event.
                if self.phase == Phase::Searching {
                    self.phase = Phase::Stopped;
                }
                self.handle = None;
                None
            }
        }
    }

    fn apply(&mut self, event: &SearchEvent) {
        let now = Local::now();
        match event {
            SearchEvent::FileStarted { file, .. } => {
                self.current_file = Some(file.clone());
                self.bytes_done += self.file_bytes;
                self.file_bytes = 0;
                self.push_log(format!("loading {file} ..."));
            }
            SearchEvent::Progress(p) => {
                self.overall_fraction = p.overall_fraction;
                self.file_bytes = p.bytes_read;
            }
            SearchEvent::Match(m) => {
                self.found_count += 1;
                self.push_log(format!("match in {} line {}", m.file, m.line_number));
                self.results.push(FileResult {
                    file: m.file.clone(),
                    outcome: FileOutcome::Found {
                        line_number: m.line_number,
                        position: m.position,
                        matched_text: m.matched_text.clone(),
                        bytes_read: m.bytes_read_at_match,
                        total_bytes: m.total_bytes,
                    },
                    at: now,
                });
            }
            SearchEvent::NotFound { file, message } => {
                self.push_log(format!("no match in {file}"));
                self.results.push(FileResult {
                    file: file.clone(),
                    outcome: FileOutcome::NotFound {
                        message: message.clone(),
                    },
                    at: now,
                });
            }
            SearchEvent::Error { file, message } => {
                self.push_log(format!("error loading {file}: {message}"));
                self.results.push(FileResult {
                    file: file.clone(),
                    outcome: FileOutcome::Error {
                        message: message.clone(),
                    },
                    at: now,
                });
            }
            SearchEvent::Finished(summary) => {
                self.phase = match summary.status {
                    RunStatus::Done => Phase::Done,
                    RunStatus::Stopped => Phase::Stopped,
                };
                if summary.status == RunStatus::Done {
                    self.overall_fraction = 1.0;
                }
                self.current_file = None;
                self.last_summary = Some(summary.clone());
                self.handle = None;
                self.push_log("search finished".to_string());
            }
        }
    }

    fn push_log(&mut self, message: String) {
        if self.log.len() >= MAX_LOG_ENTRIES {
            self.log.pop_front();
        }
        self.log.push_back(LogEntry {
            at: Local::now(),
            message,
        });
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        if let Some(ref handle) = self.handle {
            handle.cancel();
        }
    }
}
