/// Events emitted during a search run — lightweight messages sent from the
/// search thread to the frontend.
///
/// Per file the order is: `FileStarted`, any number of `Progress`, at most
/// one `Match`, then exactly one of `NotFound` / `Error` unless a `Match`
/// already closed the file. A file aborted by cancellation gets no terminal
/// event; the run then ends with `Finished` carrying `RunStatus::Stopped`.
use crate::model::MatchPosition;
use crossbeam_channel::Sender;
use serde::Serialize;

/// First matching line of a file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchEvent {
    pub file: String,
    /// 1-based line number.
    pub line_number: u64,
    pub position: MatchPosition,
    /// The matching line, trimmed.
    pub matched_text: String,
    pub bytes_read_at_match: u64,
    pub total_bytes: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub file_index: usize,
    /// Fraction of the current file read; 0 when its length is unknown.
    pub file_fraction: f64,
    pub overall_fraction: f64,
    /// Bytes of the current file read so far.
    pub bytes_read: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every file was attempted.
    Done,
    /// Cancelled before all files were attempted.
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub status: RunStatus,
    /// Files that reached a terminal event.
    pub files_processed: usize,
    /// Files with a match.
    pub files_matched: usize,
    /// Files that ended in an error.
    pub files_failed: usize,
    pub bytes_read: u64,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SearchEvent {
    FileStarted {
        file_index: usize,
        file: String,
        url: String,
    },
    Progress(ProgressSnapshot),
    Match(MatchEvent),
    NotFound {
        file: String,
        message: String,
    },
    Error {
        file: String,
        message: String,
    },
    Finished(RunSummary),
}

impl SearchEvent {
    /// True for the events that close a file.
    pub fn is_terminal_for_file(&self) -> bool {
        matches!(
            self,
            SearchEvent::Match(_) | SearchEvent::NotFound { .. } | SearchEvent::Error { .. }
        )
    }

    /// The file this event belongs to, if it is file-scoped.
    pub fn file(&self) -> Option<&str> {
        match self {
            SearchEvent::FileStarted { file, .. }
            | SearchEvent::NotFound { file, .. }
            | SearchEvent::Error { file, .. } => Some(file),
            SearchEvent::Match(m) => Some(&m.file),
            SearchEvent::Progress(_) | SearchEvent::Finished(_) => None,
        }
    }
}

/// Where the engine writes its events.
///
/// The engine holds no reference to presentation state; a frontend supplies
/// a sink (a channel sender when the search runs on its own thread).
pub trait EventSink {
    fn emit(&mut self, event: SearchEvent);
}

impl EventSink for Vec<SearchEvent> {
    fn emit(&mut self, event: SearchEvent) {
        self.push(event);
    }
}

impl EventSink for Sender<SearchEvent> {
    fn emit(&mut self, event: SearchEvent) {
        // A dropped receiver means nobody is listening; keep searching so
        // the run still finishes cleanly.
        let _ = self.send(event);
    }
}
