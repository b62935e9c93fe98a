/// One file's search, end to end.
///
/// Pulls chunks from the transport reader, decodes them, reassembles lines,
/// and tests each line until the body ends. Only the first match in a file
/// is reported; reading still continues to the end so progress and byte
/// counts stay meaningful.
use super::events::{EventSink, MatchEvent, ProgressSnapshot, SearchEvent};
use super::{overall_fraction, CancelToken, SearchOptions};
use crate::decode::ChunkDecoder;
use crate::error::SearchError;
use crate::lines::LineReassembler;
use crate::matcher::Targets;
use crate::model::MatchPosition;
use crate::transport::{resolve_url, Transport};
use std::io::{ErrorKind, Read};
use tracing::{debug, info, warn};

/// Message attached to `SearchEvent::NotFound`.
pub const NOT_FOUND_MESSAGE: &str = "no match in this list";

/// Everything a session needs that outlives it.
pub struct SessionContext<'a> {
    pub base_url: &'a str,
    pub targets: &'a Targets,
    pub transport: &'a dyn Transport,
    pub options: &'a SearchOptions,
    pub cancel: &'a CancelToken,
    pub file_count: usize,
}

/// What a completed session learned about its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileReport {
    pub matched: bool,
    pub lines: u64,
    pub bytes_read: u64,
}

/// Per-file counters, owned by the running session and dropped with it.
struct StreamState {
    line_number: u64,
    bytes_read: u64,
    total_bytes: Option<u64>,
    matched_in_file: bool,
}

impl StreamState {
    fn report(&self) -> FileReport {
        FileReport {
            matched: self.matched_in_file,
            lines: self.line_number,
            bytes_read: self.bytes_read,
        }
    }

    fn file_fraction(&self) -> f64 {
        match self.total_bytes {
            Some(total) if total > 0 => (self.bytes_read as f64 / total as f64).min(1.0),
            _ => 0.0,
        }
    }

    /// Count `line` and report it if it is the file's first match.
    fn check_line(
        &mut self,
        file: &str,
        line: &str,
        targets: &Targets,
        position: MatchPosition,
        sink: &mut dyn EventSink,
    ) {
        self.line_number += 1;
        if self.matched_in_file || !targets.matches(line) {
            return;
        }
        self.matched_in_file = true;
        info!(file, line = self.line_number, "match found");
        sink.emit(SearchEvent::Match(MatchEvent {
            file: file.to_string(),
            line_number: self.line_number,
            position,
            matched_text: line.trim().to_string(),
            bytes_read_at_match: self.bytes_read,
            total_bytes: self.total_bytes,
        }));
    }
}

/// Search one file, emitting `Match` / `NotFound` and progress into `sink`.
///
/// Transport failures are returned, not emitted: the orchestrator decides
/// whether they become an `Error` event or end the run (`Cancelled`).
pub fn search_file(
    ctx: &SessionContext<'_>,
    file_index: usize,
    file: &str,
    sink: &mut dyn EventSink,
) -> Result<FileReport, SearchError> {
    let url = resolve_url(ctx.base_url, file);
    info!(file, %url, "loading list");
    sink.emit(SearchEvent::FileStarted {
        file_index,
        file: file.to_string(),
        url: url.clone(),
    });

    let body = ctx.transport.open(&url)?;
    let mut reader = body.reader;
    let mut state = StreamState {
        line_number: 0,
        bytes_read: 0,
        total_bytes: body.total_bytes,
        matched_in_file: false,
    };
    let mut decoder = ChunkDecoder::new();
    let mut lines = LineReassembler::new();
    let mut buf = vec![0u8; ctx.options.chunk_size.max(1)];

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if state.matched_in_file => {
                // The file already has its terminal event.
                warn!(file, error = %e, "read failed after match; stopping this list");
                return Ok(state.report());
            }
            Err(e) => {
                return Err(SearchError::Transport {
                    url,
                    status: None,
                    message: e.to_string(),
                });
            }
        };

        state.bytes_read += n as u64;
        let text = decoder.decode(&buf[..n]);
        for line in lines.push(&text) {
            let position = MatchPosition::from_progress(state.bytes_read, state.total_bytes);
            state.check_line(file, &line, ctx.targets, position, sink);
        }

        let file_fraction = state.file_fraction();
        sink.emit(SearchEvent::Progress(ProgressSnapshot {
            file_index,
            file_fraction,
            overall_fraction: overall_fraction(file_index, ctx.file_count, file_fraction),
            bytes_read: state.bytes_read,
        }));

        if ctx.cancel.is_cancelled() {
            // Dropping the reader closes the connection.
            drop(reader);
            info!(file, bytes_read = state.bytes_read, "list aborted");
            return Err(SearchError::Cancelled);
        }
    }

    let tail = decoder.finish();
    for line in lines.push(&tail) {
        state.check_line(file, &line, ctx.targets, MatchPosition::Eof, sink);
    }
    if let Some(last) = lines.finish() {
        state.check_line(file, &last, ctx.targets, MatchPosition::Eof, sink);
    }

    if !state.matched_in_file {
        info!(file, lines = state.line_number, "no match");
        sink.emit(SearchEvent::NotFound {
            file: file.to_string(),
            message: NOT_FOUND_MESSAGE.to_string(),
        });
    }
    debug!(file, lines = state.line_number, bytes = state.bytes_read, "list finished");
    Ok(state.report())
}
