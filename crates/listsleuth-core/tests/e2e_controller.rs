/// End-to-end tests for `SearchController` — the start/stop/clear surface.
///
/// These tests exercise the real background search thread with the
/// in-memory transport, pumping the controller the way a frontend would.
use crossbeam_channel::Receiver;
use listsleuth_core::controller::{FileOutcome, Phase, SearchController, MAX_LOG_ENTRIES};
use listsleuth_core::error::SearchError;
use listsleuth_core::model::SearchRequest;
use listsleuth_core::search::events::RunStatus;
use listsleuth_core::search::SearchOptions;
use listsleuth_core::transport::{BodyStream, MemoryTransport, Transport};
use std::io::{self, Read};
use std::sync::Arc;
use std::time::{Duration, Instant};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn controller(transport: MemoryTransport) -> SearchController {
    let transport: Arc<dyn Transport> = Arc::new(transport);
    SearchController::new(
        transport,
        SearchOptions {
            inter_file_pause: Duration::ZERO,
            ..SearchOptions::default()
        },
    )
}

fn two_lists() -> MemoryTransport {
    MemoryTransport::new()
        .with_body("https://x/a.txt", "foo\nhunter2lol\nbar", 4)
        .with_body("https://x/b.txt", "nope", 4)
}

fn request() -> SearchRequest {
    SearchRequest::new("https://x/", vec!["a.txt".into(), "b.txt".into()]).with_password("hunter2")
}

/// Pump until the phase leaves `Searching` or the deadline expires.
fn pump_until_done(c: &mut SearchController) {
    let deadline = Instant::now() + Duration::from_secs(30);
    while c.is_searching() {
        assert!(Instant::now() < deadline, "search did not finish within 30 seconds");
        c.pump();
        std::thread::sleep(Duration::from_millis(5));
    }
}

/// Reader that blocks until the test drops the release sender, like a
/// server that stopped sending mid-body.
struct StalledReader {
    release: Receiver<()>,
}

impl Read for StalledReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        let _ = self.release.recv();
        Err(io::Error::new(io::ErrorKind::TimedOut, "stalled"))
    }
}

/// Serves the lists it knows; every other URL opens a stalled body.
struct StallingTransport {
    lists: MemoryTransport,
    release: Receiver<()>,
}

impl Transport for StallingTransport {
    fn open(&self, url: &str) -> Result<BodyStream, SearchError> {
        match self.lists.open(url) {
            Err(err) if err.status() == Some(404) => Ok(BodyStream {
                reader: Box::new(StalledReader {
                    release: self.release.clone(),
                }),
                total_bytes: Some(1_000),
            }),
            other => other,
        }
    }
}

fn stalling_controller(lists: MemoryTransport, release: Receiver<()>) -> SearchController {
    let transport: Arc<dyn Transport> = Arc::new(StallingTransport { lists, release });
    SearchController::new(
        transport,
        SearchOptions {
            inter_file_pause: Duration::ZERO,
            ..SearchOptions::default()
        },
    )
}

/// Wait for events until `done` holds or the deadline expires.
fn wait_until(c: &mut SearchController, done: impl Fn(&SearchController) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(30);
    while !done(c) {
        assert!(Instant::now() < deadline, "condition not reached within 30 seconds");
        c.wait_event(Duration::from_millis(10));
    }
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[test]
fn new_controller_is_idle() {
    let c = controller(MemoryTransport::new());
    assert_eq!(c.phase, Phase::Idle);
    assert_eq!(c.found_count, 0);
    assert!(c.results.is_empty());
}

#[test]
fn start_sets_searching_phase() {
    let mut c = controller(two_lists());
    c.start(request()).unwrap();
    assert_eq!(c.phase, Phase::Searching);
}

#[test]
fn completed_search_collects_results_in_order() {
    let mut c = controller(two_lists());
    c.start(request()).unwrap();
    pump_until_done(&mut c);

    assert_eq!(c.phase, Phase::Done);
    assert_eq!(c.found_count, 1);
    assert_eq!(c.overall_fraction, 1.0);
    assert_eq!(c.results.len(), 2);
    assert_eq!(c.results[0].file, "a.txt");
    assert!(matches!(
        &c.results[0].outcome,
        FileOutcome::Found { line_number: 2, matched_text, .. } if matched_text == "hunter2lol"
    ));
    assert!(matches!(c.results[1].outcome, FileOutcome::NotFound { .. }));

    let summary = c.last_summary.as_ref().expect("summary after finish");
    assert_eq!(summary.files_processed, 2);
    assert!(c.log.iter().any(|l| l.message.contains("match in a.txt line 2")));
}

#[test]
fn wait_event_applies_each_event() {
    let mut c = controller(two_lists());
    c.start(request()).unwrap();

    let deadline = Instant::now() + Duration::from_secs(30);
    let mut seen = 0;
    while c.is_searching() {
        assert!(Instant::now() < deadline, "search did not finish within 30 seconds");
        if c.wait_event(Duration::from_millis(50)).is_some() {
            seen += 1;
        }
    }
    assert!(seen >= 5, "expected start, progress, terminal and finish events");
    assert_eq!(c.phase, Phase::Done);
    assert!(c.wait_event(Duration::from_millis(1)).is_none());
}

#[test]
fn invalid_request_is_rejected_and_keeps_previous_results() {
    let mut c = controller(two_lists());
    c.start(request()).unwrap();
    pump_until_done(&mut c);

    let bad = SearchRequest::new("https://x/", Vec::new()).with_password("x");
    assert!(c.start(bad).is_err());
    assert_eq!(c.phase, Phase::Done);
    assert_eq!(c.results.len(), 2);
    assert!(c.log.back().unwrap().message.starts_with("error:"));
}

// ── Stop / clear ──────────────────────────────────────────────────────────────

#[test]
fn stop_ends_in_stopped_phase() {
    let big = "x\n".repeat(200_000);
    let transport = MemoryTransport::new()
        .with_body("https://x/big.txt", big.clone(), 1)
        .with_body("https://x/next.txt", big, 1);
    let mut c = controller(transport);
    c.start(
        SearchRequest::new("https://x/", vec!["big.txt".into(), "next.txt".into()])
            .with_username("never-there"),
    )
    .unwrap();
    c.stop();
    pump_until_done(&mut c);

    assert_eq!(c.phase, Phase::Stopped);
    assert!(c.results.iter().all(|r| r.file != "next.txt"));
    assert!(c.log.iter().any(|l| l.message == "search stopped manually"));
}

#[test]
fn stop_takes_effect_while_transport_is_stalled() {
    let (release, stalled) = crossbeam_channel::bounded::<()>(0);
    let mut c = stalling_controller(MemoryTransport::new(), stalled);
    c.start(SearchRequest::new("https://x/", vec!["slow.txt".into()]).with_password("hunter2"))
        .unwrap();
    wait_until(&mut c, |c| c.current_file.is_some());

    c.stop();
    assert_eq!(c.phase, Phase::Stopped);
    assert!(!c.is_searching());
    assert!(c.current_file.is_none());
    let summary = c.last_summary.as_ref().expect("summary after stop");
    assert_eq!(summary.status, RunStatus::Stopped);
    assert_eq!(summary.files_processed, 0);
    assert!(c.wait_event(Duration::from_millis(10)).is_none());

    drop(release);
}

#[test]
fn stop_summary_counts_lists_finished_before_the_stall() {
    let (release, stalled) = crossbeam_channel::bounded::<()>(0);
    let mut c = stalling_controller(two_lists(), stalled);
    c.start(
        SearchRequest::new("https://x/", vec!["a.txt".into(), "slow.txt".into()])
            .with_password("hunter2"),
    )
    .unwrap();
    wait_until(&mut c, |c| c.current_file.as_deref() == Some("slow.txt"));

    c.stop();
    let summary = c.last_summary.clone().expect("summary after stop");
    assert_eq!(summary.files_processed, 1);
    assert_eq!(summary.files_matched, 1);
    assert_eq!(summary.bytes_read, 18);
    assert_eq!(c.results.len(), 1);

    drop(release);
}

#[test]
fn clear_during_search_resets_found_count() {
    let (release, stalled) = crossbeam_channel::bounded::<()>(0);
    let mut c = stalling_controller(two_lists(), stalled);
    c.start(
        SearchRequest::new("https://x/", vec!["a.txt".into(), "slow.txt".into()])
            .with_password("hunter2"),
    )
    .unwrap();
    wait_until(&mut c, |c| c.found_count == 1);

    c.clear();
    assert_eq!(c.found_count, 0);
    assert!(c.results.is_empty());
    assert!(c.is_searching());

    c.stop();
    assert_eq!(c.last_summary.as_ref().map(|s| s.files_matched), Some(0));
    drop(release);
}

#[test]
fn clear_resets_results_and_count() {
    let mut c = controller(two_lists());
    c.start(request()).unwrap();
    pump_until_done(&mut c);
    assert_eq!(c.found_count, 1);

    c.clear();
    assert_eq!(c.found_count, 0);
    assert!(c.results.is_empty());
    assert_eq!(c.log.back().unwrap().message, "results cleared");
}

#[test]
fn restart_replaces_previous_results() {
    let mut c = controller(two_lists());
    c.start(request()).unwrap();
    pump_until_done(&mut c);
    c.start(request()).unwrap();
    pump_until_done(&mut c);

    assert_eq!(c.results.len(), 2);
    assert_eq!(c.found_count, 1);
}

#[test]
fn log_is_capped() {
    let mut c = controller(MemoryTransport::new());
    for _ in 0..(MAX_LOG_ENTRIES + 10) {
        c.clear();
    }
    assert_eq!(c.log.len(), MAX_LOG_ENTRIES);
}
