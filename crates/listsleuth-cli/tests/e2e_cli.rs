/// End-to-end tests for the CLI driver.
///
/// Arguments are parsed with the real clap definition and the search runs on
/// the real background thread; only the transport is in-memory.
use clap::Parser;
use listsleuth_cli::{run_with, Cli, RunOutcome};
use listsleuth_core::transport::{CannedResponse, MemoryTransport, Transport};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn transport() -> Arc<dyn Transport> {
    Arc::new(
        MemoryTransport::new()
            .with_body("https://x/a.txt", "foo\nhunter2lol\nbar", 4)
            .with_body("https://x/b.txt", "nope", 4)
            .with_response("https://x/c.txt", CannedResponse::Status(403))
            .with_body("https://x/big.txt", "x\n".repeat(200_000), 1),
    )
}

fn cli(args: &[&str]) -> Cli {
    let base = ["listsleuth", "-b", "https://x/", "--pause-ms", "0"];
    Cli::try_parse_from(base.iter().chain(args.iter()).copied()).expect("valid arguments")
}

fn run(cli: &Cli) -> (RunOutcome, String) {
    let mut out = Vec::new();
    let outcome = run_with(cli, transport(), &mut out, &AtomicBool::new(false)).unwrap();
    (outcome, String::from_utf8(out).unwrap())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn json_run_reports_match_then_not_found() {
    let (outcome, out) = run(&cli(&["a.txt", "b.txt", "-p", "hunter2", "--json"]));
    assert_eq!(outcome, RunOutcome::Found);

    let events: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let kinds: Vec<&str> = events.iter().map(|e| e["event"].as_str().unwrap()).collect();
    assert_eq!(
        kinds,
        vec!["file_started", "match", "file_started", "not_found", "finished"]
    );
    assert_eq!(events[1]["file"], "a.txt");
    assert_eq!(events[1]["line_number"], 2);
    assert_eq!(events[1]["matched_text"], "hunter2lol");
    assert_eq!(events[4]["status"], "done");
}

#[test]
fn clean_run_exits_as_clean() {
    let (outcome, out) = run(&cli(&["b.txt", "-u", "alice", "-q"]));
    assert_eq!(outcome, RunOutcome::Clean);
    assert!(out.starts_with("Done: 1 list(s) searched, 0 with matches, 0 failed"));
}

#[test]
fn errors_are_reported_and_run_continues() {
    let (outcome, out) = run(&cli(&["c.txt", "a.txt", "-p", "HUNTER2", "--json"]));
    assert_eq!(outcome, RunOutcome::Found);
    assert!(out.contains(r#""event":"error","file":"c.txt","message":"HTTP 403""#));
    assert!(out.contains(r#""event":"match""#));
}

#[test]
fn missing_terms_are_invalid() {
    let (outcome, out) = run(&cli(&["a.txt"]));
    assert_eq!(outcome, RunOutcome::Invalid);
    assert!(out.is_empty());
}

#[test]
fn all_lists_failing_is_not_clean() {
    let (outcome, out) = run(&cli(&["gone1.txt", "c.txt", "-p", "hunter2", "-q"]));
    assert_eq!(outcome, RunOutcome::Incomplete);
    assert_ne!(outcome.exit_code(), RunOutcome::Clean.exit_code());
    assert!(out.starts_with("Done: 2 list(s) searched, 0 with matches, 2 failed"));
}

#[test]
fn failure_beside_clean_list_is_incomplete() {
    let (outcome, _) = run(&cli(&["b.txt", "gone.txt", "-u", "alice", "-q"]));
    assert_eq!(outcome, RunOutcome::Incomplete);
}

#[test]
fn unreadable_files_from_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");
    let missing_arg = missing.to_string_lossy().to_string();
    let (outcome, out) = run(&cli(&["--files-from", &missing_arg, "-p", "hunter2"]));
    assert_eq!(outcome, RunOutcome::Invalid);
    assert!(out.is_empty());
}

#[test]
fn interrupt_flag_stops_the_run() {
    let cli = cli(&["big.txt", "a.txt", "-u", "never-there", "-q"]);
    let mut out = Vec::new();
    let outcome = run_with(&cli, transport(), &mut out, &AtomicBool::new(true)).unwrap();
    assert_eq!(outcome, RunOutcome::Stopped);
    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("Stopped"));
    assert!(out.contains("0 with matches"));
}

#[test]
fn export_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.csv");
    let path_arg = path.to_string_lossy().to_string();
    let (_, _) = run(&cli(&["a.txt", "b.txt", "-p", "hunter2", "-q", "--export", &path_arg]));

    let csv = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("a.txt,found,2,"));
    assert!(lines[2].starts_with("b.txt,notfound,,"));
}
