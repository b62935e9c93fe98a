/// ListSleuth CLI — command-line frontend.
///
/// This crate contains all terminal presentation. Search logic lives in
/// `listsleuth-core`; this crate only turns arguments into a request, drives
/// a `SearchController`, and renders its events.
pub mod cli;
pub mod export;
pub mod output;

pub use cli::Cli;

use anyhow::{Context, Result};
use listsleuth_core::controller::{Phase, SearchController};
use listsleuth_core::search::events::SearchEvent;
use listsleuth_core::transport::{HttpTransport, Transport};
use output::{OutputMode, Printer};
use signal_hook::consts::SIGINT;
use std::io::Write;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// How long `wait_event` blocks before the interrupt flag is rechecked.
const EVENT_POLL: Duration = Duration::from_millis(100);

/// How a run ended, mapped to the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// At least one list contains a search term.
    Found,
    /// Every list was searched and none matched.
    Clean,
    /// The request was rejected before any fetch.
    Invalid,
    /// Nothing matched, but at least one list could not be searched.
    Incomplete,
    /// Interrupted before every list was searched.
    Stopped,
}

impl RunOutcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            RunOutcome::Found => ExitCode::from(0),
            RunOutcome::Clean => ExitCode::from(1),
            RunOutcome::Invalid => ExitCode::from(2),
            RunOutcome::Incomplete => ExitCode::from(3),
            RunOutcome::Stopped => ExitCode::from(130),
        }
    }
}

/// Run the CLI against real HTTP, printing to stdout.
///
/// The first Ctrl-C stops the search and prints the summary; a second one
/// exits with status 130 straight away.
pub fn run(cli: Cli) -> Result<ExitCode> {
    let interrupted = Arc::new(AtomicBool::new(false));
    // Registered first so it only fires once the flag is already set.
    signal_hook::flag::register_conditional_shutdown(SIGINT, 130, interrupted.clone())
        .context("Failed to install Ctrl-C handler")?;
    signal_hook::flag::register(SIGINT, interrupted.clone())
        .context("Failed to install Ctrl-C handler")?;

    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new());
    let stdout = std::io::stdout();
    let outcome = run_with(&cli, transport, stdout.lock(), &interrupted)?;
    Ok(outcome.exit_code())
}

/// Drive one search to completion with an explicit transport and output.
pub fn run_with<W: Write>(
    cli: &Cli,
    transport: Arc<dyn Transport>,
    out: W,
    interrupted: &AtomicBool,
) -> Result<RunOutcome> {
    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Text
    };

    let request = match cli.to_request() {
        Ok(request) => request,
        Err(err) => {
            eprintln!("{} {err:#}", colored::Colorize::red("error:"));
            return Ok(RunOutcome::Invalid);
        }
    };
    let mut controller = SearchController::new(transport, cli.search_options());
    if let Err(err) = controller.start(request) {
        eprintln!("{} {err}", colored::Colorize::red("error:"));
        return Ok(RunOutcome::Invalid);
    }

    let mut printer = Printer::new(mode, out);
    let mut summary_printed = false;
    while controller.is_searching() {
        if interrupted.load(Ordering::Relaxed) {
            controller.stop();
            break;
        }
        if let Some(event) = controller.wait_event(EVENT_POLL) {
            summary_printed |= matches!(event, SearchEvent::Finished(_));
            printer.event(&event)?;
        }
    }
    // A manual stop ends the run without the worker's final event.
    if !summary_printed {
        if let Some(summary) = controller.last_summary.clone() {
            printer.event(&SearchEvent::Finished(summary))?;
        }
    }
    let mut out = printer.into_inner();
    out.flush()?;

    if let Some(path) = &cli.export {
        export::write_results_to(path, &controller.results)?;
        info!("results exported to {}", path.display());
    }

    let failed = controller
        .last_summary
        .as_ref()
        .map_or(0, |summary| summary.files_failed);
    Ok(match controller.phase {
        Phase::Stopped => RunOutcome::Stopped,
        _ if controller.found_count > 0 => RunOutcome::Found,
        _ if failed > 0 => RunOutcome::Incomplete,
        _ => RunOutcome::Clean,
    })
}
