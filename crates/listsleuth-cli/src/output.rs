/// Rendering of search events for the terminal.
///
/// Text mode keeps a progress bar on stderr and prints one line per list
/// result on stdout. JSON mode prints every event except progress as one JSON
/// object per line. Quiet mode prints only the run summary.
use anyhow::Result;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use listsleuth_core::model::size::{format_count, format_transfer};
use listsleuth_core::model::MatchPosition;
use listsleuth_core::search::events::{RunStatus, RunSummary, SearchEvent};
use std::io::Write;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
    Quiet,
}

/// Progress bar for the whole run, in percent.
fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
    {
        pb.set_style(style.progress_chars("█▓░"));
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

pub struct Printer<W: Write> {
    mode: OutputMode,
    out: W,
    bar: Option<ProgressBar>,
}

impl<W: Write> Printer<W> {
    pub fn new(mode: OutputMode, out: W) -> Self {
        let bar = (mode == OutputMode::Text).then(create_progress_bar);
        Self { mode, out, bar }
    }

    /// Printer without a progress bar, for tests and non-interactive use.
    pub fn without_progress(mode: OutputMode, out: W) -> Self {
        Self {
            mode,
            out,
            bar: None,
        }
    }

    pub fn into_inner(self) -> W {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
        self.out
    }

    pub fn event(&mut self, event: &SearchEvent) -> Result<()> {
        match self.mode {
            OutputMode::Json => self.json(event),
            OutputMode::Text => self.text(event),
            OutputMode::Quiet => match event {
                SearchEvent::Finished(summary) => {
                    let line = summary_line(summary);
                    self.write_line(&line)
                }
                _ => Ok(()),
            },
        }
    }

    fn json(&mut self, event: &SearchEvent) -> Result<()> {
        if matches!(event, SearchEvent::Progress(_)) {
            return Ok(());
        }
        let line = serde_json::to_string(event)?;
        self.write_line(&line)
    }

    fn text(&mut self, event: &SearchEvent) -> Result<()> {
        match event {
            SearchEvent::FileStarted { file, .. } => {
                if let Some(bar) = &self.bar {
                    bar.set_message(format!("loading {file}"));
                }
                Ok(())
            }
            SearchEvent::Progress(p) => {
                if let Some(bar) = &self.bar {
                    bar.set_position((p.overall_fraction * 100.0).floor() as u64);
                }
                Ok(())
            }
            SearchEvent::Match(m) => {
                let position = match m.position {
                    MatchPosition::Percent(_) => format!("~{}", m.position),
                    other => other.to_string(),
                };
                let line = format!(
                    "{} {}  line {} ({})  {}  [{} read]",
                    "FOUND".red().bold(),
                    m.file.bold(),
                    format_count(m.line_number),
                    position,
                    m.matched_text,
                    format_transfer(m.bytes_read_at_match, m.total_bytes)
                );
                self.write_line(&line)
            }
            SearchEvent::NotFound { file, message } => {
                let line = format!("{} {}  {}", "clean".green(), file, message.dimmed());
                self.write_line(&line)
            }
            SearchEvent::Error { file, message } => {
                let line = format!("{} {}  {}", "error".yellow(), file, message);
                self.write_line(&line)
            }
            SearchEvent::Finished(summary) => {
                if let Some(bar) = self.bar.take() {
                    bar.finish_and_clear();
                }
                let line = summary_line(summary);
                self.write_line(&line)
            }
        }
    }

    /// Print above the progress bar so it is not overwritten.
    fn write_line(&mut self, line: &str) -> Result<()> {
        let out = &mut self.out;
        match &self.bar {
            Some(bar) => bar.suspend(|| writeln!(out, "{line}"))?,
            None => writeln!(out, "{line}")?,
        }
        Ok(())
    }
}

pub fn summary_line(summary: &RunSummary) -> String {
    let status = match summary.status {
        RunStatus::Done => "Done".to_string(),
        RunStatus::Stopped => "Stopped".yellow().to_string(),
    };
    format!(
        "{}: {} list(s) searched, {} with matches, {} failed ({:.1}s)",
        status,
        summary.files_processed,
        summary.files_matched,
        summary.files_failed,
        summary.elapsed_ms as f64 / 1000.0
    )
}
