use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use listsleuth_core::model::SearchRequest;
use listsleuth_core::search::{SearchOptions, DEFAULT_CHUNK_SIZE, INTER_FILE_PAUSE};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "listsleuth")]
#[command(version)]
#[command(about = "Check whether a password or username appears in remote wordlists")]
#[command(long_about = "ListSleuth streams wordlists and credential dumps over HTTP and \
    reports the first line of each list that contains the password and/or username \
    (case-insensitive). Lists are searched one after another without being loaded \
    into memory.\n\n\
    Examples:\n  \
    listsleuth -b https://example.org/lists/ rockyou.txt -p hunter2\n  \
    listsleuth -b https://example.org/lists/ --files-from lists.txt -u alice --json\n  \
    LISTSLEUTH_PASSWORD=hunter2 listsleuth -b https://example.org/ a.txt b.txt --export hits.csv")]
pub struct Cli {
    /// Base URL the list paths are relative to
    #[arg(short = 'b', long, value_name = "URL", env = "LISTSLEUTH_BASE_URL")]
    pub base_url: Option<String>,

    /// List paths relative to the base URL, searched in order
    #[arg(value_name = "LIST")]
    pub lists: Vec<String>,

    /// Read more list paths from a file (one per line, '#' starts a comment)
    #[arg(long, value_name = "PATH")]
    pub files_from: Option<PathBuf>,

    /// Password to look for
    #[arg(short = 'p', long, env = "LISTSLEUTH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Username to look for
    #[arg(short = 'u', long)]
    pub username: Option<String>,

    /// Pause between lists in milliseconds
    #[arg(long, value_name = "MS", default_value_t = INTER_FILE_PAUSE.as_millis() as u64)]
    pub pause_ms: u64,

    /// Read buffer size per chunk in bytes
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Print events as JSON lines instead of text
    #[arg(long)]
    pub json: bool,

    /// Write per-list results to a CSV file when the search ends
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Increase log verbosity on stderr (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print the final summary
    #[arg(short = 'q', long, conflicts_with_all = ["verbose", "json"])]
    pub quiet: bool,
}

impl Cli {
    /// Parse `std::env::args`.
    pub fn from_env() -> Self {
        Self::parse()
    }

    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    /// Build the search request from positional lists plus `--files-from`.
    pub fn to_request(&self) -> Result<SearchRequest> {
        let mut files = self.lists.clone();
        if let Some(path) = &self.files_from {
            files.extend(read_list_file(path)?);
        }
        Ok(SearchRequest {
            base_url: self.base_url.clone().unwrap_or_default(),
            files,
            password: self.password.clone(),
            username: self.username.clone(),
        })
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            chunk_size: self.chunk_size.max(1),
            inter_file_pause: Duration::from_millis(self.pause_ms),
        }
    }
}

/// Read list paths, one per line. Blank lines and `#` comments are skipped.
pub fn read_list_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read list file: {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}
