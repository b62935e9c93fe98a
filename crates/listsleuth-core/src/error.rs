/// Error taxonomy for the search engine.
///
/// Per-file failures (`Transport`, `Io`) are isolated by the orchestrator and
/// reported as file outcomes. Only `Cancelled` aborts a run, and `Validation`
/// is raised before any fetch is attempted.
use thiserror::Error;

/// A required field of a `SearchRequest` is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("base URL is missing")]
    MissingBaseUrl,
    #[error("enter a password and/or a username")]
    MissingSearchTerm,
    #[error("select at least one list")]
    NoFiles,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search request: {0}")]
    Validation(#[from] ValidationError),

    /// Non-success HTTP status (`status` is set) or a network failure.
    #[error("{}", transport_message(.status, .message))]
    Transport {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("search cancelled")]
    Cancelled,

    #[error("I/O error while reading body: {0}")]
    Io(#[from] std::io::Error),
}

impl SearchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SearchError::Cancelled)
    }

    /// HTTP status code carried by a transport error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            SearchError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

fn transport_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("HTTP {code}"),
        None => message.to_string(),
    }
}
