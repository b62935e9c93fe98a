/// Transport boundary — opening a streaming body for one list.
///
/// The engine only needs a byte reader and, when the server advertises one,
/// the total body length. `HttpTransport` provides both over HTTP(S) with
/// `ureq`; `MemoryTransport` serves canned bodies for frontends and tests.
use crate::error::SearchError;
use std::collections::HashMap;
use std::io::{self, Read};
use tracing::debug;

/// An open response body.
///
/// Dropping the stream releases the underlying connection, so every exit
/// path of a session (completion, error, cancellation) closes the reader.
pub struct BodyStream {
    pub reader: Box<dyn Read + Send>,
    /// Advertised body length (`Content-Length`), if any.
    pub total_bytes: Option<u64>,
}

impl std::fmt::Debug for BodyStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BodyStream")
            .field("total_bytes", &self.total_bytes)
            .finish_non_exhaustive()
    }
}

pub trait Transport: Send + Sync {
    /// Issue a streaming GET for `url`.
    ///
    /// Fails with `SearchError::Transport` when the request cannot be sent or
    /// the status is outside 200..=299.
    fn open(&self, url: &str) -> Result<BodyStream, SearchError>;
}

/// Join a base URL and a relative list path with exactly one `/`.
pub fn resolve_url(base_url: &str, relative: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let rel = relative.trim().trim_start_matches('/');
    format!("{base}/{rel}")
}

// ── HTTP ─────────────────────────────────────────────────────────────────────

const USER_AGENT: &str = concat!("listsleuth/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP(S) transport.
///
/// No read timeout is configured: a stalled server blocks the session until
/// the connection fails or more data arrives.
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().user_agent(USER_AGENT).build(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn open(&self, url: &str) -> Result<BodyStream, SearchError> {
        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                return Err(SearchError::Transport {
                    url: url.to_string(),
                    status: Some(code),
                    message: response.status_text().to_string(),
                });
            }
            Err(ureq::Error::Transport(err)) => {
                return Err(SearchError::Transport {
                    url: url.to_string(),
                    status: None,
                    message: err.to_string(),
                });
            }
        };

        // ureq only errors on 4xx/5xx; an unfollowed 3xx is not a body either.
        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(SearchError::Transport {
                url: url.to_string(),
                status: Some(status),
                message: response.status_text().to_string(),
            });
        }

        let total_bytes = response
            .header("Content-Length")
            .and_then(|v| v.trim().parse::<u64>().ok());
        debug!(url, ?total_bytes, "response headers received");

        Ok(BodyStream {
            reader: Box::new(response.into_reader()),
            total_bytes,
        })
    }
}

// ── In-memory ────────────────────────────────────────────────────────────────

/// What a `MemoryTransport` returns for one URL.
#[derive(Debug, Clone)]
pub enum CannedResponse {
    Body {
        bytes: Vec<u8>,
        /// Maximum bytes handed out per `read` call.
        chunk_len: usize,
        advertise_length: bool,
    },
    Status(u16),
    Unreachable(String),
}

/// Transport serving fixed bodies keyed by full URL.
///
/// Unknown URLs answer 404 like a static file host would.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    responses: HashMap<String, CannedResponse>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url` in chunks of `chunk_len` with a known length.
    pub fn with_body(mut self, url: &str, body: impl Into<Vec<u8>>, chunk_len: usize) -> Self {
        self.responses.insert(
            url.to_string(),
            CannedResponse::Body {
                bytes: body.into(),
                chunk_len: chunk_len.max(1),
                advertise_length: true,
            },
        );
        self
    }

    /// Like `with_body`, but without a `Content-Length`.
    pub fn with_unsized_body(mut self, url: &str, body: impl Into<Vec<u8>>, chunk_len: usize) -> Self {
        self.responses.insert(
            url.to_string(),
            CannedResponse::Body {
                bytes: body.into(),
                chunk_len: chunk_len.max(1),
                advertise_length: false,
            },
        );
        self
    }

    pub fn with_response(mut self, url: &str, response: CannedResponse) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }
}

impl Transport for MemoryTransport {
    fn open(&self, url: &str) -> Result<BodyStream, SearchError> {
        match self.responses.get(url) {
            Some(CannedResponse::Body {
                bytes,
                chunk_len,
                advertise_length,
            }) => Ok(BodyStream {
                total_bytes: advertise_length.then_some(bytes.len() as u64),
                reader: Box::new(ChunkedReader {
                    bytes: bytes.clone(),
                    pos: 0,
                    chunk_len: *chunk_len,
                }),
            }),
            Some(CannedResponse::Status(code)) => Err(SearchError::Transport {
                url: url.to_string(),
                status: Some(*code),
                message: String::new(),
            }),
            Some(CannedResponse::Unreachable(message)) => Err(SearchError::Transport {
                url: url.to_string(),
                status: None,
                message: message.clone(),
            }),
            None => Err(SearchError::Transport {
                url: url.to_string(),
                status: Some(404),
                message: "Not Found".to_string(),
            }),
        }
    }
}

/// Reader that never returns more than `chunk_len` bytes per call, so
/// chunk boundaries land where a test wants them.
struct ChunkedReader {
    bytes: Vec<u8>,
    pos: usize,
    chunk_len: usize,
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.bytes[self.pos..];
        let n = remaining.len().min(self.chunk_len).min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos += n;
        Ok(n)
    }
}
