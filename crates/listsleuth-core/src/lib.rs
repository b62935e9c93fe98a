/// ListSleuth Core — streaming wordlist search engine.
///
/// This crate contains all search logic with zero UI dependencies.
/// It is designed to be reusable across different frontends (CLI, GUI, TUI).
///
/// # Modules
///
/// - [`decode`] — Incremental UTF-8 decoding of transport chunks.
/// - [`lines`] — Line reassembly across chunk boundaries.
/// - [`matcher`] — Case-insensitive substring targets.
/// - [`transport`] — Streaming HTTP retrieval behind the `Transport` trait.
/// - [`search`] — Per-file sessions and the sequential orchestrator.
/// - [`controller`] — Start/stop/clear control surface with event history.
/// - [`model`] — Request type, match positions, and display formatting.
pub mod controller;
pub mod decode;
pub mod error;
pub mod lines;
pub mod matcher;
pub mod model;
pub mod search;
pub mod transport;

pub use error::{SearchError, ValidationError};
