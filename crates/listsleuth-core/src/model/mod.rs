/// Data model — search request, match positions, and display formatting.
pub mod position;
pub mod request;
pub mod size;

pub use position::MatchPosition;
pub use request::SearchRequest;
