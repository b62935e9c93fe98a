/// Approximate position of a match within its file.
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPosition {
    /// Percentage of the advertised body length read when the match was
    /// seen, in `1..=100`.
    Percent(u8),
    /// The server did not advertise a body length.
    Unknown,
    /// The match was in the final, unterminated line.
    Eof,
}

impl MatchPosition {
    /// Position after `bytes_read` bytes of a body of `total_bytes`.
    ///
    /// Chunk granularity makes this approximate: the percentage refers to the
    /// end of the chunk that completed the matching line. Never below 1%.
    pub fn from_progress(bytes_read: u64, total_bytes: Option<u64>) -> Self {
        match total_bytes {
            Some(total) => {
                let pct = bytes_read.saturating_mul(100) / total.max(1);
                MatchPosition::Percent(pct.clamp(1, 100) as u8)
            }
            None => MatchPosition::Unknown,
        }
    }
}

impl fmt::Display for MatchPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPosition::Percent(p) => write!(f, "{p}%"),
            MatchPosition::Unknown => f.write_str("unknown"),
            MatchPosition::Eof => f.write_str("EOF"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_floored() {
        assert_eq!(
            MatchPosition::from_progress(999, Some(1000)),
            MatchPosition::Percent(99)
        );
        assert_eq!(
            MatchPosition::from_progress(500, Some(1000)),
            MatchPosition::Percent(50)
        );
    }

    #[test]
    fn percent_never_below_one() {
        assert_eq!(
            MatchPosition::from_progress(1, Some(1_000_000)),
            MatchPosition::Percent(1)
        );
        assert_eq!(MatchPosition::from_progress(0, Some(0)), MatchPosition::Percent(1));
    }

    #[test]
    fn percent_capped_when_body_exceeds_advertised_length() {
        // Compressed transfers advertise the encoded length.
        assert_eq!(
            MatchPosition::from_progress(5000, Some(1000)),
            MatchPosition::Percent(100)
        );
    }

    #[test]
    fn unknown_without_total() {
        assert_eq!(MatchPosition::from_progress(123, None), MatchPosition::Unknown);
    }

    #[test]
    fn display() {
        assert_eq!(MatchPosition::Percent(42).to_string(), "42%");
        assert_eq!(MatchPosition::Unknown.to_string(), "unknown");
        assert_eq!(MatchPosition::Eof.to_string(), "EOF");
    }
}
