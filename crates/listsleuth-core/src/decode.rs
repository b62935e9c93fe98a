/// Incremental UTF-8 decoding of transport chunks.
///
/// A multi-byte character can be split across two chunks. The decoder keeps
/// the incomplete tail (at most 3 bytes) and prepends it to the next chunk.
/// Malformed input is replaced with U+FFFD rather than failing, so a corrupt
/// byte in a wordlist never stops the search.

/// Longest possible incomplete UTF-8 prefix.
const MAX_PENDING: usize = 3;

/// Stateful decoder for one byte stream.
#[derive(Debug, Default)]
pub struct ChunkDecoder {
    pending: Vec<u8>,
}

impl ChunkDecoder {
    pub fn new() -> Self {
        Self {
            pending: Vec::with_capacity(MAX_PENDING),
        }
    }

    /// Decode the next chunk, carrying any incomplete trailing character
    /// over to the following call.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        if self.pending.is_empty() {
            return self.decode_bytes(chunk);
        }
        let mut joined = std::mem::take(&mut self.pending);
        joined.extend_from_slice(chunk);
        self.decode_bytes(&joined)
    }

    /// Flush at end of stream. A dangling partial character becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let tail = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&tail).into_owned()
    }

    /// Bytes currently held back waiting for the rest of a character.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn decode_bytes(&mut self, mut bytes: &[u8]) -> String {
        let mut out = String::with_capacity(bytes.len());
        loop {
            match std::str::from_utf8(bytes) {
                Ok(valid) => {
                    out.push_str(valid);
                    return out;
                }
                Err(err) => {
                    let (valid, rest) = bytes.split_at(err.valid_up_to());
                    // `valid_up_to` marks a verified prefix; this never allocates.
                    out.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            bytes = &rest[bad..];
                        }
                        None => {
                            // Incomplete sequence at the very end.
                            self.pending.extend_from_slice(rest);
                            return out;
                        }
                    }
                }
            }
        }
    }
}
