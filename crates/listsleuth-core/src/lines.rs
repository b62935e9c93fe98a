/// Line reassembly across chunk boundaries.
///
/// Decoded text arrives in arbitrary fragments. The reassembler hands back
/// only lines known to be complete and keeps the trailing fragment until the
/// next push or the final `finish`.

#[derive(Debug, Default)]
pub struct LineReassembler {
    pending: String,
}

impl LineReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text` and return every line it completed, in order.
    ///
    /// Lines are split on `\n`; a `\r` directly before the `\n` is dropped so
    /// `\r\n` files produce the same lines. The segment after the last `\n`
    /// (possibly empty) stays pending.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        // Only the new text can contain the next terminator.
        let Some(last_nl) = text.rfind('\n') else {
            self.pending.push_str(text);
            return Vec::new();
        };

        let mut block = std::mem::take(&mut self.pending);
        block.push_str(&text[..last_nl]);
        self.pending.push_str(&text[last_nl + 1..]);

        block.split('\n').map(strip_cr).collect()
    }

    /// End of stream: the pending fragment, if non-empty, is the last line.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let last = std::mem::take(&mut self.pending);
        Some(strip_cr(&last))
    }

    pub fn pending(&self) -> &str {
        &self.pending
    }
}

fn strip_cr(line: &str) -> String {
    line.strip_suffix('\r').unwrap_or(line).to_string()
}
