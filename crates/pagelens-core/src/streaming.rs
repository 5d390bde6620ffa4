//! Stream chunk accumulation with cumulative/delta auto-detection.

/// How a provider chunks its stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkMode {
    /// Not yet known; decided when the second chunk arrives.
    Undetected,
    /// Each chunk replaces the accumulated text.
    Cumulative,
    /// Each chunk is appended to the accumulated text.
    Delta,
}

/// Accumulates streamed chunks into monotonically growing text.
///
/// Providers disagree on chunk semantics: some emit deltas, some emit
/// the full text so far. The first two chunks are compared once per
/// stream - if the second begins with the first, the stream is treated
/// as cumulative and later chunks replace the text; otherwise chunks
/// are appended. The decision is remembered for the stream's duration.
#[derive(Debug)]
pub struct StreamAccumulator {
    mode: ChunkMode,
    text: String,
    seen_first: bool,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self {
            mode: ChunkMode::Undetected,
            text: String::new(),
            seen_first: false,
        }
    }

    /// Apply one chunk and return the accumulated text so far.
    pub fn push(&mut self, chunk: &str) -> &str {
        if !self.seen_first {
            self.seen_first = true;
            self.text.clear();
            self.text.push_str(chunk);
            return &self.text;
        }

        if self.mode == ChunkMode::Undetected {
            self.mode = if chunk.starts_with(&self.text) {
                ChunkMode::Cumulative
            } else {
                ChunkMode::Delta
            };
        }

        match self.mode {
            ChunkMode::Cumulative => {
                self.text.clear();
                self.text.push_str(chunk);
            }
            _ => self.text.push_str(chunk),
        }
        &self.text
    }

    /// Accumulated text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Detected chunk mode.
    pub fn mode(&self) -> ChunkMode {
        self.mode
    }

    /// Take the accumulated text, consuming the accumulator.
    pub fn into_text(self) -> String {
        self.text
    }
}

impl Default for StreamAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
