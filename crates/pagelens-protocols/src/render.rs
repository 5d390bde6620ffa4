//! Render-layer contract.
//!
//! The render layer consumes streamed text and structured payloads and
//! produces UI widgets. The core guarantees everything handed over is
//! plain text with no executable markup; see [`sanitize_plain`].

use crate::types::{ArtifactKind, PageSnapshot, RenderPayload};

/// A user-visible status message.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusNote {
    /// Panel-wide banner (extraction failures, download prompts).
    Banner(String),
    /// Message shown inline in one artifact's area.
    Inline {
        kind: ArtifactKind,
        message: String,
    },
}

/// The render layer, injected into the panel session.
///
/// Called only from the event loop; implementations need no internal
/// ordering beyond call order.
pub trait RenderSink: Send + Sync {
    /// Show page metadata (title, URL, character count) for a snapshot.
    fn page(&self, snapshot: &PageSnapshot);

    /// Publish the final payload for an artifact.
    fn publish(&self, kind: ArtifactKind, payload: RenderPayload);

    /// Publish the partial accumulated text of an in-flight stream.
    /// Text grows monotonically between calls for one generation.
    fn publish_partial(&self, kind: ArtifactKind, text: &str);

    /// Clear an artifact's area (cancellation, tab switch, navigation).
    fn clear(&self, kind: ArtifactKind);

    /// Show a status message.
    fn status(&self, note: StatusNote);
}

/// Strip markup and control characters so the render layer only ever
/// receives inert plain text. Anything between `<` and `>` is dropped;
/// an unclosed `<` drops the rest of the line.
pub fn sanitize_plain(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            '\n' => {
                in_tag = false;
                out.push('\n');
            }
            c if in_tag => {
                let _ = c;
            }
            c if c.is_control() && c != '\t' => {}
            c => out.push(c),
        }
    }
    out
}
