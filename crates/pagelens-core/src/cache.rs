//! Tab-scoped artifact cache.
//!
//! One entry per live tab, created lazily on first artifact completion,
//! invalidated on navigation, evicted on tab close. Entries are never
//! shared across tabs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

use pagelens_protocols::render::RenderSink;
use pagelens_protocols::types::{
    ArtifactKind, ArtifactResult, ChatMessage, GenerationStatus, PageSnapshot, RenderPayload,
    SummaryType, TabId,
};

/// Cached per-tab state.
#[derive(Debug, Clone)]
pub struct TabCacheEntry {
    /// Snapshot the artifacts were generated from. Never mutated after
    /// creation except by full replacement.
    pub snapshot: PageSnapshot,
    /// Summary type in effect when the entry was seeded.
    pub summary_type: SummaryType,
    /// Completed artifacts by kind.
    pub artifacts: HashMap<ArtifactKind, ArtifactResult>,
    /// Ordered chat transcript for this tab.
    pub transcript: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
}

impl TabCacheEntry {
    fn new(snapshot: PageSnapshot, summary_type: SummaryType) -> Self {
        Self {
            snapshot,
            summary_type,
            artifacts: HashMap::new(),
            transcript: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Keyed store of per-tab generated artifacts, surviving tab switches.
pub struct TabCache {
    entries: RwLock<HashMap<TabId, TabCacheEntry>>,
}

impl TabCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Upsert an artifact, creating the tab's entry if absent (seeded
    /// with the given snapshot and summary type).
    pub fn put(
        &self,
        tab: TabId,
        seed: &PageSnapshot,
        summary_type: SummaryType,
        kind: ArtifactKind,
        result: ArtifactResult,
    ) {
        let mut entries = self.entries.write();
        let entry = entries
            .entry(tab)
            .or_insert_with(|| TabCacheEntry::new(seed.clone(), summary_type));
        entry.artifacts.insert(kind, result);
        debug!(%tab, artifact = %kind, "cached artifact");
    }

    /// Append a chat message to the tab's transcript, creating the
    /// entry if absent.
    pub fn append_chat(
        &self,
        tab: TabId,
        seed: &PageSnapshot,
        summary_type: SummaryType,
        message: ChatMessage,
    ) {
        let mut entries = self.entries.write();
        let entry = entries
            .entry(tab)
            .or_insert_with(|| TabCacheEntry::new(seed.clone(), summary_type));
        entry.transcript.push(message);
    }

    /// Persist any completed artifacts not yet committed for the tab,
    /// creating an entry if necessary. Called before switching away.
    pub fn capture_in_flight(
        &self,
        tab: TabId,
        seed: &PageSnapshot,
        summary_type: SummaryType,
        live: &HashMap<ArtifactKind, ArtifactResult>,
    ) {
        let completed: Vec<_> = live
            .iter()
            .filter(|(_, result)| result.status == GenerationStatus::Done)
            .collect();
        if completed.is_empty() {
            return;
        }
        let mut entries = self.entries.write();
        let entry = entries
            .entry(tab)
            .or_insert_with(|| TabCacheEntry::new(seed.clone(), summary_type));
        for (kind, result) in completed {
            entry
                .artifacts
                .entry(*kind)
                .or_insert_with(|| result.clone());
        }
    }

    /// Republish a tab's snapshot, every stored artifact, and the chat
    /// transcript into the render layer. Returns whether restoration
    /// occurred.
    ///
    /// Payloads are republished structured (not as flat text) so
    /// interactive affordances like quiz answer reveal re-bind.
    pub fn restore(&self, tab: TabId, sink: &dyn RenderSink) -> bool {
        let entries = self.entries.read();
        let Some(entry) = entries.get(&tab) else {
            return false;
        };
        sink.page(&entry.snapshot);
        for kind in ArtifactKind::ALL {
            if let Some(payload) = entry
                .artifacts
                .get(&kind)
                .and_then(|result| result.payload.clone())
            {
                sink.publish(kind, payload);
            }
        }
        for message in &entry.transcript {
            sink.publish(ArtifactKind::ChatAnswer, RenderPayload::Chat(message.clone()));
        }
        debug!(%tab, "restored cached tab state");
        true
    }

    /// Drop the tab's entry on navigation. No artifact survives.
    pub fn invalidate(&self, tab: TabId) {
        if self.entries.write().remove(&tab).is_some() {
            debug!(%tab, "invalidated cache entry on navigation");
        }
    }

    /// Drop the tab's entry on tab close.
    pub fn evict(&self, tab: TabId) {
        if self.entries.write().remove(&tab).is_some() {
            debug!(%tab, "evicted cache entry on tab close");
        }
    }

    /// Whether the tab has a cache entry.
    pub fn contains(&self, tab: TabId) -> bool {
        self.entries.read().contains_key(&tab)
    }

    /// Clone of the tab's entry, if any.
    pub fn entry(&self, tab: TabId) -> Option<TabCacheEntry> {
        self.entries.read().get(&tab).cloned()
    }

    /// Raw text of the tab's cached summary, preferring TL;DR over key
    /// points. Used as bounded chat context.
    pub fn summary_text(&self, tab: TabId) -> Option<String> {
        let entries = self.entries.read();
        let entry = entries.get(&tab)?;
        [ArtifactKind::Tldr, ArtifactKind::KeyPoints]
            .iter()
            .find_map(|kind| entry.artifacts.get(kind)?.raw_text.clone())
    }

    /// Ordered chat transcript for the tab.
    pub fn transcript(&self, tab: TabId) -> Vec<ChatMessage> {
        self.entries
            .read()
            .get(&tab)
            .map(|entry| entry.transcript.clone())
            .unwrap_or_default()
    }
}

impl Default for TabCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{snapshot, RecordingSink, SinkEvent};
    use pagelens_protocols::types::RenderPayload;

    fn done(text: &str) -> ArtifactResult {
        ArtifactResult::done(text, RenderPayload::Text(text.to_string()))
    }

    #[test]
    fn test_put_creates_entry_lazily() {
        let cache = TabCache::new();
        let tab = TabId(1);
        assert!(!cache.contains(tab));

        cache.put(
            tab,
            &snapshot("text", "https://a.example", None),
            SummaryType::Both,
            ArtifactKind::Tldr,
            done("A"),
        );
        let entry = cache.entry(tab).unwrap();
        assert_eq!(entry.snapshot.url, "https://a.example");
        assert_eq!(
            entry.artifacts[&ArtifactKind::Tldr].raw_text.as_deref(),
            Some("A")
        );
    }

    #[test]
    fn test_restore_republishes_artifacts() {
        let cache = TabCache::new();
        let tab = TabId(1);
        let snap = snapshot("text", "https://a.example", None);
        cache.put(tab, &snap, SummaryType::Both, ArtifactKind::Tldr, done("A"));
        cache.put(
            tab,
            &snap,
            SummaryType::Both,
            ArtifactKind::Quiz,
            done("Q1: q\nA1: a"),
        );

        let sink = RecordingSink::default();
        assert!(cache.restore(tab, &sink));

        let events = sink.events();
        assert_eq!(events[0], SinkEvent::Page("https://a.example".to_string()));
        assert_eq!(
            sink.published(ArtifactKind::Tldr),
            Some(RenderPayload::Text("A".to_string()))
        );
        assert!(sink.published(ArtifactKind::Quiz).is_some());
    }

    #[test]
    fn test_restore_republishes_transcript_in_order() {
        let cache = TabCache::new();
        let tab = TabId(2);
        let snap = snapshot("text", "https://a.example", None);
        cache.put(tab, &snap, SummaryType::Both, ArtifactKind::Tldr, done("A"));
        cache.append_chat(tab, &snap, SummaryType::Both, ChatMessage::user("why?"));
        cache.append_chat(tab, &snap, SummaryType::Both, ChatMessage::assistant("because."));

        let sink = RecordingSink::default();
        assert!(cache.restore(tab, &sink));

        let chats: Vec<_> = sink
            .events()
            .into_iter()
            .filter_map(|event| match event {
                SinkEvent::Publish(ArtifactKind::ChatAnswer, RenderPayload::Chat(message)) => {
                    Some(message.text)
                }
                _ => None,
            })
            .collect();
        assert_eq!(chats, vec!["why?".to_string(), "because.".to_string()]);
    }

    #[test]
    fn test_restore_missing_tab_returns_false() {
        let cache = TabCache::new();
        let sink = RecordingSink::default();
        assert!(!cache.restore(TabId(9), &sink));
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_invalidate_drops_everything() {
        let cache = TabCache::new();
        let tab = TabId(1);
        let snap = snapshot("text", "https://a.example", None);
        cache.put(tab, &snap, SummaryType::Both, ArtifactKind::Tldr, done("A"));
        cache.append_chat(tab, &snap, SummaryType::Both, ChatMessage::user("q"));

        cache.invalidate(tab);
        assert!(!cache.contains(tab));
        assert!(cache.transcript(tab).is_empty());

        let sink = RecordingSink::default();
        assert!(!cache.restore(tab, &sink));
    }

    #[test]
    fn test_entries_are_per_tab() {
        let cache = TabCache::new();
        let snap1 = snapshot("one", "https://one.example", None);
        let snap2 = snapshot("two", "https://two.example", None);
        cache.put(TabId(1), &snap1, SummaryType::Both, ArtifactKind::Tldr, done("A"));
        cache.put(TabId(2), &snap2, SummaryType::Both, ArtifactKind::Tldr, done("B"));

        cache.evict(TabId(1));
        assert!(!cache.contains(TabId(1)));
        let entry = cache.entry(TabId(2)).unwrap();
        assert_eq!(
            entry.artifacts[&ArtifactKind::Tldr].raw_text.as_deref(),
            Some("B")
        );
    }

    #[test]
    fn test_capture_in_flight_commits_completed_only() {
        let cache = TabCache::new();
        let tab = TabId(3);
        let snap = snapshot("text", "https://a.example", None);

        let mut live = HashMap::new();
        live.insert(ArtifactKind::Quiz, done("Q1: q\nA1: a"));
        live.insert(
            ArtifactKind::Tldr,
            ArtifactResult {
                raw_text: None,
                payload: None,
                status: GenerationStatus::Running,
            },
        );

        cache.capture_in_flight(tab, &snap, SummaryType::Both, &live);
        let entry = cache.entry(tab).unwrap();
        assert!(entry.artifacts.contains_key(&ArtifactKind::Quiz));
        assert!(!entry.artifacts.contains_key(&ArtifactKind::Tldr));
    }

    #[test]
    fn test_capture_in_flight_does_not_overwrite_committed() {
        let cache = TabCache::new();
        let tab = TabId(3);
        let snap = snapshot("text", "https://a.example", None);
        cache.put(tab, &snap, SummaryType::Both, ArtifactKind::Tldr, done("committed"));

        let mut live = HashMap::new();
        live.insert(ArtifactKind::Tldr, done("stale"));
        cache.capture_in_flight(tab, &snap, SummaryType::Both, &live);

        let entry = cache.entry(tab).unwrap();
        assert_eq!(
            entry.artifacts[&ArtifactKind::Tldr].raw_text.as_deref(),
            Some("committed")
        );
    }

    #[test]
    fn test_summary_text_prefers_tldr() {
        let cache = TabCache::new();
        let tab = TabId(4);
        let snap = snapshot("text", "https://a.example", None);
        cache.put(tab, &snap, SummaryType::Both, ArtifactKind::KeyPoints, done("points"));
        assert_eq!(cache.summary_text(tab).as_deref(), Some("points"));

        cache.put(tab, &snap, SummaryType::Both, ArtifactKind::Tldr, done("tldr"));
        assert_eq!(cache.summary_text(tab).as_deref(), Some("tldr"));
    }

    #[test]
    fn test_transcript_order() {
        let cache = TabCache::new();
        let tab = TabId(5);
        let snap = snapshot("text", "https://a.example", None);
        cache.append_chat(tab, &snap, SummaryType::Both, ChatMessage::user("first"));
        cache.append_chat(tab, &snap, SummaryType::Both, ChatMessage::assistant("second"));

        let transcript = cache.transcript(tab);
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].text, "first");
        assert_eq!(transcript[1].text, "second");
    }
}
