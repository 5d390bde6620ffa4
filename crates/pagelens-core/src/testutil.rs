//! Test doubles shared across module tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;

use pagelens_protocols::capability::{
    Availability, CapabilityKind, CapabilityProvider, ChunkStream, ModelSession, SessionOptions,
};
use pagelens_protocols::cancel::CancelToken;
use pagelens_protocols::error::{ExtractError, GatewayError, SettingsError};
use pagelens_protocols::render::{RenderSink, StatusNote};
use pagelens_protocols::types::{
    ArtifactKind, LanguageCode, PageSnapshot, RenderPayload, Settings, TabId,
};
use pagelens_protocols::{SettingsStore, TextExtractor};

/// Session lifecycle counters shared between a mock and the test body.
#[derive(Default)]
pub struct Counters {
    created: AtomicUsize,
    destroyed: AtomicUsize,
    invocations: AtomicUsize,
}

impl Counters {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

/// Scripted behavior for one created session. Scripts are consumed in
/// session-creation order; when the queue is empty the default repeats.
#[derive(Debug, Clone)]
pub enum Script {
    /// `invoke` returns this text; `invoke_stream` yields it whole.
    Reply(String),
    /// `invoke_stream` yields these chunks; `invoke` joins them.
    Chunks(Vec<String>),
    /// Every invocation reports the input as too large.
    TooLarge,
    /// Every invocation fails with this message.
    Fail(String),
    /// Returns the input prefixed, e.g. a fake translator.
    Prefix(String),
    /// `invoke_stream` yields these chunks with a delay before each,
    /// leaving a window to cancel mid-flight.
    SlowChunks { chunks: Vec<String>, delay: Duration },
}

impl Script {
    pub fn reply(text: impl Into<String>) -> Self {
        Script::Reply(text.into())
    }

    pub fn chunks<I: IntoIterator<Item = S>, S: Into<String>>(chunks: I) -> Self {
        Script::Chunks(chunks.into_iter().map(Into::into).collect())
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        Script::Prefix(prefix.into())
    }

    pub fn slow_chunks<I: IntoIterator<Item = S>, S: Into<String>>(
        chunks: I,
        delay_ms: u64,
    ) -> Self {
        Script::SlowChunks {
            chunks: chunks.into_iter().map(Into::into).collect(),
            delay: Duration::from_millis(delay_ms),
        }
    }
}

/// Scriptable capability provider.
pub struct MockCapability {
    kind: CapabilityKind,
    availability: Availability,
    failing_probe: bool,
    scripts: Mutex<VecDeque<Script>>,
    default_script: Script,
    counters: Arc<Counters>,
}

impl MockCapability {
    pub fn new(kind: CapabilityKind) -> Self {
        Self {
            kind,
            availability: Availability::Available,
            failing_probe: false,
            scripts: Mutex::new(VecDeque::new()),
            default_script: Script::reply(""),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    pub fn failing_probe(mut self) -> Self {
        self.failing_probe = true;
        self
    }

    /// Default script for every session.
    pub fn with_script(mut self, script: Script) -> Self {
        self.default_script = script;
        self
    }

    /// Per-session scripts, applied in creation order.
    pub fn with_scripts(self, scripts: Vec<Script>) -> Self {
        *self.scripts.lock() = scripts.into();
        self
    }

    pub fn counters(&self) -> Arc<Counters> {
        self.counters.clone()
    }
}

#[async_trait]
impl CapabilityProvider for MockCapability {
    fn kind(&self) -> CapabilityKind {
        self.kind
    }

    async fn availability(
        &self,
        _lang_hint: Option<LanguageCode>,
    ) -> Result<Availability, GatewayError> {
        if self.failing_probe {
            return Err(GatewayError::Invocation("probe exploded".to_string()));
        }
        Ok(self.availability)
    }

    async fn create_session(
        &self,
        options: SessionOptions,
    ) -> Result<Box<dyn ModelSession>, GatewayError> {
        self.counters.created.fetch_add(1, Ordering::SeqCst);
        let script = self
            .scripts
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.default_script.clone());
        Ok(Box::new(MockSession {
            script,
            counters: self.counters.clone(),
            token: options.token,
        }))
    }
}

struct MockSession {
    script: Script,
    counters: Arc<Counters>,
    token: Option<Arc<CancelToken>>,
}

impl MockSession {
    fn check_token(&self) -> Result<(), GatewayError> {
        if self.token.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Err(GatewayError::Cancelled);
        }
        Ok(())
    }
}

#[async_trait]
impl ModelSession for MockSession {
    async fn invoke(&self, input: &str) -> Result<String, GatewayError> {
        self.counters.invocations.fetch_add(1, Ordering::SeqCst);
        self.check_token()?;
        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Chunks(chunks) => Ok(chunks.concat()),
            Script::TooLarge => Err(GatewayError::InputTooLarge {
                chars: input.chars().count(),
            }),
            Script::Fail(message) => Err(GatewayError::Invocation(message.clone())),
            Script::Prefix(prefix) => Ok(format!("{prefix}{input}")),
            Script::SlowChunks { chunks, delay } => {
                tokio::time::sleep(*delay).await;
                Ok(chunks.concat())
            }
        }
    }

    async fn invoke_stream(&self, input: &str) -> Result<ChunkStream, GatewayError> {
        self.counters.invocations.fetch_add(1, Ordering::SeqCst);
        self.check_token()?;
        let chunks: Vec<String> = match &self.script {
            Script::Reply(text) => vec![text.clone()],
            Script::Chunks(chunks) => chunks.clone(),
            Script::TooLarge => {
                return Err(GatewayError::InputTooLarge {
                    chars: input.chars().count(),
                })
            }
            Script::Fail(message) => return Err(GatewayError::Invocation(message.clone())),
            Script::Prefix(prefix) => vec![format!("{prefix}{input}")],
            Script::SlowChunks { chunks, delay } => {
                let delay = *delay;
                return Ok(Box::pin(futures::stream::iter(chunks.clone()).then(
                    move |chunk| async move {
                        tokio::time::sleep(delay).await;
                        Ok::<String, GatewayError>(chunk)
                    },
                )));
            }
        };
        Ok(Box::pin(futures::stream::iter(
            chunks.into_iter().map(Ok),
        )))
    }

    async fn destroy(&mut self) {
        self.counters.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Render sink that records every call.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Page(String),
    Publish(ArtifactKind, RenderPayload),
    Partial(ArtifactKind, String),
    Clear(ArtifactKind),
    Status(StatusNote),
}

impl RecordingSink {
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }

    /// Last published payload for an artifact kind.
    pub fn published(&self, kind: ArtifactKind) -> Option<RenderPayload> {
        self.events
            .lock()
            .iter()
            .rev()
            .find_map(|event| match event {
                SinkEvent::Publish(k, payload) if *k == kind => Some(payload.clone()),
                _ => None,
            })
    }

    /// Partial texts published for an artifact kind, in order.
    pub fn partials(&self, kind: ArtifactKind) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Partial(k, text) if *k == kind => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<StatusNote> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Status(note) => Some(note.clone()),
                _ => None,
            })
            .collect()
    }
}

impl RenderSink for RecordingSink {
    fn page(&self, snapshot: &PageSnapshot) {
        self.events
            .lock()
            .push(SinkEvent::Page(snapshot.url.clone()));
    }

    fn publish(&self, kind: ArtifactKind, payload: RenderPayload) {
        self.events.lock().push(SinkEvent::Publish(kind, payload));
    }

    fn publish_partial(&self, kind: ArtifactKind, text: &str) {
        self.events
            .lock()
            .push(SinkEvent::Partial(kind, text.to_string()));
    }

    fn clear(&self, kind: ArtifactKind) {
        self.events.lock().push(SinkEvent::Clear(kind));
    }

    fn status(&self, note: StatusNote) {
        self.events.lock().push(SinkEvent::Status(note));
    }
}

/// Extractor backed by a fixed tab->snapshot map.
pub struct MapExtractor {
    pages: Mutex<HashMap<TabId, PageSnapshot>>,
    calls: Arc<Counters>,
}

impl MapExtractor {
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            calls: Arc::new(Counters::default()),
        }
    }

    pub fn with_page(self, tab: TabId, snapshot: PageSnapshot) -> Self {
        self.pages.lock().insert(tab, snapshot);
        self
    }

    pub fn set_page(&self, tab: TabId, snapshot: PageSnapshot) {
        self.pages.lock().insert(tab, snapshot);
    }

    /// Number of extract calls made (via the shared invocation counter).
    pub fn calls(&self) -> Arc<Counters> {
        self.calls.clone()
    }
}

#[async_trait]
impl TextExtractor for MapExtractor {
    async fn extract(&self, tab: TabId) -> Result<PageSnapshot, ExtractError> {
        self.calls.invocations.fetch_add(1, Ordering::SeqCst);
        self.pages
            .lock()
            .get(&tab)
            .cloned()
            .ok_or(ExtractError::InaccessiblePage)
    }
}

/// In-memory settings store.
#[derive(Default)]
pub struct MemorySettingsStore {
    settings: Mutex<Settings>,
    pub fail_saves: std::sync::atomic::AtomicBool,
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<Settings, SettingsError> {
        Ok(self.settings.lock().clone())
    }

    async fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(SettingsError::Store("quota exceeded".to_string()));
        }
        *self.settings.lock() = settings.clone();
        Ok(())
    }
}

/// Shorthand snapshot for tests.
pub fn snapshot(text: &str, url: &str, lang: Option<&str>) -> PageSnapshot {
    PageSnapshot::new(text, "Test Page", url, lang.map(str::to_string))
}
