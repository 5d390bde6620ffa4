//! Panel session: the UI-facing operation surface.
//!
//! One `PanelSession` serves one side panel. It owns the per-tab cache,
//! the slot controller and the live artifact map, and wires injected
//! collaborators (extractor, settings store, render sink) to the
//! generation pipeline. Every await point may interleave with a tab
//! switch, so tab currency is re-checked before anything is published
//! or committed.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use pagelens_protocols::error::PipelineError;
use pagelens_protocols::render::{sanitize_plain, RenderSink, StatusNote};
use pagelens_protocols::types::{
    ArtifactKind, ArtifactResult, ChatMessage, DialogueTurn, GenerationStatus, LanguageCode,
    OutputLanguagePref, PageSnapshot, QuizPair, RenderPayload, Settings, SummaryType, TabId,
    TaggedItem,
};
use pagelens_protocols::{SettingsStore, TextExtractor};

use crate::cache::TabCache;
use crate::control::SlotController;
use crate::gateway::ModelGateway;
use crate::language::resolve_output_language;
use crate::messages::localized_message;
use crate::pipeline::GenerationPipeline;

/// Injected collaborators for a panel session.
pub struct PanelDeps {
    pub gateway: Arc<ModelGateway>,
    pub extractor: Arc<dyn TextExtractor>,
    pub settings_store: Arc<dyn SettingsStore>,
    pub sink: Arc<dyn RenderSink>,
}

pub struct PanelSession {
    pipeline: GenerationPipeline,
    cache: TabCache,
    controller: SlotController,
    extractor: Arc<dyn TextExtractor>,
    settings_store: Arc<dyn SettingsStore>,
    sink: Arc<dyn RenderSink>,
    settings: RwLock<Settings>,
    current_tab: RwLock<Option<TabId>>,
    snapshot: RwLock<Option<PageSnapshot>>,
    /// Artifact state for the current tab, including in-flight runs.
    live: Mutex<HashMap<ArtifactKind, ArtifactResult>>,
}

impl PanelSession {
    /// Build a session, loading persisted settings (defaults on a
    /// failed load).
    pub async fn new(deps: PanelDeps) -> Self {
        let settings = match deps.settings_store.load().await {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "settings load failed, using defaults");
                Settings::default()
            }
        };
        Self {
            pipeline: GenerationPipeline::new(deps.gateway),
            cache: TabCache::new(),
            controller: SlotController::new(),
            extractor: deps.extractor,
            settings_store: deps.settings_store,
            sink: deps.sink,
            settings: RwLock::new(settings),
            current_tab: RwLock::new(None),
            snapshot: RwLock::new(None),
            live: Mutex::new(HashMap::new()),
        }
    }

    pub fn current_settings(&self) -> Settings {
        self.settings.read().clone()
    }

    pub fn current_tab(&self) -> Option<TabId> {
        *self.current_tab.read()
    }

    pub fn cache(&self) -> &TabCache {
        &self.cache
    }

    /// Slot lifecycle state of an artifact on the current tab.
    pub fn generation_status(&self, kind: ArtifactKind) -> GenerationStatus {
        self.live
            .lock()
            .get(&kind)
            .map(|result| result.status)
            .unwrap_or(GenerationStatus::Idle)
    }

    fn is_current(&self, tab: TabId) -> bool {
        *self.current_tab.read() == Some(tab)
    }

    /// Effective output language: explicit selection, else the page's
    /// declared language when supported, else English.
    fn output_language(&self) -> LanguageCode {
        let pref = self.settings.read().output_language;
        let page_lang = self
            .snapshot
            .read()
            .as_ref()
            .and_then(|snapshot| snapshot.lang.clone());
        resolve_output_language(pref, page_lang.as_deref())
    }

    /// Generate one artifact inside a user gesture.
    pub async fn start_generation(&self, kind: ArtifactKind) {
        if kind == ArtifactKind::ChatAnswer {
            // Chat goes through submit_chat_question.
            warn!("chat answers are driven by question submission");
            return;
        }
        self.run_generation(kind, true).await;
    }

    /// Generate the configured summary artifacts. `user_gesture` is
    /// false for auto-summarize on tab activation.
    pub async fn summarize(&self, user_gesture: bool) {
        let kinds: &[ArtifactKind] = match self.settings.read().summary_type {
            SummaryType::Tldr => &[ArtifactKind::Tldr],
            SummaryType::KeyPoints => &[ArtifactKind::KeyPoints],
            SummaryType::Both => &[ArtifactKind::Tldr, ArtifactKind::KeyPoints],
        };
        for &kind in kinds {
            self.run_generation(kind, user_gesture).await;
        }
    }

    async fn run_generation(&self, kind: ArtifactKind, user_gesture: bool) {
        let Some(tab) = self.current_tab() else {
            return;
        };
        let Some(snapshot) = self.snapshot.read().clone() else {
            return;
        };
        let settings = self.current_settings();
        let target = self.output_language();

        let token = self.controller.begin(kind);
        self.live.lock().insert(
            kind,
            ArtifactResult {
                raw_text: None,
                payload: None,
                status: GenerationStatus::Running,
            },
        );
        self.sink.clear(kind);

        let sink = &self.sink;
        let outcome: Result<(String, RenderPayload), PipelineError> = match kind {
            ArtifactKind::Tldr => self
                .pipeline
                .generate_tldr(
                    &snapshot,
                    settings.summary_length,
                    target,
                    user_gesture,
                    &token,
                    &mut |partial| sink.publish_partial(kind, &sanitize_plain(partial)),
                )
                .await
                .map(|text| {
                    let text = sanitize_plain(&text);
                    (text.clone(), RenderPayload::Text(text))
                }),
            ArtifactKind::KeyPoints => self
                .pipeline
                .generate_key_points(
                    &snapshot,
                    settings.summary_length,
                    target,
                    user_gesture,
                    &token,
                )
                .await
                .map(|(raw, items)| (raw, RenderPayload::Tagged(sanitize_items(items)))),
            ArtifactKind::Quiz => self
                .pipeline
                .generate_quiz(&snapshot, target, user_gesture, &token)
                .await
                .map(|(raw, pairs)| (raw, RenderPayload::Quiz(sanitize_pairs(pairs)))),
            ArtifactKind::Dialogue => self
                .pipeline
                .generate_dialogue(&snapshot, target, user_gesture, &token)
                .await
                .map(|(raw, turns)| (raw, RenderPayload::Dialogue(sanitize_turns(turns)))),
            ArtifactKind::ChatAnswer => unreachable!("filtered in start_generation"),
        };

        self.controller.finish(kind, &token);
        match outcome {
            Ok((raw, payload)) => {
                if !self.is_current(tab) || token.is_cancelled() {
                    debug!(artifact = %kind, "discarding result for superseded generation");
                    return;
                }
                let result = ArtifactResult::done(&raw, payload.clone());
                self.cache
                    .put(tab, &snapshot, settings.summary_type, kind, result.clone());
                self.live.lock().insert(kind, result);
                self.sink.publish(kind, payload);
            }
            Err(e) if e.is_cancellation() => {
                // Terminal non-error: discard partials, no cache write.
                // A run settling after a tab switch must not touch the
                // new tab's live state either.
                if self.is_current(tab) {
                    self.live.lock().insert(
                        kind,
                        ArtifactResult {
                            raw_text: None,
                            payload: None,
                            status: GenerationStatus::Cancelled,
                        },
                    );
                    self.sink.clear(kind);
                }
            }
            Err(e) => {
                warn!(artifact = %kind, error = %e, "generation failed");
                if self.is_current(tab) {
                    self.live.lock().insert(
                        kind,
                        ArtifactResult {
                            raw_text: None,
                            payload: None,
                            status: GenerationStatus::Error,
                        },
                    );
                    self.sink.status(StatusNote::Inline {
                        kind,
                        message: localized_message(&e, Some(kind), target),
                    });
                }
            }
        }
    }

    /// Cancel the artifact's in-flight generation, if any.
    pub fn cancel_generation(&self, kind: ArtifactKind) {
        self.controller.cancel(kind);
        self.live.lock().insert(
            kind,
            ArtifactResult {
                raw_text: None,
                payload: None,
                status: GenerationStatus::Cancelled,
            },
        );
        self.sink.clear(kind);
    }

    /// Ask a question about the current page inside a user gesture.
    pub async fn submit_chat_question(&self, text: &str) {
        let Some(tab) = self.current_tab() else {
            return;
        };
        let Some(snapshot) = self.snapshot.read().clone() else {
            return;
        };
        let question = sanitize_plain(text.trim());
        if question.is_empty() {
            return;
        }
        let settings = self.current_settings();
        let target = self.output_language();
        let kind = ArtifactKind::ChatAnswer;

        let user_message = ChatMessage::user(&question);
        self.cache
            .append_chat(tab, &snapshot, settings.summary_type, user_message.clone());
        self.sink.publish(kind, RenderPayload::Chat(user_message));

        let token = self.controller.begin(kind);
        let prior_summary = self.cache.summary_text(tab);
        let sink = &self.sink;
        let outcome = self
            .pipeline
            .answer_chat(
                &question,
                &snapshot,
                prior_summary.as_deref(),
                target,
                true,
                &token,
                &mut |partial| sink.publish_partial(kind, &sanitize_plain(partial)),
            )
            .await;

        self.controller.finish(kind, &token);
        match outcome {
            Ok(answer) => {
                if !self.is_current(tab) || token.is_cancelled() {
                    return;
                }
                let answer = sanitize_plain(&answer);
                let message = ChatMessage::assistant(&answer);
                self.cache
                    .append_chat(tab, &snapshot, settings.summary_type, message.clone());
                self.sink.publish(kind, RenderPayload::Chat(message));
            }
            Err(e) if e.is_cancellation() => {
                self.sink.clear(kind);
            }
            Err(e) => {
                warn!(error = %e, "chat answer failed");
                if self.is_current(tab) {
                    self.sink.status(StatusNote::Inline {
                        kind,
                        message: localized_message(&e, Some(kind), target),
                    });
                }
            }
        }
    }

    /// Make a tab current: commit the outgoing tab's finished work,
    /// stop everything in flight, then restore from cache or extract.
    pub async fn on_tab_activated(&self, tab: TabId) {
        let prev = self.current_tab();
        if prev == Some(tab) {
            return;
        }
        if let Some(prev_tab) = prev {
            let prev_snapshot = self.snapshot.read().clone();
            if let Some(prev_snapshot) = prev_snapshot {
                let live = self.live.lock().clone();
                let summary_type = self.settings.read().summary_type;
                self.cache
                    .capture_in_flight(prev_tab, &prev_snapshot, summary_type, &live);
            }
        }
        self.controller.cancel_all();
        self.live.lock().clear();
        *self.current_tab.write() = Some(tab);
        *self.snapshot.write() = None;
        for kind in ArtifactKind::ALL {
            self.sink.clear(kind);
        }

        if self.cache.restore(tab, self.sink.as_ref()) {
            if let Some(entry) = self.cache.entry(tab) {
                *self.snapshot.write() = Some(entry.snapshot);
            }
            return;
        }
        self.extract_current(tab).await;
    }

    /// Alias for [`Self::on_tab_activated`], matching the UI verb.
    pub async fn switch_tab(&self, tab: TabId) {
        self.on_tab_activated(tab).await;
    }

    /// The tab committed a new top-level navigation: its cached state
    /// is stale and everything in flight is aborted.
    pub async fn on_tab_navigated(&self, tab: TabId) {
        self.cache.invalidate(tab);
        if !self.is_current(tab) {
            return;
        }
        self.controller.cancel_all();
        self.live.lock().clear();
        *self.snapshot.write() = None;
        for kind in ArtifactKind::ALL {
            self.sink.clear(kind);
        }
        self.extract_current(tab).await;
    }

    pub fn on_tab_closed(&self, tab: TabId) {
        self.cache.evict(tab);
        if !self.is_current(tab) {
            return;
        }
        self.controller.cancel_all();
        self.live.lock().clear();
        *self.current_tab.write() = None;
        *self.snapshot.write() = None;
        for kind in ArtifactKind::ALL {
            self.sink.clear(kind);
        }
    }

    async fn extract_current(&self, tab: TabId) {
        match self.extractor.extract(tab).await {
            Ok(snapshot) => {
                if !self.is_current(tab) {
                    return;
                }
                self.sink.page(&snapshot);
                *self.snapshot.write() = Some(snapshot);
                if self.settings.read().auto_summarize {
                    self.summarize(false).await;
                }
            }
            Err(e) => {
                if !self.is_current(tab) {
                    return;
                }
                let pref = self.settings.read().output_language;
                let lang = resolve_output_language(pref, None);
                self.sink.status(StatusNote::Banner(localized_message(
                    &PipelineError::Extract(e),
                    None,
                    lang,
                )));
            }
        }
    }

    /// Change the output language. The save is fire-and-forget;
    /// regeneration in the new language is up to the user.
    pub fn change_output_language(&self, pref: OutputLanguagePref) {
        let settings = {
            let mut settings = self.settings.write();
            settings.output_language = pref;
            settings.clone()
        };
        let store = self.settings_store.clone();
        tokio::spawn(async move {
            if let Err(e) = store.save(&settings).await {
                warn!(error = %e, "settings save failed");
            }
        });
    }

    /// Replace the whole settings blob (panel settings form submit).
    pub fn update_settings(&self, settings: Settings) {
        *self.settings.write() = settings.clone();
        let store = self.settings_store.clone();
        tokio::spawn(async move {
            if let Err(e) = store.save(&settings).await {
                warn!(error = %e, "settings save failed");
            }
        });
    }
}

fn sanitize_items(items: Vec<TaggedItem>) -> Vec<TaggedItem> {
    items
        .into_iter()
        .map(|item| TaggedItem::new(item.importance, sanitize_plain(&item.body)))
        .collect()
}

fn sanitize_pairs(pairs: Vec<QuizPair>) -> Vec<QuizPair> {
    pairs
        .into_iter()
        .map(|pair| QuizPair {
            question: sanitize_plain(&pair.question),
            answer: sanitize_plain(&pair.answer),
        })
        .collect()
}

fn sanitize_turns(turns: Vec<DialogueTurn>) -> Vec<DialogueTurn> {
    turns
        .into_iter()
        .map(|turn| DialogueTurn {
            speaker: sanitize_plain(&turn.speaker),
            line: sanitize_plain(&turn.line),
        })
        .collect()
}

#[cfg(test)]
#[path = "panel_tests.rs"]
mod tests;
