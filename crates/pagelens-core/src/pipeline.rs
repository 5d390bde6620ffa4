//! Per-artifact generation orchestration.
//!
//! The pipeline decides which capability to invoke and in which
//! language, applies the English-first-then-translate strategy, repairs
//! and parses structured output, and streams partial results. Model
//! working language is English; direct non-English generation is a
//! best-effort fallback used only when no translator exists.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, warn};

use pagelens_protocols::cancel::CancelToken;
use pagelens_protocols::capability::{Availability, CapabilityKind, SessionOptions};
use pagelens_protocols::error::{GatewayError, PipelineError};
use pagelens_protocols::types::{
    ArtifactKind, DialogueTurn, LanguageCode, PageSnapshot, QuizPair, SummaryLength, TaggedItem,
};

use crate::gateway::ModelGateway;
use crate::language::{looks_like_english, repair_importance_tags};
use crate::parse::{parse_dialogue, parse_quiz, parse_tagged_items, render_tagged_items};
use crate::prompts;
use crate::streaming::StreamAccumulator;

/// Page excerpt cap used as chat context when no summary is cached.
const CHAT_CONTEXT_CAP: usize = 1500;

/// Callback receiving the monotonically growing partial text of a
/// streamed generation.
pub type PartialFn<'a> = &'a mut (dyn FnMut(&str) + Send);

/// Orchestrates one artifact generation at a time per call; slot
/// exclusivity is the [`crate::SlotController`]'s job.
pub struct GenerationPipeline {
    gateway: Arc<ModelGateway>,
}

impl GenerationPipeline {
    pub fn new(gateway: Arc<ModelGateway>) -> Self {
        Self { gateway }
    }

    fn ensure_not_cancelled(token: &CancelToken) -> Result<(), GatewayError> {
        if token.is_cancelled() {
            return Err(GatewayError::Cancelled);
        }
        Ok(())
    }

    async fn translator_usable(&self, target: LanguageCode, user_gesture: bool) -> bool {
        match self
            .gateway
            .check_availability(CapabilityKind::Translator, Some(target))
            .await
        {
            Availability::Available => true,
            // A downloadable translator is only usable inside a user
            // gesture; background flows skip translation instead.
            Availability::Downloadable => user_gesture,
            Availability::Unavailable => false,
        }
    }

    async fn generator_usable(&self, user_gesture: bool) -> bool {
        match self
            .gateway
            .check_availability(CapabilityKind::Generator, None)
            .await
        {
            Availability::Available => true,
            Availability::Downloadable => user_gesture,
            Availability::Unavailable => false,
        }
    }

    /// Streamed TL;DR generation. Partial text is delivered in arrival
    /// order via `on_partial`; the final text is translated to the
    /// target language when needed and possible.
    pub async fn generate_tldr(
        &self,
        snapshot: &PageSnapshot,
        length: SummaryLength,
        target: LanguageCode,
        user_gesture: bool,
        token: &Arc<CancelToken>,
        on_partial: PartialFn<'_>,
    ) -> Result<String, PipelineError> {
        let options = SessionOptions::new()
            .with_length(length)
            .with_user_gesture(user_gesture)
            .with_token(token.clone());
        let mut session = self
            .gateway
            .create_session(CapabilityKind::Summarizer, options)
            .await?;

        let stream = match session.invoke_stream(&snapshot.text).await {
            Ok(stream) => stream,
            Err(GatewayError::InputTooLarge { chars }) => {
                session.destroy().await;
                debug!(chars, "streamed summary rejected input, retrying one-shot truncated");
                let text = self
                    .summarize_once(&snapshot.text, length, user_gesture, token)
                    .await?;
                return self.finish_text(text, target, user_gesture, token).await;
            }
            Err(e) => {
                session.destroy().await;
                return Err(e.into());
            }
        };

        let mut stream = stream;
        let mut acc = StreamAccumulator::new();
        loop {
            if token.is_cancelled() {
                session.destroy().await;
                return Err(GatewayError::Cancelled.into());
            }
            match stream.next().await {
                Some(Ok(chunk)) => {
                    // Cancellation propagates before any further chunk
                    // is applied to visible state.
                    if token.is_cancelled() {
                        session.destroy().await;
                        return Err(GatewayError::Cancelled.into());
                    }
                    on_partial(acc.push(&chunk));
                }
                Some(Err(e)) => {
                    session.destroy().await;
                    return Err(e.into());
                }
                None => break,
            }
        }
        drop(stream);
        session.destroy().await;
        Self::ensure_not_cancelled(token)?;

        self.finish_text(acc.into_text(), target, user_gesture, token)
            .await
    }

    /// Translate final text when the target is non-English and the text
    /// still reads as English; degrade to the untranslated text on any
    /// translation failure.
    async fn finish_text(
        &self,
        text: String,
        target: LanguageCode,
        user_gesture: bool,
        token: &Arc<CancelToken>,
    ) -> Result<String, PipelineError> {
        let text = if target != LanguageCode::En && looks_like_english(&text) {
            self.try_translate_text(&text, target, user_gesture, token)
                .await
                .unwrap_or(text)
        } else {
            text
        };
        Self::ensure_not_cancelled(token)?;
        Ok(text)
    }

    /// One-shot summarization with progressive input truncation.
    ///
    /// Retries full -> half -> quarter, only when the provider reports
    /// the input as too large; any other error aborts immediately. Each
    /// attempt uses a fresh session (sessions are not reusable) and
    /// every session is destroyed.
    pub async fn summarize_once(
        &self,
        text: &str,
        length: SummaryLength,
        user_gesture: bool,
        token: &Arc<CancelToken>,
    ) -> Result<String, GatewayError> {
        let total = text.chars().count();
        let mut result = Err(GatewayError::Invocation("summarization not attempted".to_string()));

        for divisor in [1usize, 2, 4] {
            Self::ensure_not_cancelled(token)?;
            let input = truncate_chars(text, total.div_ceil(divisor));
            let options = SessionOptions::new()
                .with_length(length)
                .with_user_gesture(user_gesture)
                .with_token(token.clone());
            let mut session = self
                .gateway
                .create_session(CapabilityKind::Summarizer, options)
                .await?;
            result = session.invoke(input).await;
            session.destroy().await;

            match &result {
                Err(GatewayError::InputTooLarge { chars }) => {
                    warn!(chars, divisor, "summarizer input too large, truncating further");
                }
                _ => break,
            }
        }
        result
    }

    /// Key points with importance tags.
    ///
    /// English-first when a translator can finish the job; direct
    /// target-language generation when it cannot; silent fallback to
    /// plain summarization when the generator path fails.
    pub async fn generate_key_points(
        &self,
        snapshot: &PageSnapshot,
        length: SummaryLength,
        target: LanguageCode,
        user_gesture: bool,
        token: &Arc<CancelToken>,
    ) -> Result<(String, Vec<TaggedItem>), PipelineError> {
        if self.generator_usable(user_gesture).await {
            let translator = target != LanguageCode::En
                && self.translator_usable(target, user_gesture).await;
            // English-first whenever translation is available: the
            // generator's non-English output degrades on longer inputs.
            let generation_language = if target == LanguageCode::En || translator {
                LanguageCode::En
            } else {
                target
            };
            let prompt = prompts::key_points(&snapshot.text, generation_language);

            match self
                .invoke_generator_once(&prompt, generation_language, user_gesture, token)
                .await
            {
                Ok(text) => {
                    let repaired = repair_importance_tags(&text);
                    let mut items = parse_tagged_items(&repaired);
                    if !items.is_empty() {
                        if target != LanguageCode::En
                            && translator
                            && looks_like_english(&repaired)
                        {
                            items = self
                                .translate_items(items, target, user_gesture, token)
                                .await;
                        }
                        Self::ensure_not_cancelled(token)?;
                        return Ok((render_tagged_items(&items), items));
                    }
                    warn!("generator emitted no parseable key points, falling back to summarizer");
                }
                Err(e) if e.is_cancellation() => return Err(e.into()),
                Err(e) => {
                    // Degrades silently: the summarizer fallback below
                    // must not surface this as a user-facing error.
                    warn!(error = %e, "generator failed for key points, falling back to summarizer");
                }
            }
        }

        let text = self
            .summarize_once(&snapshot.text, length, user_gesture, token)
            .await?;
        Self::ensure_not_cancelled(token)?;
        let text = self.finish_text(text, target, user_gesture, token).await?;
        let items = parse_tagged_items(&text);
        if items.is_empty() {
            return Err(PipelineError::ParseFailure(ArtifactKind::KeyPoints));
        }
        Ok((text, items))
    }

    /// Exactly 3 question/answer pairs.
    pub async fn generate_quiz(
        &self,
        snapshot: &PageSnapshot,
        target: LanguageCode,
        user_gesture: bool,
        token: &Arc<CancelToken>,
    ) -> Result<(String, Vec<QuizPair>), PipelineError> {
        let prompt = prompts::quiz(&snapshot.text, target);
        let text = self
            .invoke_generator_once(&prompt, target, user_gesture, token)
            .await?;
        let pairs = parse_quiz(&text);
        if pairs.is_empty() {
            return Err(PipelineError::ParseFailure(ArtifactKind::Quiz));
        }
        Ok((text, pairs))
    }

    /// Two-speaker scripted exchange. Unparsed lines are dropped; zero
    /// parsed lines is a parse failure, not a crash.
    pub async fn generate_dialogue(
        &self,
        snapshot: &PageSnapshot,
        target: LanguageCode,
        user_gesture: bool,
        token: &Arc<CancelToken>,
    ) -> Result<(String, Vec<DialogueTurn>), PipelineError> {
        let prompt = prompts::dialogue(&snapshot.text, target);
        let text = self
            .invoke_generator_once(&prompt, target, user_gesture, token)
            .await?;
        let turns = parse_dialogue(&text);
        if turns.is_empty() {
            return Err(PipelineError::ParseFailure(ArtifactKind::Dialogue));
        }
        Ok((text, turns))
    }

    /// Answer a free-form question over bounded context, streamed.
    /// Same English-first strategy as key points.
    pub async fn answer_chat(
        &self,
        question: &str,
        snapshot: &PageSnapshot,
        prior_summary: Option<&str>,
        target: LanguageCode,
        user_gesture: bool,
        token: &Arc<CancelToken>,
        on_partial: PartialFn<'_>,
    ) -> Result<String, PipelineError> {
        let context = match prior_summary {
            Some(summary) => summary,
            None => snapshot.excerpt(CHAT_CONTEXT_CAP),
        };
        let translator =
            target != LanguageCode::En && self.translator_usable(target, user_gesture).await;
        let generation_language = if target == LanguageCode::En || translator {
            LanguageCode::En
        } else {
            target
        };
        let prompt = prompts::chat(context, question, generation_language);

        let options = SessionOptions::new()
            .with_target_language(generation_language)
            .with_user_gesture(user_gesture)
            .with_token(token.clone());
        let mut session = self
            .gateway
            .create_session(CapabilityKind::Generator, options)
            .await?;
        let stream = match session.invoke_stream(&prompt).await {
            Ok(stream) => stream,
            Err(e) => {
                session.destroy().await;
                return Err(e.into());
            }
        };

        let mut stream = stream;
        let mut acc = StreamAccumulator::new();
        while let Some(chunk) = stream.next().await {
            if token.is_cancelled() {
                session.destroy().await;
                return Err(GatewayError::Cancelled.into());
            }
            match chunk {
                Ok(chunk) => on_partial(acc.push(&chunk)),
                Err(e) => {
                    session.destroy().await;
                    return Err(e.into());
                }
            }
        }
        drop(stream);
        session.destroy().await;
        Self::ensure_not_cancelled(token)?;

        self.finish_text(acc.into_text(), target, user_gesture, token)
            .await
    }

    /// One-shot generator invocation with the session destroyed on
    /// every exit path.
    async fn invoke_generator_once(
        &self,
        input: &str,
        target: LanguageCode,
        user_gesture: bool,
        token: &Arc<CancelToken>,
    ) -> Result<String, GatewayError> {
        let options = SessionOptions::new()
            .with_target_language(target)
            .with_user_gesture(user_gesture)
            .with_token(token.clone());
        let mut session = self
            .gateway
            .create_session(CapabilityKind::Generator, options)
            .await?;
        let result = session.invoke(input).await;
        session.destroy().await;
        let text = result?;
        Self::ensure_not_cancelled(token)?;
        Ok(text)
    }

    /// Best-effort whole-text translation. Any failure degrades to
    /// `None` (the caller keeps the untranslated text); cancellation is
    /// caught by the caller's own token check.
    async fn try_translate_text(
        &self,
        text: &str,
        target: LanguageCode,
        user_gesture: bool,
        token: &Arc<CancelToken>,
    ) -> Option<String> {
        let options = SessionOptions::new()
            .with_source_language(LanguageCode::En)
            .with_target_language(target)
            .with_user_gesture(user_gesture)
            .with_token(token.clone());
        let mut session = match self
            .gateway
            .create_session(CapabilityKind::Translator, options)
            .await
        {
            Ok(session) => session,
            Err(e) => {
                debug!(error = %e, "translation skipped");
                return None;
            }
        };
        let result = session.invoke(text).await;
        session.destroy().await;
        match result {
            Ok(translated) => Some(translated),
            Err(e) => {
                warn!(error = %e, "translation failed, keeping untranslated text");
                None
            }
        }
    }

    /// Item-by-item translation of tagged content.
    ///
    /// Bulk translation merges lines and mistranslates the tags
    /// themselves, so each body is translated alone and reassembled
    /// with its original tag. Order is always preserved; a failed item
    /// keeps its untranslated body.
    pub async fn translate_items(
        &self,
        items: Vec<TaggedItem>,
        target: LanguageCode,
        user_gesture: bool,
        token: &Arc<CancelToken>,
    ) -> Vec<TaggedItem> {
        let options = SessionOptions::new()
            .with_source_language(LanguageCode::En)
            .with_target_language(target)
            .with_user_gesture(user_gesture)
            .with_token(token.clone());
        let mut session = match self
            .gateway
            .create_session(CapabilityKind::Translator, options)
            .await
        {
            Ok(session) => session,
            Err(e) => {
                debug!(error = %e, "item translation skipped");
                return items;
            }
        };

        let mut out = Vec::with_capacity(items.len());
        let mut iter = items.into_iter();
        for item in iter.by_ref() {
            if token.is_cancelled() {
                out.push(item);
                break;
            }
            match session.invoke(&item.body).await {
                Ok(translated) => out.push(TaggedItem::new(item.importance, translated)),
                Err(e) => {
                    warn!(error = %e, "item translation failed, keeping original body");
                    out.push(item);
                    if e.is_cancellation() {
                        break;
                    }
                }
            }
        }
        out.extend(iter);
        session.destroy().await;
        out
    }
}

/// Leading `max_chars` characters, cut on a character boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
