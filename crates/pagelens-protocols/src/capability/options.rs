//! Session creation options.

use std::sync::Arc;

use crate::cancel::CancelToken;
use crate::types::{LanguageCode, SummaryLength};

/// Download/creation progress callback (fraction in `0.0..=1.0`).
pub type ProgressFn = Arc<dyn Fn(f32) + Send + Sync>;

/// Options for creating a capability session.
#[derive(Clone, Default)]
pub struct SessionOptions {
    /// Source language, for translators.
    pub source_language: Option<LanguageCode>,

    /// Target output language.
    pub target_language: Option<LanguageCode>,

    /// Requested summary length, for summarizers.
    pub length: Option<SummaryLength>,

    /// Shared context prepended to every invocation of the session.
    pub shared_context: Option<String>,

    /// Whether creation happens inside a user-gesture call stack.
    /// First-time model downloads are only allowed when true.
    pub user_gesture: bool,

    /// Progress reporting for model downloads.
    pub progress: Option<ProgressFn>,

    /// Cancellation token observed by the session.
    pub token: Option<Arc<CancelToken>>,
}

impl SessionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_language(mut self, lang: LanguageCode) -> Self {
        self.source_language = Some(lang);
        self
    }

    pub fn with_target_language(mut self, lang: LanguageCode) -> Self {
        self.target_language = Some(lang);
        self
    }

    pub fn with_length(mut self, length: SummaryLength) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_shared_context(mut self, context: impl Into<String>) -> Self {
        self.shared_context = Some(context.into());
        self
    }

    pub fn with_user_gesture(mut self, user_gesture: bool) -> Self {
        self.user_gesture = user_gesture;
        self
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_token(mut self, token: Arc<CancelToken>) -> Self {
        self.token = Some(token);
        self
    }
}

impl std::fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionOptions")
            .field("source_language", &self.source_language)
            .field("target_language", &self.target_language)
            .field("length", &self.length)
            .field("shared_context", &self.shared_context)
            .field("user_gesture", &self.user_gesture)
            .field("progress", &self.progress.is_some())
            .field("token", &self.token.is_some())
            .finish()
    }
}
