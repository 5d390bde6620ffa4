//! User-facing failure text, localized to the output language.
//!
//! Internal error detail stays in the logs; what reaches the panel is a
//! short actionable sentence in the user's output language.

use pagelens_protocols::error::{ExtractError, GatewayError, PipelineError};
use pagelens_protocols::types::{ArtifactKind, LanguageCode};

/// Coarse message categories. Several error variants collapse into one
/// user-facing sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MessageKey {
    ModelUnavailable,
    DownloadRequired,
    TranslationFailed,
    ParseFailure,
    NotEnoughText,
    InaccessiblePage,
    GenerationFailed,
}

fn key_for(error: &PipelineError) -> MessageKey {
    match error {
        PipelineError::Gateway(gateway) => match gateway {
            GatewayError::ModelUnavailable(_) => MessageKey::ModelUnavailable,
            GatewayError::ModelDownloadRequired(_) => MessageKey::DownloadRequired,
            GatewayError::TranslationFailed(_) => MessageKey::TranslationFailed,
            GatewayError::InputTooLarge { .. }
            | GatewayError::Cancelled
            | GatewayError::SessionCreation(_)
            | GatewayError::Invocation(_)
            | GatewayError::StreamError(_) => MessageKey::GenerationFailed,
        },
        PipelineError::ParseFailure(_) => MessageKey::ParseFailure,
        PipelineError::NoCapability(_) => MessageKey::ModelUnavailable,
        PipelineError::Extract(ExtractError::NotEnoughText) => MessageKey::NotEnoughText,
        PipelineError::Extract(ExtractError::InaccessiblePage) => MessageKey::InaccessiblePage,
        PipelineError::Extract(ExtractError::ExtractionFailed(_)) => MessageKey::InaccessiblePage,
    }
}

/// English fallback used for any key missing a translation.
fn english(key: MessageKey) -> &'static str {
    match key {
        MessageKey::ModelUnavailable => "The on-device model is not available on this device.",
        MessageKey::DownloadRequired => {
            "The model needs to be downloaded first. Press the button again to start."
        }
        MessageKey::TranslationFailed => "Translation failed, showing the English result.",
        MessageKey::ParseFailure => "The model's answer could not be displayed. Please retry.",
        MessageKey::NotEnoughText => "This page does not have enough text to work with.",
        MessageKey::InaccessiblePage => "This page's content cannot be read.",
        MessageKey::GenerationFailed => "Generation failed. Please try again.",
    }
}

fn localized(key: MessageKey, lang: LanguageCode) -> Option<&'static str> {
    match (lang, key) {
        (LanguageCode::En, _) => Some(english(key)),
        (LanguageCode::Ja, MessageKey::ModelUnavailable) => {
            Some("この端末ではオンデバイスモデルを利用できません。")
        }
        (LanguageCode::Ja, MessageKey::DownloadRequired) => {
            Some("モデルのダウンロードが必要です。もう一度ボタンを押すと開始します。")
        }
        (LanguageCode::Ja, MessageKey::TranslationFailed) => {
            Some("翻訳に失敗したため、英語の結果を表示しています。")
        }
        (LanguageCode::Ja, MessageKey::ParseFailure) => {
            Some("モデルの応答を表示できませんでした。もう一度お試しください。")
        }
        (LanguageCode::Ja, MessageKey::NotEnoughText) => {
            Some("このページには処理できるテキストが足りません。")
        }
        (LanguageCode::Ja, MessageKey::InaccessiblePage) => {
            Some("このページの内容を読み取れません。")
        }
        (LanguageCode::Ja, MessageKey::GenerationFailed) => {
            Some("生成に失敗しました。もう一度お試しください。")
        }
        (LanguageCode::Es, MessageKey::ModelUnavailable) => {
            Some("El modelo en el dispositivo no está disponible.")
        }
        (LanguageCode::Es, MessageKey::DownloadRequired) => {
            Some("Primero hay que descargar el modelo. Pulsa el botón de nuevo para empezar.")
        }
        (LanguageCode::Es, MessageKey::TranslationFailed) => {
            Some("La traducción falló; se muestra el resultado en inglés.")
        }
        (LanguageCode::Es, MessageKey::ParseFailure) => {
            Some("No se pudo mostrar la respuesta del modelo. Inténtalo de nuevo.")
        }
        (LanguageCode::Es, MessageKey::NotEnoughText) => {
            Some("Esta página no tiene suficiente texto para procesar.")
        }
        (LanguageCode::Es, MessageKey::InaccessiblePage) => {
            Some("No se puede leer el contenido de esta página.")
        }
        (LanguageCode::Es, MessageKey::GenerationFailed) => {
            Some("La generación falló. Inténtalo de nuevo.")
        }
    }
}

/// User-visible sentence for a pipeline failure, in the output language
/// with an English fallback. `kind` is unused for now but keeps the
/// signature stable for per-artifact phrasing later.
pub fn localized_message(
    error: &PipelineError,
    _kind: Option<ArtifactKind>,
    lang: LanguageCode,
) -> String {
    let key = key_for(error);
    localized(key, lang)
        .unwrap_or_else(|| english(key))
        .to_string()
}
