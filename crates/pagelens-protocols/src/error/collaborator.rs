//! Errors from external collaborators (extractor, settings store).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("not enough text on the page")]
    NotEnoughText,

    #[error("page is inaccessible")]
    InaccessiblePage,

    #[error("extraction failed: {0}")]
    ExtractionFailed(String),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings store failed: {0}")]
    Store(String),
}
