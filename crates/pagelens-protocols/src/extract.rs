//! Page-text extraction collaborator.

use async_trait::async_trait;

use crate::error::ExtractError;
use crate::types::{PageSnapshot, TabId};

/// External text-extraction service (DOM scraping + trimming).
///
/// The core calls this lazily on first need and eagerly on tab
/// activation, never more than once concurrently per tab.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract the page text of the given tab.
    async fn extract(&self, tab: TabId) -> Result<PageSnapshot, ExtractError>;
}
