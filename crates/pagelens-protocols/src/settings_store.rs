//! Settings persistence collaborator.

use async_trait::async_trait;

use crate::error::SettingsError;
use crate::types::Settings;

/// External settings store. The core treats saves as fire-and-forget
/// with best-effort failure logging.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load the persisted settings blob.
    async fn load(&self) -> Result<Settings, SettingsError>;

    /// Persist the settings blob.
    async fn save(&self, settings: &Settings) -> Result<(), SettingsError>;
}
