//! Error types, one enum per protocol domain.

mod collaborator;
mod gateway;
mod pipeline;

pub use collaborator::{ExtractError, SettingsError};
pub use gateway::GatewayError;
pub use pipeline::PipelineError;
