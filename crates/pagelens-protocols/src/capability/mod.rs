//! Capability provider protocol.
//!
//! Capabilities are opaque on-device model functions (summarize,
//! free-form generate, translate) exposed by the host environment.

mod options;
mod traits;

pub use options::SessionOptions;
pub use traits::{Availability, CapabilityKind, CapabilityProvider, ChunkStream, ModelSession};
