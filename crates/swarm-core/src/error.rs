//! Engine error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

use crate::AgentId;

/// The top-level error type for `swarm-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("region sizes out of order: collision {collision} <= crowded {crowded} <= neighbourhood {neighbourhood} must hold")]
    RadiusOrdering {
        collision:     f32,
        crowded:       f32,
        neighbourhood: f32,
    },

    #[error("velocity sink rejected agent {agent}: {reason}")]
    Sink {
        agent:  AgentId,
        reason: String,
    },
}

/// Shorthand result type for all `swarm-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;
