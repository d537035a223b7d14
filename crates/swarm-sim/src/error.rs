use swarm_core::{AgentId, CoreError, Tick};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlockError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("agent {0} registered twice")]
    DuplicateAgent(AgentId),

    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("no position reported for agent {agent} at {tick}")]
    MissingPosition {
        agent: AgentId,
        tick:  Tick,
    },
}

pub type FlockResult<T> = Result<T, FlockError>;
