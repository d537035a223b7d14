//! Fluent builder for constructing a [`Flock`].

use std::sync::Arc;

use swarm_behavior::{Agent, BehaviourStrategy};
use swarm_core::{AgentId, FlockConfig};

use crate::{Flock, FlockError, FlockResult};

/// Fluent builder for [`Flock`].
///
/// The configuration is validated and agent ids are checked for duplicates
/// in [`build`](Self::build), before any tick can run.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use swarm_behavior::NoopBehaviour;
/// use swarm_core::{AgentId, FlockConfig};
/// use swarm_sim::FlockBuilder;
///
/// let config = FlockConfig {
///     neighbourhood_size:    10.0,
///     crowded_region_size:   3.0,
///     collision_region_size: 1.0,
///     blind_region_angle:    60.0,
///     gravity_threshold:     -0.5,
///     jump_impulse:          2.0,
/// };
/// let flock = FlockBuilder::new(config)
///     .agents((0..4).map(AgentId), Arc::new(NoopBehaviour))
///     .build()?;
/// assert_eq!(flock.len(), 4);
/// # Ok::<(), swarm_sim::FlockError>(())
/// ```
pub struct FlockBuilder {
    config: FlockConfig,
    agents: Vec<(AgentId, Arc<dyn BehaviourStrategy>)>,
}

impl FlockBuilder {
    pub fn new(config: FlockConfig) -> Self {
        Self { config, agents: Vec::new() }
    }

    /// Add one agent governed by `behaviour`.
    pub fn agent(mut self, id: AgentId, behaviour: Arc<dyn BehaviourStrategy>) -> Self {
        self.agents.push((id, behaviour));
        self
    }

    /// Add many agents sharing one strategy.
    pub fn agents<I>(mut self, ids: I, behaviour: Arc<dyn BehaviourStrategy>) -> Self
    where
        I: IntoIterator<Item = AgentId>,
    {
        self.agents
            .extend(ids.into_iter().map(|id| (id, Arc::clone(&behaviour))));
        self
    }

    /// Validate inputs and return a ready-to-step [`Flock`].
    pub fn build(self) -> FlockResult<Flock> {
        self.config.validate()?;

        let mut agents: Vec<Agent> = self
            .agents
            .into_iter()
            .map(|(id, behaviour)| Agent::new(id, behaviour))
            .collect();
        agents.sort_by_key(Agent::id);

        if let Some(pair) = agents.windows(2).find(|w| w[0].id() == w[1].id()) {
            return Err(FlockError::DuplicateAgent(pair[0].id()));
        }

        log::debug!("flock built with {} agents", agents.len());
        Ok(Flock::from_parts(self.config, agents))
    }
}
