//! The `BehaviourStrategy` trait — the main extension point for user code.

use swarm_agent::AgentState;
use swarm_core::Vector3;

use crate::Agent;

/// Pluggable steering behaviour.
///
/// One strategy instance is shared (behind an `Arc`) by every agent assigned
/// to it, so it must not hold per-agent state.  Anything that varies per
/// agent belongs in the agent's [`BehaviourData`][swarm_agent::BehaviourData]
/// slot, which the hooks below receive mutably.
///
/// # Required methods
///
/// Only [`desired_acceleration`][Self::desired_acceleration] is required.
/// The lifecycle hooks default to no-ops.
///
/// # Thread safety
///
/// With the `parallel` feature the flock calls `desired_acceleration` for
/// many agents at once via Rayon, so implementations must be `Send + Sync`.
///
/// # Example
///
/// ```rust
/// use swarm_behavior::{Agent, BehaviourStrategy};
/// use swarm_core::Vector3;
///
/// /// Steer towards the local centre of mass.
/// struct Cohere;
///
/// impl BehaviourStrategy for Cohere {
///     fn desired_acceleration(&self, agent: &Agent, _peers: &[Agent]) -> Vector3 {
///         let state = agent.state();
///         if !state.has_neighbours() {
///             return Vector3::zero();
///         }
///         (state.average_position() - state.position()).normalized(0.1)
///     }
/// }
/// ```
pub trait BehaviourStrategy: Send + Sync + 'static {
    /// The acceleration this agent wants to apply this tick.
    ///
    /// Called at most once per agent per tick, after classification, so the
    /// agent's lists and averages are final.  `peers` is the whole population
    /// ordered by id (including `agent`); resolve list entries with
    /// [`Agent::find`].  Must not depend on the order agents are visited in.
    fn desired_acceleration(&self, agent: &Agent, peers: &[Agent]) -> Vector3;

    /// Called after every kinematic update of an agent using this strategy.
    ///
    /// Default: does nothing.
    fn on_agent_updated(&self, _state: &mut AgentState) {}

    /// Called once when an agent is assigned this strategy, after its
    /// behaviour data slot has been cleared.
    ///
    /// Default: does nothing.
    fn on_agent_assigned(&self, _state: &mut AgentState) {}

    /// Short identifier used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
