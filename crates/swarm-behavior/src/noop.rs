//! A behaviour that never steers.

use swarm_core::Vector3;

use crate::{Agent, BehaviourStrategy};

/// A [`BehaviourStrategy`] whose desired acceleration is always zero.
///
/// Agents keep their current velocity.  Useful as a placeholder in tests or
/// for passive agents that only occupy space in other agents' neighbourhoods.
pub struct NoopBehaviour;

impl BehaviourStrategy for NoopBehaviour {
    fn desired_acceleration(&self, _agent: &Agent, _peers: &[Agent]) -> Vector3 {
        Vector3::zero()
    }

    fn name(&self) -> &str {
        "noop"
    }
}
