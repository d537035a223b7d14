//! Boundary traits between the engine and the host scene.
//!
//! The host owns the real particles.  Once per tick it hands the engine a
//! position for every live agent ([`PositionSource`]) and, after behaviour
//! has been calculated, receives a new velocity for every agent whose
//! behaviour changed ([`VelocitySink`]).  Transport is the host's business.

use std::collections::HashMap;

use crate::{AgentId, CoreResult, Tick, Vector3};

/// Supplies the current position of each live agent.
///
/// Called exactly once per agent per tick, before classification.
/// Returning `None` for a live agent aborts the tick.
pub trait PositionSource {
    fn position_of(&mut self, agent: AgentId, tick: Tick) -> Option<Vector3>;
}

/// Accepts committed velocities.
///
/// Called at most once per agent per tick, and only when that agent has a
/// pending commit.  Write order across agents is unspecified.
pub trait VelocitySink {
    fn set_velocity(&mut self, agent: AgentId, velocity: &Vector3) -> CoreResult<()>;
}

/// A static snapshot of positions; handy in tests and for one-shot drivers.
impl PositionSource for HashMap<AgentId, Vector3> {
    fn position_of(&mut self, agent: AgentId, _tick: Tick) -> Option<Vector3> {
        self.get(&agent).cloned()
    }
}

/// Records the latest committed velocity per agent.
impl VelocitySink for HashMap<AgentId, Vector3> {
    fn set_velocity(&mut self, agent: AgentId, velocity: &Vector3) -> CoreResult<()> {
        self.insert(agent, velocity.clone());
        Ok(())
    }
}
