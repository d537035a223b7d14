//! Unit tests for swarm-behavior.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use swarm_agent::AgentState;
use swarm_core::{AgentId, CoreError, CoreResult, Vector3, VelocitySink};

use crate::{Agent, BehaviourStrategy, NoopBehaviour};

// ── Helpers ───────────────────────────────────────────────────────────────────

const GRAVITY_THRESHOLD: f32 = -0.5;

/// Always asks for the same acceleration and counts its callbacks.
#[derive(Default)]
struct Counting {
    desired:  [f32; 3],
    planned:  AtomicUsize,
    updated:  AtomicUsize,
    assigned: AtomicUsize,
}

impl Counting {
    fn steering(desired: [f32; 3]) -> Arc<Self> {
        Arc::new(Self { desired, ..Self::default() })
    }
}

impl BehaviourStrategy for Counting {
    fn desired_acceleration(&self, _agent: &Agent, _peers: &[Agent]) -> Vector3 {
        self.planned.fetch_add(1, Ordering::Relaxed);
        self.desired.into()
    }

    fn on_agent_updated(&self, _state: &mut AgentState) {
        self.updated.fetch_add(1, Ordering::Relaxed);
    }

    fn on_agent_assigned(&self, _state: &mut AgentState) {
        self.assigned.fetch_add(1, Ordering::Relaxed);
    }

    fn name(&self) -> &str {
        "counting"
    }
}

struct Stamp(u32);

/// Leaves a marker in the agent's data slot on assignment.
struct Stamping;

impl BehaviourStrategy for Stamping {
    fn desired_acceleration(&self, agent: &Agent, _peers: &[Agent]) -> Vector3 {
        let n = agent.state().behaviour_data().get::<Stamp>().map_or(0, |s| s.0);
        Vector3::new(n as f32, 0.0, 0.0)
    }

    fn on_agent_assigned(&self, state: &mut AgentState) {
        state.behaviour_data_mut().set(Stamp(7));
    }
}

struct FailingSink;

impl VelocitySink for FailingSink {
    fn set_velocity(&mut self, agent: AgentId, _velocity: &Vector3) -> CoreResult<()> {
        Err(CoreError::Sink { agent, reason: "offline".into() })
    }
}

/// An agent at `x` on its second update, moving +1 along x.
fn moving_agent(behaviour: Arc<dyn BehaviourStrategy>, x: f32) -> Agent {
    let mut agent = Agent::new(AgentId(1), behaviour);
    agent.update_current_vectors(&Vector3::new(x - 1.0, 0.0, 0.0), GRAVITY_THRESHOLD);
    agent.update_current_vectors(&Vector3::new(x, 0.0, 0.0), GRAVITY_THRESHOLD);
    agent
}

// ── Two-phase cycle ───────────────────────────────────────────────────────────

#[cfg(test)]
mod cycle {
    use super::*;

    #[test]
    fn new_agent_is_idle() {
        let strategy = Counting::steering([0.0; 3]);
        let agent = Agent::new(AgentId(4), strategy.clone());
        assert_eq!(agent.id(), AgentId(4));
        assert!(!agent.needs_behaviour_calculation());
        assert!(!agent.needs_behaviour_commit());
        assert_eq!(strategy.assigned.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn update_requests_calculation() {
        let strategy = Counting::steering([0.0; 3]);
        let mut agent = Agent::new(AgentId(1), strategy.clone());
        agent.update_current_vectors(&Vector3::new(1.0, 0.0, 0.0), GRAVITY_THRESHOLD);
        assert!(agent.needs_behaviour_calculation());
        assert!(!agent.needs_behaviour_commit());
        assert!(agent.state().needs_lists_rebuild());
        assert_eq!(strategy.updated.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn calculate_then_commit() {
        let strategy = Counting::steering([0.0, 0.0, 0.5]);
        let mut agent = moving_agent(strategy.clone(), 3.0);

        assert!(agent.calculate_desired_behaviour(&[], false));
        assert!(!agent.needs_behaviour_calculation());
        assert!(agent.needs_behaviour_commit());
        assert_eq!(*agent.desired_acceleration(), Vector3::new(0.0, 0.0, 0.5));

        let mut sink: HashMap<AgentId, Vector3> = HashMap::new();
        assert!(agent.commit(&mut sink).unwrap());
        assert_eq!(sink[&AgentId(1)], Vector3::new(1.0, 0.0, 0.5));
        assert!(!agent.needs_behaviour_commit());
    }

    #[test]
    fn calculation_is_idempotent() {
        let strategy = Counting::steering([1.0, 0.0, 0.0]);
        let mut agent = moving_agent(strategy.clone(), 0.0);
        assert!(agent.calculate_desired_behaviour(&[], false));
        assert!(!agent.calculate_desired_behaviour(&[], false));
        assert!(agent.plan_behaviour(&[], false).is_none());
        assert_eq!(strategy.planned.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn forced_calculation_reruns() {
        let strategy = Counting::steering([1.0, 0.0, 0.0]);
        let mut agent = moving_agent(strategy.clone(), 0.0);
        agent.calculate_desired_behaviour(&[], false);
        assert!(agent.calculate_desired_behaviour(&[], true));
        assert_eq!(strategy.planned.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn commit_without_pending_writes_nothing() {
        let mut agent = moving_agent(Arc::new(NoopBehaviour), 0.0);
        let mut sink: HashMap<AgentId, Vector3> = HashMap::new();
        assert!(!agent.commit(&mut sink).unwrap());
        assert!(sink.is_empty());

        agent.calculate_desired_behaviour(&[], false);
        assert!(agent.commit(&mut sink).unwrap());
        assert!(!agent.commit(&mut sink).unwrap());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn update_cancels_pending_commit() {
        let mut agent = moving_agent(Arc::new(NoopBehaviour), 0.0);
        agent.calculate_desired_behaviour(&[], false);
        agent.update_current_vectors(&Vector3::new(1.0, 0.0, 0.0), GRAVITY_THRESHOLD);
        assert!(!agent.needs_behaviour_commit());
        assert!(agent.needs_behaviour_calculation());
    }

    #[test]
    fn failed_commit_stays_pending() {
        let mut agent = moving_agent(Arc::new(NoopBehaviour), 0.0);
        agent.calculate_desired_behaviour(&[], false);
        let err = agent.commit(&mut FailingSink).unwrap_err();
        assert!(matches!(err, CoreError::Sink { agent: AgentId(1), .. }));
        assert!(agent.needs_behaviour_commit());
    }

    #[test]
    fn restore_undoes_update_and_jump() {
        let mut agent = moving_agent(Arc::new(NoopBehaviour), 2.0);
        let snapshot = agent.snapshot();

        agent.update_current_vectors(&Vector3::new(2.0, 0.0, 0.0), GRAVITY_THRESHOLD);
        agent.calculate_desired_behaviour(&[], false);
        assert!(agent.jump(2.0));
        assert!(agent.state().velocity().is_null());

        agent.restore(snapshot);
        assert_eq!(*agent.state().position(), Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(*agent.state().velocity(), Vector3::new(1.0, 0.0, 0.0));
        assert!(agent.state().is_touching_ground());
        assert!(agent.state().needs_lists_rebuild());
        assert!(agent.needs_behaviour_calculation());
        assert!(!agent.needs_behaviour_commit());
        assert!(agent.desired_acceleration().is_null());

        // Replaying the same position gives the same velocity again.
        agent.update_current_vectors(&Vector3::new(3.0, 0.0, 0.0), GRAVITY_THRESHOLD);
        assert_eq!(*agent.state().velocity(), Vector3::new(1.0, 0.0, 0.0));
        assert!(agent.state().acceleration().is_null());
    }

    #[test]
    fn commit_through_trait_object() {
        let mut agent = moving_agent(Arc::new(NoopBehaviour), 0.0);
        agent.calculate_desired_behaviour(&[], false);
        let mut map: HashMap<AgentId, Vector3> = HashMap::new();
        let sink: &mut dyn VelocitySink = &mut map;
        assert!(agent.commit(sink).unwrap());
    }
}

// ── Jump / stop ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod overrides {
    use super::*;

    #[test]
    fn grounded_agent_jumps() {
        let mut agent = moving_agent(Arc::new(NoopBehaviour), 0.0);
        assert!(agent.state().is_touching_ground());
        assert!(agent.jump(2.0));
        assert!(agent.state().is_in_freefall());
        assert!(agent.needs_behaviour_commit());
        assert_eq!(*agent.desired_acceleration(), Vector3::new(0.0, 2.0, 0.0));

        let mut sink: HashMap<AgentId, Vector3> = HashMap::new();
        agent.commit(&mut sink).unwrap();
        assert_eq!(sink[&AgentId(1)], Vector3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn jump_adds_to_planned_acceleration() {
        let mut agent = moving_agent(Counting::steering([0.5, 0.0, 0.0]), 0.0);
        agent.calculate_desired_behaviour(&[], false);
        assert!(agent.jump(2.0));
        assert_eq!(*agent.desired_acceleration(), Vector3::new(0.5, 2.0, 0.0));
    }

    #[test]
    fn airborne_agent_cannot_jump() {
        let mut agent = moving_agent(Arc::new(NoopBehaviour), 0.0);
        assert!(agent.jump(2.0));
        let mut sink: HashMap<AgentId, Vector3> = HashMap::new();
        agent.commit(&mut sink).unwrap();

        assert!(!agent.jump(2.0));
        assert!(!agent.needs_behaviour_commit());
        assert_eq!(*agent.desired_acceleration(), Vector3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn stop_cancels_velocity() {
        let mut agent = moving_agent(Arc::new(NoopBehaviour), 0.0);
        agent.stop();
        assert!(agent.needs_behaviour_commit());
        assert_eq!(*agent.desired_acceleration(), Vector3::new(-1.0, 0.0, 0.0));

        let mut sink: HashMap<AgentId, Vector3> = HashMap::new();
        agent.commit(&mut sink).unwrap();
        assert!(sink[&AgentId(1)].is_null());
    }
}

// ── Strategies ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod strategies {
    use super::*;

    #[test]
    fn noop_is_zero() {
        let mut agent = moving_agent(Arc::new(NoopBehaviour), 0.0);
        agent.calculate_desired_behaviour(&[], false);
        assert!(agent.desired_acceleration().is_null());
        assert_eq!(agent.behaviour().name(), "noop");
    }

    #[test]
    fn assignment_hook_fills_data_slot() {
        let mut agent = moving_agent(Arc::new(Stamping), 0.0);
        agent.calculate_desired_behaviour(&[], false);
        assert_eq!(*agent.desired_acceleration(), Vector3::new(7.0, 0.0, 0.0));
    }

    #[test]
    fn set_behaviour_clears_data_and_forces_recalculation() {
        let mut agent = moving_agent(Arc::new(Stamping), 0.0);
        agent.calculate_desired_behaviour(&[], false);

        let counting = Counting::steering([0.0; 3]);
        agent.set_behaviour(counting.clone());
        assert!(agent.state().behaviour_data().is_empty());
        assert!(agent.needs_behaviour_calculation());
        assert_eq!(counting.assigned.load(Ordering::Relaxed), 1);
        assert_eq!(agent.behaviour().name(), "counting");
    }

    #[test]
    fn default_name_is_type_name() {
        assert!(Stamping.name().ends_with("Stamping"));
    }

    #[test]
    fn find_resolves_peers_by_id() {
        let peers: Vec<Agent> = [2, 5, 9]
            .into_iter()
            .map(|i| Agent::new(AgentId(i), Arc::new(NoopBehaviour)))
            .collect();
        assert_eq!(Agent::find(&peers, AgentId(5)).map(Agent::id), Some(AgentId(5)));
        assert!(Agent::find(&peers, AgentId(3)).is_none());
    }
}
