//! The per-agent orchestrator: kinematic state plus the two-phase
//! calculate / commit cycle.
//!
//! # State machine
//!
//! ```text
//!            update_current_vectors
//!   Idle ─────────────────────────────▶ NeedsCalculation
//!    ▲                                        │ calculate_desired_behaviour
//!    │ commit                                 ▼
//!    └──────────────────────────────────  NeedsCommit
//! ```
//!
//! `jump` and `stop` jump straight to `NeedsCommit` from any state.  Calling
//! `calculate_desired_behaviour` again in `NeedsCommit` or `Idle` does nothing
//! unless forced, and `commit` without a pending commit writes nothing.
//!
//! Calculation is split into [`Agent::plan_behaviour`] (read-only, safe to
//! run for many agents in parallel while they borrow each other) and
//! [`Agent::apply_desired_behaviour`] (the mutation).  The flock uses the two
//! halves directly; [`Agent::calculate_desired_behaviour`] combines them for
//! callers that own the agent separately from its peers.

use std::fmt;
use std::sync::Arc;

use swarm_agent::{AgentState, HasAgentState, Kinematics};
use swarm_core::{AgentId, CoreResult, Vector3, VelocitySink};

use crate::BehaviourStrategy;

/// An agent's kinematics and cycle flags, captured by [`Agent::snapshot`].
#[derive(Clone, Debug)]
pub struct AgentSnapshot {
    kinematics:                  Kinematics,
    desired_acceleration:        Vector3,
    needs_behaviour_calculation: bool,
    needs_behaviour_commit:      bool,
}

pub struct Agent {
    state:     AgentState,
    behaviour: Arc<dyn BehaviourStrategy>,

    desired_acceleration: Vector3,

    needs_behaviour_calculation: bool,
    needs_behaviour_commit:      bool,
}

impl Agent {
    /// A new idle agent governed by `behaviour`.
    pub fn new(id: AgentId, behaviour: Arc<dyn BehaviourStrategy>) -> Self {
        let mut state = AgentState::new(id);
        behaviour.on_agent_assigned(&mut state);
        Self {
            state,
            behaviour,
            desired_acceleration:        Vector3::zero(),
            needs_behaviour_calculation: false,
            needs_behaviour_commit:      false,
        }
    }

    /// Resolve `id` in a peer slice ordered by id.
    pub fn find(peers: &[Agent], id: AgentId) -> Option<&Agent> {
        peers
            .binary_search_by_key(&id, Agent::id)
            .ok()
            .map(|i| &peers[i])
    }

    /// Swap the governing strategy.
    ///
    /// The behaviour data slot is cleared, the new strategy's
    /// `on_agent_assigned` hook runs, and a recalculation is scheduled.
    pub fn set_behaviour(&mut self, behaviour: Arc<dyn BehaviourStrategy>) {
        log::debug!(
            "{}: behaviour {} -> {}",
            self.id(),
            self.behaviour.name(),
            behaviour.name()
        );
        self.behaviour = behaviour;
        self.state.behaviour_data_mut().clear();
        self.behaviour.on_agent_assigned(&mut self.state);
        self.needs_behaviour_calculation = true;
    }

    // ── Phase 1 ───────────────────────────────────────────────────────────

    /// Refresh kinematics from the host's latest position.
    pub fn update_current_vectors(&mut self, position: &Vector3, gravity_threshold: f32) {
        self.state.update_current_vectors(position, gravity_threshold);
        self.behaviour.on_agent_updated(&mut self.state);
        self.needs_behaviour_calculation = true;
        self.needs_behaviour_commit = false;
    }

    // ── Phase 3 ───────────────────────────────────────────────────────────

    /// Ask the strategy for a desired acceleration, if one is due.
    ///
    /// Returns `None` when no calculation is pending and `force` is unset.
    pub fn plan_behaviour(&self, peers: &[Agent], force: bool) -> Option<Vector3> {
        if !(self.needs_behaviour_calculation || force) {
            return None;
        }
        Some(self.behaviour.desired_acceleration(self, peers))
    }

    /// Store a planned acceleration and schedule its commit.
    pub fn apply_desired_behaviour(&mut self, desired: Vector3) {
        self.desired_acceleration = desired;
        self.needs_behaviour_calculation = false;
        self.needs_behaviour_commit = true;
    }

    /// [`plan_behaviour`](Self::plan_behaviour) then
    /// [`apply_desired_behaviour`](Self::apply_desired_behaviour).
    /// Returns whether a calculation ran.
    pub fn calculate_desired_behaviour(&mut self, peers: &[Agent], force: bool) -> bool {
        match self.plan_behaviour(peers, force) {
            Some(desired) => {
                self.apply_desired_behaviour(desired);
                true
            }
            None => false,
        }
    }

    // ── Phase 4 ───────────────────────────────────────────────────────────

    /// Write `velocity + desired_acceleration` to `sink` if a commit is
    /// pending.  Returns whether anything was written.
    ///
    /// On a sink error the commit stays pending.
    pub fn commit<S: VelocitySink + ?Sized>(&mut self, sink: &mut S) -> CoreResult<bool> {
        if !self.needs_behaviour_commit {
            return Ok(false);
        }
        let velocity = self.state.velocity() + &self.desired_acceleration;
        sink.set_velocity(self.id(), &velocity)?;
        self.needs_behaviour_commit = false;
        Ok(true)
    }

    // ── Overrides ─────────────────────────────────────────────────────────

    /// Add a vertical impulse and leave the ground.
    ///
    /// Only a grounded agent can jump; otherwise nothing changes and `false`
    /// is returned.
    pub fn jump(&mut self, impulse: f32) -> bool {
        if self.state.is_in_freefall() {
            return false;
        }
        self.desired_acceleration.add(&Vector3::new(0.0, impulse, 0.0));
        self.state.notify_jump();
        self.needs_behaviour_commit = true;
        true
    }

    /// Cancel the current velocity on the next commit.
    pub fn stop(&mut self) {
        self.desired_acceleration = self.state.velocity().inverted();
        self.needs_behaviour_commit = true;
    }

    // ── Rollback ──────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            kinematics:                  self.state.kinematics(),
            desired_acceleration:        self.desired_acceleration.clone(),
            needs_behaviour_calculation: self.needs_behaviour_calculation,
            needs_behaviour_commit:      self.needs_behaviour_commit,
        }
    }

    /// Return to a captured snapshot.  Classification lists are marked for
    /// rebuild; behaviour data is left as the strategy last wrote it.
    pub fn restore(&mut self, snapshot: AgentSnapshot) {
        self.state.restore_kinematics(snapshot.kinematics);
        self.desired_acceleration        = snapshot.desired_acceleration;
        self.needs_behaviour_calculation = snapshot.needs_behaviour_calculation;
        self.needs_behaviour_commit      = snapshot.needs_behaviour_commit;
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> AgentId {
        self.state.id()
    }

    #[inline]
    pub fn state(&self) -> &AgentState {
        &self.state
    }

    #[inline]
    pub fn state_mut(&mut self) -> &mut AgentState {
        &mut self.state
    }

    pub fn behaviour(&self) -> &Arc<dyn BehaviourStrategy> {
        &self.behaviour
    }

    pub fn desired_acceleration(&self) -> &Vector3 {
        &self.desired_acceleration
    }

    pub fn needs_behaviour_calculation(&self) -> bool {
        self.needs_behaviour_calculation
    }

    pub fn needs_behaviour_commit(&self) -> bool {
        self.needs_behaviour_commit
    }
}

impl HasAgentState for Agent {
    #[inline]
    fn agent_state(&self) -> &AgentState {
        &self.state
    }

    #[inline]
    fn agent_state_mut(&mut self) -> &mut AgentState {
        &mut self.state
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("state", &self.state)
            .field("behaviour", &self.behaviour.name())
            .field("desired_acceleration", &self.desired_acceleration)
            .field("needs_calculation", &self.needs_behaviour_calculation)
            .field("needs_commit", &self.needs_behaviour_commit)
            .finish()
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}, desired={}", self.behaviour.name(), self.state, self.desired_acceleration)
    }
}
