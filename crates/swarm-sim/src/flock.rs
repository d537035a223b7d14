//! The `Flock` struct and its tick loop.

use std::sync::Arc;

use swarm_agent::{ClassificationStats, build_neighbourhoods};
use swarm_behavior::{Agent, AgentSnapshot, BehaviourStrategy};
use swarm_core::{AgentId, FlockConfig, PositionSource, Tick, Vector3, VelocitySink};

use crate::{FlockError, FlockObserver, FlockResult};

/// What happened during one call to [`Flock::step`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The tick that was processed.
    pub tick: Tick,
    /// Agents whose kinematics were refreshed (every live agent).
    pub updated: usize,
    /// Agents whose strategy produced a new desired acceleration.
    pub calculated: usize,
    /// Jump / stop requests applied after calculation.
    pub overrides: usize,
    /// Velocities written to the sink.
    pub committed: usize,
    /// Work counters from the classification phase.
    pub classification: ClassificationStats,
}

/// A host request queued between ticks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Override {
    Jump,
    Stop,
}

// ── Flock ─────────────────────────────────────────────────────────────────────

/// A population of agents driven through the four-phase tick:
///
/// 1. **Update** (parallel with the `parallel` feature): read each agent's
///    position from the [`PositionSource`] and refresh its kinematics.
/// 2. **Classify** (sequential): rebuild every agent's nearby / crowded /
///    collided lists and averages.
/// 3. **Calculate** (planning parallel with the `parallel` feature): ask each
///    agent's strategy for a desired acceleration, then store the results.
///    Queued jump / stop requests are applied here, after the strategies ran.
/// 4. **Commit** (sequential, ascending `AgentId`): write `velocity + desired`
///    to the [`VelocitySink`] for every agent with a pending commit.
///
/// A phase that fails abandons the tick: agents are rolled back, the clock
/// does not advance and the next `step` starts again from phase 1.
///
/// Agents are kept ordered by id, so the peer slice handed to strategies
/// supports [`Agent::find`].
///
/// Create via [`FlockBuilder`][crate::FlockBuilder].
pub struct Flock {
    config: FlockConfig,
    clock:  Tick,
    agents: Vec<Agent>,
    pending_overrides: Vec<(AgentId, Override)>,
}

impl Flock {
    pub(crate) fn from_parts(config: FlockConfig, agents: Vec<Agent>) -> Self {
        Self {
            config,
            clock: Tick::ZERO,
            agents,
            pending_overrides: Vec::new(),
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Process one tick and advance the clock.
    ///
    /// On error every agent's kinematics, cycle flags and the queued
    /// jump / stop requests are put back as they were before the call, so a
    /// retry with the same positions repeats the tick exactly.  Velocities
    /// already written to the sink are not undone.
    pub fn step<S, K, O>(
        &mut self,
        source:   &mut S,
        sink:     &mut K,
        observer: &mut O,
    ) -> FlockResult<TickReport>
    where
        S: PositionSource + ?Sized,
        K: VelocitySink + ?Sized,
        O: FlockObserver + ?Sized,
    {
        let now = self.clock;
        observer.on_tick_start(now);

        // ── Phase 1a: read positions (nothing mutated yet) ────────────────
        let positions = self.collect_positions(source, now)?;

        let snapshots: Vec<AgentSnapshot> = self.agents.iter().map(Agent::snapshot).collect();
        let overrides = self.pending_overrides.clone();

        match self.process_tick(now, &positions, sink, observer) {
            Ok(report) => {
                self.clock = self.clock.next();
                Ok(report)
            }
            Err(err) => {
                for (agent, snapshot) in self.agents.iter_mut().zip(snapshots) {
                    agent.restore(snapshot);
                }
                self.pending_overrides = overrides;
                log::warn!("{now}: tick abandoned: {err}");
                Err(err)
            }
        }
    }

    /// Run exactly `n` ticks.
    ///
    /// Stops at the first failing tick and returns its error.
    pub fn run_ticks<S, K, O>(
        &mut self,
        n:        u64,
        source:   &mut S,
        sink:     &mut K,
        observer: &mut O,
    ) -> FlockResult<()>
    where
        S: PositionSource + ?Sized,
        K: VelocitySink + ?Sized,
        O: FlockObserver + ?Sized,
    {
        for _ in 0..n {
            self.step(source, sink, observer)?;
        }
        Ok(())
    }

    /// Rebuild every agent's lists from scratch with the current positions.
    ///
    /// Useful after [`set_config`](Self::set_config) to inspect the new
    /// classification without waiting for the next tick.
    pub fn reclassify(&mut self) -> ClassificationStats {
        build_neighbourhoods(&mut self.agents, &self.config, true)
    }

    /// Register a new agent.  It takes part from the next tick.
    pub fn add_agent(
        &mut self,
        id:        AgentId,
        behaviour: Arc<dyn BehaviourStrategy>,
    ) -> FlockResult<()> {
        match self.index_of(id) {
            Ok(_) => Err(FlockError::DuplicateAgent(id)),
            Err(slot) => {
                self.agents.insert(slot, Agent::new(id, behaviour));
                log::debug!("{id} joined ({} agents)", self.agents.len());
                Ok(())
            }
        }
    }

    /// Remove an agent, dropping any request queued for it.
    pub fn remove_agent(&mut self, id: AgentId) -> FlockResult<Agent> {
        let index = self.index_of(id).map_err(|_| FlockError::AgentNotFound(id))?;
        self.pending_overrides.retain(|(target, _)| *target != id);
        let agent = self.agents.remove(index);
        log::debug!("{id} left ({} agents)", self.agents.len());
        Ok(agent)
    }

    /// Queue a jump for the next tick.
    ///
    /// Returns `false` (and queues nothing) if the agent is airborne now.
    pub fn jump(&mut self, id: AgentId) -> FlockResult<bool> {
        if self.agent(id)?.state().is_in_freefall() {
            log::warn!("{id}: jump ignored, agent is airborne");
            return Ok(false);
        }
        self.pending_overrides.push((id, Override::Jump));
        Ok(true)
    }

    /// Queue a stop for the next tick.
    pub fn stop(&mut self, id: AgentId) -> FlockResult<()> {
        self.agent(id)?;
        self.pending_overrides.push((id, Override::Stop));
        Ok(())
    }

    /// Swap one agent's strategy.
    pub fn set_behaviour(
        &mut self,
        id:        AgentId,
        behaviour: Arc<dyn BehaviourStrategy>,
    ) -> FlockResult<()> {
        let index = self.index_of(id).map_err(|_| FlockError::AgentNotFound(id))?;
        self.agents[index].set_behaviour(behaviour);
        Ok(())
    }

    /// Replace the configuration after validating it.
    pub fn set_config(&mut self, config: FlockConfig) -> FlockResult<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn agent(&self, id: AgentId) -> FlockResult<&Agent> {
        Agent::find(&self.agents, id).ok_or(FlockError::AgentNotFound(id))
    }

    /// All agents, ordered by id.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    /// The next tick to be processed.
    pub fn tick(&self) -> Tick {
        self.clock
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    // ── Tick phases ───────────────────────────────────────────────────────

    fn process_tick<K, O>(
        &mut self,
        now:       Tick,
        positions: &[Vector3],
        sink:      &mut K,
        observer:  &mut O,
    ) -> FlockResult<TickReport>
    where
        K: VelocitySink + ?Sized,
        O: FlockObserver + ?Sized,
    {
        let mut report = TickReport { tick: now, ..TickReport::default() };

        // ── Phase 1b: kinematic update ────────────────────────────────────
        report.updated = self.update_agents(positions);

        // ── Phase 2: neighbourhood classification ─────────────────────────
        report.classification = build_neighbourhoods(&mut self.agents, &self.config, false);
        log::trace!("{now}: {:?}", report.classification);
        observer.on_classified(now, &report.classification);

        // ── Phase 3: behaviour calculation ────────────────────────────────
        report.calculated = self.calculate_behaviours();
        report.overrides = self.apply_overrides();

        // ── Phase 4: commit ───────────────────────────────────────────────
        for agent in &mut self.agents {
            if agent.commit(sink)? {
                report.committed += 1;
            }
        }

        log::debug!(
            "{now}: updated={} calculated={} overrides={} committed={} pairs={}",
            report.updated,
            report.calculated,
            report.overrides,
            report.committed,
            report.classification.pairs_visited,
        );
        observer.on_tick_end(now, &report);
        Ok(report)
    }

    fn index_of(&self, id: AgentId) -> Result<usize, usize> {
        self.agents.binary_search_by_key(&id, Agent::id)
    }

    /// Read every live agent's position.  The source is `&mut`, so this is
    /// always sequential.
    fn collect_positions<S: PositionSource + ?Sized>(
        &self,
        source: &mut S,
        now:    Tick,
    ) -> FlockResult<Vec<Vector3>> {
        self.agents
            .iter()
            .map(|agent| {
                source
                    .position_of(agent.id(), now)
                    .ok_or(FlockError::MissingPosition { agent: agent.id(), tick: now })
            })
            .collect()
    }

    fn update_agents(&mut self, positions: &[Vector3]) -> usize {
        let threshold = self.config.gravity_threshold;

        #[cfg(not(feature = "parallel"))]
        {
            for (agent, position) in self.agents.iter_mut().zip(positions) {
                agent.update_current_vectors(position, threshold);
            }
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            self.agents
                .par_iter_mut()
                .zip(positions.par_iter())
                .for_each(|(agent, position)| agent.update_current_vectors(position, threshold));
        }

        positions.len()
    }

    /// Plan against an immutable view of the whole flock, then apply.
    ///
    /// Planning reads peers while they are being planned for, so results are
    /// stored only after every strategy has run.
    fn calculate_behaviours(&mut self) -> usize {
        let agents = self.agents.as_slice();

        #[cfg(not(feature = "parallel"))]
        let planned: Vec<Option<Vector3>> = agents
            .iter()
            .map(|agent| agent.plan_behaviour(agents, false))
            .collect();

        #[cfg(feature = "parallel")]
        let planned: Vec<Option<Vector3>> = {
            use rayon::prelude::*;

            agents
                .par_iter()
                .map(|agent| agent.plan_behaviour(agents, false))
                .collect()
        };

        let mut calculated = 0;
        for (agent, desired) in self.agents.iter_mut().zip(planned) {
            if let Some(desired) = desired {
                agent.apply_desired_behaviour(desired);
                calculated += 1;
            }
        }
        calculated
    }

    fn apply_overrides(&mut self) -> usize {
        let impulse = self.config.jump_impulse;
        let mut applied = 0;
        for (id, request) in std::mem::take(&mut self.pending_overrides) {
            let Ok(index) = self.index_of(id) else { continue };
            let agent = &mut self.agents[index];
            match request {
                Override::Jump => {
                    if agent.jump(impulse) {
                        applied += 1;
                    } else {
                        log::warn!("{id}: queued jump dropped, agent left the ground");
                    }
                }
                Override::Stop => {
                    agent.stop();
                    applied += 1;
                }
            }
        }
        applied
    }
}
