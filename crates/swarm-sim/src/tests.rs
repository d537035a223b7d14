//! Integration tests for swarm-sim.

use std::collections::HashMap;
use std::sync::Arc;

use swarm_agent::ClassificationStats;
use swarm_behavior::{Agent, BehaviourStrategy, NoopBehaviour};
use swarm_core::{AgentId, CoreError, CoreResult, FlockConfig, Tick, Vector3, VelocitySink};

use crate::{Flock, FlockBuilder, FlockError, FlockObserver, NoopObserver, TickReport};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config() -> FlockConfig {
    FlockConfig {
        neighbourhood_size:    10.0,
        crowded_region_size:   3.0,
        collision_region_size: 1.0,
        blind_region_angle:    60.0,
        gravity_threshold:     -0.5,
        jump_impulse:          2.0,
    }
}

type Positions = HashMap<AgentId, Vector3>;
type Velocities = HashMap<AgentId, Vector3>;

fn positions(points: &[(u32, [f32; 3])]) -> Positions {
    points.iter().map(|&(id, p)| (AgentId(id), p.into())).collect()
}

fn noop_flock(ids: &[u32]) -> Flock {
    FlockBuilder::new(test_config())
        .agents(ids.iter().copied().map(AgentId), Arc::new(NoopBehaviour))
        .build()
        .unwrap()
}

fn close(a: &Vector3, b: [f32; 3]) -> bool {
    a.distance_from(&b.into()) < 1e-5
}

/// Steers towards the first nearby peer.
struct Follow;

impl BehaviourStrategy for Follow {
    fn desired_acceleration(&self, agent: &Agent, peers: &[Agent]) -> Vector3 {
        let Some(&leader) = agent.state().nearby_list().first() else {
            return Vector3::zero();
        };
        match Agent::find(peers, leader) {
            Some(peer) => (peer.state().position() - agent.state().position()).normalized(0.1),
            None => Vector3::zero(),
        }
    }
}

struct FailingSink;

impl VelocitySink for FailingSink {
    fn set_velocity(&mut self, agent: AgentId, _velocity: &Vector3) -> CoreResult<()> {
        Err(CoreError::Sink { agent, reason: "disconnected".into() })
    }
}

#[derive(Default)]
struct Recorder {
    events: Vec<String>,
    last:   Option<TickReport>,
}

impl FlockObserver for Recorder {
    fn on_tick_start(&mut self, tick: Tick) {
        self.events.push(format!("start {tick}"));
    }

    fn on_classified(&mut self, tick: Tick, stats: &ClassificationStats) {
        self.events.push(format!("classified {tick} pairs={}", stats.pairs_visited));
    }

    fn on_tick_end(&mut self, tick: Tick, report: &TickReport) {
        self.events.push(format!("end {tick} committed={}", report.committed));
        self.last = Some(*report);
    }
}

// ── FlockBuilder ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn builds_sorted_by_id() {
        let flock = noop_flock(&[5, 1, 3]);
        let ids: Vec<AgentId> = flock.agents().iter().map(Agent::id).collect();
        assert_eq!(ids, vec![AgentId(1), AgentId(3), AgentId(5)]);
        assert_eq!(flock.tick(), Tick::ZERO);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let result = FlockBuilder::new(test_config())
            .agent(AgentId(2), Arc::new(NoopBehaviour))
            .agents([AgentId(1), AgentId(2)], Arc::new(Follow))
            .build();
        assert!(matches!(result, Err(FlockError::DuplicateAgent(AgentId(2)))));
    }

    #[test]
    fn radius_ordering_rejected() {
        let config = FlockConfig { collision_region_size: 5.0, ..test_config() };
        let result = FlockBuilder::new(config).build();
        assert!(matches!(
            result,
            Err(FlockError::Core(CoreError::RadiusOrdering { .. }))
        ));
    }

    #[test]
    fn blind_angle_out_of_range_rejected() {
        let config = FlockConfig { blind_region_angle: 400.0, ..test_config() };
        assert!(matches!(
            FlockBuilder::new(config).build(),
            Err(FlockError::Core(CoreError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn empty_flock_is_valid() {
        let flock = FlockBuilder::new(test_config()).build().unwrap();
        assert!(flock.is_empty());
    }
}

// ── Tick loop ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod step_tests {
    use super::*;

    #[test]
    fn first_tick_commits_every_agent() {
        let mut flock = noop_flock(&[0, 1]);
        let mut source = positions(&[(0, [0.0; 3]), (1, [0.5, 0.0, 0.0])]);
        let mut sink = Velocities::new();

        let report = flock.step(&mut source, &mut sink, &mut NoopObserver).unwrap();
        assert_eq!(report.tick, Tick(0));
        assert_eq!(report.updated, 2);
        assert_eq!(report.calculated, 2);
        assert_eq!(report.committed, 2);
        assert_eq!(report.classification.pairs_visited, 1);
        assert_eq!(flock.tick(), Tick(1));

        // No history yet: zero velocity, and noop adds nothing.
        assert!(sink[&AgentId(0)].is_null());
        assert!(sink[&AgentId(1)].is_null());

        let a = flock.agent(AgentId(0)).unwrap();
        assert_eq!(a.state().collision_list(), &[AgentId(1)]);
    }

    #[test]
    fn velocity_follows_position_deltas() {
        let mut flock = noop_flock(&[0]);
        let mut source = positions(&[(0, [0.0; 3])]);
        let mut sink = Velocities::new();
        flock.step(&mut source, &mut sink, &mut NoopObserver).unwrap();

        source.insert(AgentId(0), Vector3::new(0.5, 0.0, 0.25));
        flock.step(&mut source, &mut sink, &mut NoopObserver).unwrap();
        assert!(close(&sink[&AgentId(0)], [0.5, 0.0, 0.25]));
    }

    #[test]
    fn strategies_see_classified_peers() {
        let behaviour: Arc<dyn BehaviourStrategy> = Arc::new(Follow);
        let mut flock = FlockBuilder::new(test_config())
            .agents([AgentId(0), AgentId(1)], behaviour)
            .build()
            .unwrap();
        let mut source = positions(&[(0, [0.0; 3]), (1, [2.0, 0.0, 0.0])]);
        let mut sink = Velocities::new();

        flock.step(&mut source, &mut sink, &mut NoopObserver).unwrap();
        assert!(close(&sink[&AgentId(0)], [0.1, 0.0, 0.0]));
        assert!(close(&sink[&AgentId(1)], [-0.1, 0.0, 0.0]));
    }

    #[test]
    fn missing_position_abandons_tick() {
        let mut flock = noop_flock(&[0, 1]);
        let mut source = positions(&[(0, [0.0; 3])]);
        let mut sink = Velocities::new();

        let err = flock.step(&mut source, &mut sink, &mut NoopObserver).unwrap_err();
        assert!(matches!(
            err,
            FlockError::MissingPosition { agent: AgentId(1), tick: Tick(0) }
        ));
        assert_eq!(flock.tick(), Tick(0));
        assert!(sink.is_empty());
    }

    #[test]
    fn sink_failure_is_fatal() {
        let mut flock = noop_flock(&[0]);
        let mut source = positions(&[(0, [0.0; 3])]);
        let err = flock.step(&mut source, &mut FailingSink, &mut NoopObserver).unwrap_err();
        assert!(matches!(err, FlockError::Core(CoreError::Sink { .. })));
        assert_eq!(flock.tick(), Tick(0));
    }

    #[test]
    fn retry_after_sink_failure_repeats_the_tick() {
        let mut flock = noop_flock(&[0]);
        let mut source = positions(&[(0, [0.0; 3])]);
        let mut sink = Velocities::new();
        flock.step(&mut source, &mut sink, &mut NoopObserver).unwrap();
        source.insert(AgentId(0), Vector3::new(1.0, 0.0, 0.0));
        flock.step(&mut source, &mut sink, &mut NoopObserver).unwrap();

        source.insert(AgentId(0), Vector3::new(2.0, 0.0, 0.0));
        assert!(flock.step(&mut source, &mut FailingSink, &mut NoopObserver).is_err());
        assert_eq!(flock.tick(), Tick(2));
        let a = flock.agent(AgentId(0)).unwrap();
        assert!(close(a.state().position(), [1.0, 0.0, 0.0]));

        let report = flock.step(&mut source, &mut sink, &mut NoopObserver).unwrap();
        assert_eq!(report.tick, Tick(2));
        assert!(close(&sink[&AgentId(0)], [1.0, 0.0, 0.0]));
        let a = flock.agent(AgentId(0)).unwrap();
        assert!(a.state().acceleration().is_null());
        assert!(a.state().is_touching_ground());
        assert_eq!(flock.tick(), Tick(3));
    }

    #[test]
    fn run_ticks_advances_clock() {
        let mut flock = noop_flock(&[0, 1, 2]);
        let mut source = positions(&[(0, [0.0; 3]), (1, [1.0, 0.0, 0.0]), (2, [9.0, 0.0, 0.0])]);
        let mut sink = Velocities::new();
        flock.run_ticks(5, &mut source, &mut sink, &mut NoopObserver).unwrap();
        assert_eq!(flock.tick(), Tick(5));
        assert_eq!(sink.len(), 3);
    }

    #[test]
    fn observer_sees_every_phase() {
        let mut flock = noop_flock(&[0, 1]);
        let mut source = positions(&[(0, [0.0; 3]), (1, [1.0, 0.0, 0.0])]);
        let mut sink = Velocities::new();
        let mut recorder = Recorder::default();

        flock.step(&mut source, &mut sink, &mut recorder).unwrap();
        assert_eq!(
            recorder.events,
            vec!["start T0", "classified T0 pairs=1", "end T0 committed=2"]
        );
        assert_eq!(recorder.last.map(|r| r.updated), Some(2));
    }

    #[test]
    fn reclassify_rescans_everyone() {
        let mut flock = noop_flock(&[0, 1, 2]);
        let mut source = positions(&[(0, [0.0; 3]), (1, [1.0, 0.0, 0.0]), (2, [2.0, 0.0, 0.0])]);
        let mut sink = Velocities::new();
        flock.step(&mut source, &mut sink, &mut NoopObserver).unwrap();

        flock
            .set_config(FlockConfig { collision_region_size: 0.5, ..test_config() })
            .unwrap();
        let stats = flock.reclassify();
        assert_eq!(stats.agents_scanned, 3);
        assert_eq!(stats.pairs_visited, 3);
        let a = flock.agent(AgentId(0)).unwrap();
        assert!(a.state().collision_list().is_empty());
    }

    #[test]
    fn invalid_config_update_rejected() {
        let mut flock = noop_flock(&[0]);
        let result = flock.set_config(FlockConfig { neighbourhood_size: -1.0, ..test_config() });
        assert!(result.is_err());
        assert_eq!(flock.config(), &test_config());
    }
}

// ── Jump / stop ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod override_tests {
    use super::*;

    #[test]
    fn queued_jump_is_committed() {
        let mut flock = noop_flock(&[0, 1]);
        let mut source = positions(&[(0, [0.0; 3]), (1, [5.0, 0.0, 0.0])]);
        let mut sink = Velocities::new();
        flock.step(&mut source, &mut sink, &mut NoopObserver).unwrap();

        assert!(flock.jump(AgentId(0)).unwrap());
        let report = flock.step(&mut source, &mut sink, &mut NoopObserver).unwrap();
        assert_eq!(report.overrides, 1);
        assert!(close(&sink[&AgentId(0)], [0.0, 2.0, 0.0]));
        assert!(sink[&AgentId(1)].is_null());

        // Airborne until the host reports otherwise.
        assert!(flock.agent(AgentId(0)).unwrap().state().is_in_freefall());
        assert!(!flock.jump(AgentId(0)).unwrap());
    }

    #[test]
    fn queued_stop_cancels_velocity() {
        let mut flock = noop_flock(&[0]);
        let mut source = positions(&[(0, [0.0; 3])]);
        let mut sink = Velocities::new();
        flock.step(&mut source, &mut sink, &mut NoopObserver).unwrap();

        flock.stop(AgentId(0)).unwrap();
        source.insert(AgentId(0), Vector3::new(1.0, 0.0, 0.0));
        let report = flock.step(&mut source, &mut sink, &mut NoopObserver).unwrap();
        assert_eq!(report.overrides, 1);
        assert!(sink[&AgentId(0)].is_null());
    }

    #[test]
    fn queued_jump_survives_failed_tick() {
        let mut flock = noop_flock(&[0]);
        let mut source = positions(&[(0, [0.0; 3])]);
        let mut sink = Velocities::new();
        flock.step(&mut source, &mut sink, &mut NoopObserver).unwrap();

        assert!(flock.jump(AgentId(0)).unwrap());
        assert!(flock.step(&mut source, &mut FailingSink, &mut NoopObserver).is_err());
        assert!(flock.agent(AgentId(0)).unwrap().state().is_touching_ground());

        let report = flock.step(&mut source, &mut sink, &mut NoopObserver).unwrap();
        assert_eq!(report.overrides, 1);
        assert!(close(&sink[&AgentId(0)], [0.0, 2.0, 0.0]));
    }

    #[test]
    fn overrides_apply_once() {
        let mut flock = noop_flock(&[0]);
        let mut source = positions(&[(0, [0.0; 3])]);
        let mut sink = Velocities::new();
        flock.stop(AgentId(0)).unwrap();
        assert_eq!(flock.step(&mut source, &mut sink, &mut NoopObserver).unwrap().overrides, 1);
        assert_eq!(flock.step(&mut source, &mut sink, &mut NoopObserver).unwrap().overrides, 0);
    }

    #[test]
    fn unknown_agent_errors() {
        let mut flock = noop_flock(&[0]);
        assert!(matches!(flock.jump(AgentId(9)), Err(FlockError::AgentNotFound(AgentId(9)))));
        assert!(matches!(flock.stop(AgentId(9)), Err(FlockError::AgentNotFound(_))));
        assert!(matches!(
            flock.set_behaviour(AgentId(9), Arc::new(Follow)),
            Err(FlockError::AgentNotFound(_))
        ));
        assert!(matches!(flock.agent(AgentId(9)), Err(FlockError::AgentNotFound(_))));
    }
}

// ── Membership ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod membership_tests {
    use super::*;

    #[test]
    fn add_keeps_order_and_rejects_duplicates() {
        let mut flock = noop_flock(&[1, 4]);
        flock.add_agent(AgentId(2), Arc::new(NoopBehaviour)).unwrap();
        let ids: Vec<u32> = flock.agents().iter().map(|a| a.id().0).collect();
        assert_eq!(ids, vec![1, 2, 4]);
        assert!(matches!(
            flock.add_agent(AgentId(4), Arc::new(NoopBehaviour)),
            Err(FlockError::DuplicateAgent(AgentId(4)))
        ));
    }

    #[test]
    fn removed_agent_is_no_longer_polled() {
        let mut flock = noop_flock(&[0, 1]);
        let mut source = positions(&[(0, [0.0; 3]), (1, [1.0, 0.0, 0.0])]);
        let mut sink = Velocities::new();
        flock.step(&mut source, &mut sink, &mut NoopObserver).unwrap();

        flock.stop(AgentId(1)).unwrap();
        let removed = flock.remove_agent(AgentId(1)).unwrap();
        assert_eq!(removed.id(), AgentId(1));
        source.remove(&AgentId(1));

        let report = flock.step(&mut source, &mut sink, &mut NoopObserver).unwrap();
        assert_eq!(report.updated, 1);
        assert_eq!(report.overrides, 0);
        assert!(!flock.agent(AgentId(0)).unwrap().state().has_neighbours());
        assert!(matches!(flock.remove_agent(AgentId(1)), Err(FlockError::AgentNotFound(_))));
    }

    #[test]
    fn behaviour_swap_takes_effect_next_tick() {
        let mut flock = noop_flock(&[0, 1]);
        let mut source = positions(&[(0, [0.0; 3]), (1, [2.0, 0.0, 0.0])]);
        let mut sink = Velocities::new();
        flock.step(&mut source, &mut sink, &mut NoopObserver).unwrap();
        assert!(sink[&AgentId(0)].is_null());

        flock.set_behaviour(AgentId(0), Arc::new(Follow)).unwrap();
        flock.step(&mut source, &mut sink, &mut NoopObserver).unwrap();
        assert!(close(&sink[&AgentId(0)], [0.1, 0.0, 0.0]));
        assert!(sink[&AgentId(1)].is_null());
    }
}
