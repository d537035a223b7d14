//! Classic separation / alignment / cohesion steering, plus a per-agent
//! wander heading kept in the behaviour data slot.

use serde::Deserialize;
use swarm_agent::AgentState;
use swarm_behavior::{Agent, BehaviourError, BehaviourResult, BehaviourStrategy};
use swarm_core::{AgentRng, Vector3};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BoidsWeights {
    /// Push away from the crowd centre (doubled against collisions).
    pub separation: f32,
    /// Match the neighbourhood's mean velocity.
    pub alignment: f32,
    /// Pull towards the neighbourhood's mean position.
    pub cohesion: f32,
    /// Strength of the wander heading.
    pub wander: f32,
    /// Max change of the wander angle per tick, in degrees.
    pub wander_jitter: f32,
    /// Cap on the horizontal steering magnitude.
    pub max_force: f32,
}

impl Default for BoidsWeights {
    fn default() -> Self {
        Self {
            separation:    1.5,
            alignment:     1.0,
            cohesion:      1.0,
            wander:        0.2,
            wander_jitter: 15.0,
            max_force:     0.3,
        }
    }
}

/// Per-agent wander state.
struct Wander {
    rng:   AgentRng,
    angle: f32,
}

pub struct Boids {
    weights: BoidsWeights,
    seed:    u64,
}

impl Boids {
    pub fn new(weights: BoidsWeights, seed: u64) -> BehaviourResult<Self> {
        let named = [
            ("separation", weights.separation),
            ("alignment", weights.alignment),
            ("cohesion", weights.cohesion),
            ("wander", weights.wander),
            ("wander_jitter", weights.wander_jitter),
            ("max_force", weights.max_force),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(BehaviourError::Config(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }
        Ok(Self { weights, seed })
    }
}

impl BehaviourStrategy for Boids {
    fn desired_acceleration(&self, agent: &Agent, _peers: &[Agent]) -> Vector3 {
        let state = agent.state();
        let w = &self.weights;
        let mut steer = Vector3::zero();

        if let Some(direction) = state.average_collision_direction() {
            steer -= &direction.normalized(w.separation * 2.0);
        } else if state.is_crowded() {
            let away = state.position() - state.average_crowded_position();
            steer += &away.normalized(w.separation);
        }

        if state.has_neighbours() {
            steer += &((state.average_velocity() - state.velocity()) * w.alignment);
            steer += &(state.average_position() - state.position()).normalized(w.cohesion);
        }

        if let Some(wander) = state.behaviour_data().get::<Wander>() {
            let mut heading = state.velocity().normalized(w.wander);
            heading.rotate(wander.angle);
            steer += &heading;
        }

        // Herds graze; only jumps leave the ground.
        steer.set_y(0.0);
        if steer.magnitude() > w.max_force {
            steer.normalize(w.max_force);
        }
        steer
    }

    fn on_agent_updated(&self, state: &mut AgentState) {
        let jitter = self.weights.wander_jitter;
        if let Some(wander) = state.behaviour_data_mut().get_mut::<Wander>() {
            let turn = wander.rng.gen_range(-jitter..=jitter);
            wander.angle = (wander.angle + turn).clamp(-90.0, 90.0);
        }
    }

    fn on_agent_assigned(&self, state: &mut AgentState) {
        let rng = AgentRng::new(self.seed, state.id());
        state.behaviour_data_mut().set(Wander { rng, angle: 0.0 });
    }

    fn name(&self) -> &str {
        "boids"
    }
}
