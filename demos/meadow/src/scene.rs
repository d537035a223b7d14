//! The host side: a square meadow of point bodies with simple gravity.
//!
//! The meadow owns the "real" bodies.  Each tick it integrates them with the
//! last committed velocities and hands the engine a position snapshot; the
//! engine answers through [`VelocitySink`].

use std::collections::HashMap;

use swarm_core::{AgentId, AgentRng, CoreError, CoreResult, Vector3, VelocitySink};

use crate::config::MeadowConfig;

struct Body {
    position: Vector3,
    velocity: Vector3,
}

pub struct Meadow {
    bodies:    Vec<Body>,
    size:      f32,
    gravity:   f32,
    max_speed: f32,
}

impl Meadow {
    /// Scatter `config.agents` bodies uniformly over the field, each with a
    /// small random heading.
    pub fn scatter(config: &MeadowConfig) -> Self {
        let bodies = (0..config.agents)
            .map(|i| {
                let mut rng = AgentRng::new(config.seed, AgentId(i));
                let position = Vector3::new(
                    rng.gen_range(0.0..config.field_size),
                    0.0,
                    rng.gen_range(0.0..config.field_size),
                );
                let mut velocity = Vector3::zero();
                velocity.jitter(config.max_speed * 0.5, rng.inner());
                velocity.set_y(0.0);
                Body { position, velocity }
            })
            .collect();
        Self {
            bodies,
            size:      config.field_size,
            gravity:   config.gravity,
            max_speed: config.max_speed,
        }
    }

    /// Move every body one tick and return where they ended up.
    pub fn advance(&mut self) -> HashMap<AgentId, Vector3> {
        let mut snapshot = HashMap::with_capacity(self.bodies.len());
        for (i, body) in self.bodies.iter_mut().enumerate() {
            if body.position.y() > 0.0 || body.velocity.y() > 0.0 {
                body.velocity.set_y(body.velocity.y() + self.gravity);
            }
            body.position += &body.velocity;

            if body.position.y() < 0.0 {
                body.position.set_y(0.0);
                body.velocity.set_y(0.0);
            }
            bounce(&mut body.position, &mut body.velocity, self.size);

            snapshot.insert(AgentId(i as u32), body.position.clone());
        }
        snapshot
    }

    pub fn airborne(&self) -> usize {
        self.bodies.iter().filter(|b| b.position.y() > 0.0).count()
    }

    /// Mean ground speed across the herd.
    pub fn mean_speed(&self) -> f32 {
        if self.bodies.is_empty() {
            return 0.0;
        }
        let total: f32 = self
            .bodies
            .iter()
            .map(|b| Vector3::new(b.velocity.x(), 0.0, b.velocity.z()).magnitude())
            .sum();
        total / self.bodies.len() as f32
    }
}

/// Reflect off the field's edges.
fn bounce(position: &mut Vector3, velocity: &mut Vector3, size: f32) {
    if position.x() < 0.0 || position.x() > size {
        position.set_x(position.x().clamp(0.0, size));
        velocity.set_x(-velocity.x());
    }
    if position.z() < 0.0 || position.z() > size {
        position.set_z(position.z().clamp(0.0, size));
        velocity.set_z(-velocity.z());
    }
}

impl VelocitySink for Meadow {
    fn set_velocity(&mut self, agent: AgentId, velocity: &Vector3) -> CoreResult<()> {
        let body = self
            .bodies
            .get_mut(agent.0 as usize)
            .ok_or_else(|| CoreError::Sink { agent, reason: "no such body".into() })?;

        let mut ground = Vector3::new(velocity.x(), 0.0, velocity.z());
        if ground.magnitude() > self.max_speed {
            ground.normalize(self.max_speed);
        }
        body.velocity.set(ground.x(), velocity.y(), ground.z());
        Ok(())
    }
}
