//! Demo settings, optionally loaded from a JSON file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use swarm_core::FlockConfig;

use crate::boids::BoidsWeights;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MeadowConfig {
    pub agents:       u32,
    pub ticks:        u64,
    pub seed:         u64,
    pub field_size:   f32,
    pub max_speed:    f32,
    /// Vertical velocity change per tick while airborne.
    pub gravity:      f32,
    /// Every this many ticks a random animal jumps (0 = never).
    pub jump_every:   u64,
    pub report_every: u64,
    pub flock:        FlockConfig,
    pub boids:        BoidsWeights,
}

impl Default for MeadowConfig {
    fn default() -> Self {
        Self {
            agents:       32,
            ticks:        200,
            seed:         42,
            field_size:   50.0,
            max_speed:    1.0,
            gravity:      -1.0,
            jump_every:   20,
            report_every: 25,
            flock: FlockConfig {
                neighbourhood_size:    8.0,
                crowded_region_size:   3.0,
                collision_region_size: 1.0,
                blind_region_angle:    60.0,
                gravity_threshold:     -0.5,
                jump_impulse:          2.0,
            },
            boids: BoidsWeights::default(),
        }
    }
}

impl MeadowConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }
}
