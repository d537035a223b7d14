//! Flock configuration.
//!
//! Typically loaded from a JSON file by the application crate and handed to
//! `swarm_sim::FlockBuilder`, which validates it
//! before any tick runs.  The engine hard-codes no defaults: every threshold
//! comes from here.

use crate::{CoreError, CoreResult};

/// All thresholds used by neighbourhood classification and the agent cycle.
///
/// Distances are in scene units; `gravity_threshold` and `jump_impulse` are
/// velocity changes in scene units per tick.  The vertical axis is `y`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlockConfig {
    /// Outer (perceptual) radius: agents closer than this are "nearby".
    pub neighbourhood_size: f32,

    /// Agents closer than this are "crowding".  Must be `<= neighbourhood_size`.
    pub crowded_region_size: f32,

    /// Agents closer than this (and in front) have "collided".
    /// Must be `<= crowded_region_size`.
    pub collision_region_size: f32,

    /// Width in degrees of the rear blind cone, centred on directly behind.
    /// At `0` only the direction straight behind is hidden; `360` means blind.
    pub blind_region_angle: f32,

    /// Vertical acceleration below which an agent is free-falling.
    /// Usually negative (gravity pulls along `-y`).
    pub gravity_threshold: f32,

    /// Vertical impulse added to the desired acceleration by a jump.
    pub jump_impulse: f32,
}

impl FlockConfig {
    /// Half-angle of the visible cone: a neighbour is perceived only while the
    /// angle between heading and direction-to-neighbour is below this.
    #[inline]
    pub fn visible_area_angle(&self) -> f32 {
        180.0 - self.blind_region_angle * 0.5
    }

    /// Check ranges and the `collision <= crowded <= neighbourhood` ordering.
    pub fn validate(&self) -> CoreResult<()> {
        let sizes = [
            ("neighbourhood_size", self.neighbourhood_size),
            ("crowded_region_size", self.crowded_region_size),
            ("collision_region_size", self.collision_region_size),
        ];
        for (name, value) in sizes {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::InvalidConfig(format!(
                    "{name} must be a finite, non-negative distance (got {value})"
                )));
            }
        }

        if !(0.0..=360.0).contains(&self.blind_region_angle) {
            return Err(CoreError::InvalidConfig(format!(
                "blind_region_angle must lie in [0, 360] degrees (got {})",
                self.blind_region_angle
            )));
        }

        if !self.gravity_threshold.is_finite() || !self.jump_impulse.is_finite() {
            return Err(CoreError::InvalidConfig(
                "gravity_threshold and jump_impulse must be finite".to_string(),
            ));
        }

        if self.collision_region_size > self.crowded_region_size
            || self.crowded_region_size > self.neighbourhood_size
        {
            return Err(CoreError::RadiusOrdering {
                collision:     self.collision_region_size,
                crowded:       self.crowded_region_size,
                neighbourhood: self.neighbourhood_size,
            });
        }

        Ok(())
    }
}
