//! Per-agent kinematic state and neighbourhood classification results.

use std::fmt;

use swarm_core::{AgentId, Vector3};

use crate::BehaviourData;

#[cfg(feature = "fx-hash")]
pub(crate) type CheckedSet = rustc_hash::FxHashSet<AgentId>;
#[cfg(not(feature = "fx-hash"))]
pub(crate) type CheckedSet = std::collections::HashSet<AgentId>;

/// The kinematic history of one agent, as captured by
/// [`AgentState::kinematics`].
#[derive(Clone, Debug)]
pub struct Kinematics {
    position:           Vector3,
    velocity:           Vector3,
    acceleration:       Vector3,
    is_touching_ground: bool,
    has_history:        bool,
}

/// Everything the engine knows about one agent.
///
/// Kinematics are refreshed once per tick from the host.  The three
/// classification lists and their averages are rebuilt once per tick by
/// [`build_neighbourhoods`][crate::build_neighbourhoods]; read them only after
/// that pass (`needs_lists_rebuild() == false`).
///
/// # Classification tiers
///
/// Other agents within the neighbourhood are *nearby* (within perceptual
/// range), *crowded* (close) or *collided* (so close, and in front, as to be
/// touching).  `collision_list ⊆ crowded_list ⊆ nearby_list` always holds,
/// given `collision <= crowded <= neighbourhood` radii.
///
/// "Touching ground" is `false` while the agent jumps or falls; such agents
/// neither perceive nor are perceived.
pub struct AgentState {
    id: AgentId,

    pub(crate) position: Vector3,
    pub(crate) velocity: Vector3,
    acceleration:        Vector3,

    is_touching_ground: bool,
    /// `false` until the first kinematic update.
    has_history: bool,

    pub(crate) nearby_list:    Vec<AgentId>,
    pub(crate) crowded_list:   Vec<AgentId>,
    pub(crate) collision_list: Vec<AgentId>,

    // Running sums during a rebuild; averages once finalised.
    pub(crate) av_position:            Vector3,
    pub(crate) av_velocity:            Vector3,
    pub(crate) av_crowded_position:    Vector3,
    pub(crate) av_collision_direction: Vector3,

    /// Peers that have already classified the pair (self, peer) this tick.
    pub(crate) reciprocal_checked:  CheckedSet,
    pub(crate) needs_lists_rebuild: bool,

    behaviour_data: BehaviourData,
}

impl AgentState {
    /// A fresh, grounded agent at the origin with no history.
    pub fn new(id: AgentId) -> Self {
        Self {
            id,
            position:               Vector3::zero(),
            velocity:               Vector3::zero(),
            acceleration:           Vector3::zero(),
            is_touching_ground:     true,
            has_history:            false,
            nearby_list:            Vec::new(),
            crowded_list:           Vec::new(),
            collision_list:         Vec::new(),
            av_position:            Vector3::zero(),
            av_velocity:            Vector3::zero(),
            av_crowded_position:    Vector3::zero(),
            av_collision_direction: Vector3::zero(),
            reciprocal_checked:     CheckedSet::default(),
            needs_lists_rebuild:    true,
            behaviour_data:         BehaviourData::default(),
        }
    }

    // ── Kinematic updates ─────────────────────────────────────────────────

    /// Refresh from a host that reports both position and velocity.
    ///
    /// Acceleration is the velocity change since the previous update (zero on
    /// the first one).  The agent is free-falling while the vertical
    /// acceleration is below `gravity_threshold`.  Classification lists are
    /// reset and marked for rebuild.
    pub fn update_kinematics(
        &mut self,
        position:          &Vector3,
        velocity:          &Vector3,
        gravity_threshold: f32,
    ) {
        if self.has_history {
            self.acceleration = velocity - &self.velocity;
        } else {
            self.acceleration.reset();
        }
        self.position.reset_to(position);
        self.velocity.reset_to(velocity);
        self.has_history = true;

        self.is_touching_ground = self.acceleration.y() >= gravity_threshold;

        self.reset_lists();
    }

    /// Refresh from a position alone; velocity is the displacement since the
    /// previous update (zero on the first one).
    pub fn update_current_vectors(&mut self, position: &Vector3, gravity_threshold: f32) {
        let velocity = if self.has_history {
            position - &self.position
        } else {
            Vector3::zero()
        };
        self.update_kinematics(position, &velocity, gravity_threshold);
    }

    /// Capture the kinematic history so a failed tick can be undone.
    pub fn kinematics(&self) -> Kinematics {
        Kinematics {
            position:           self.position.clone(),
            velocity:           self.velocity.clone(),
            acceleration:       self.acceleration.clone(),
            is_touching_ground: self.is_touching_ground,
            has_history:        self.has_history,
        }
    }

    /// Put back a history captured by [`kinematics`](Self::kinematics).
    /// The lists are reset and marked for rebuild.
    pub fn restore_kinematics(&mut self, kinematics: Kinematics) {
        self.position           = kinematics.position;
        self.velocity           = kinematics.velocity;
        self.acceleration       = kinematics.acceleration;
        self.is_touching_ground = kinematics.is_touching_ground;
        self.has_history        = kinematics.has_history;
        self.reset_lists();
    }

    /// Mark the agent as airborne ahead of the host reporting it.
    pub fn notify_jump(&mut self) {
        self.is_touching_ground = false;
    }

    /// Clear all lists, sums and the reciprocal-check set, and mark the
    /// lists as needing a rebuild.
    pub fn reset_lists(&mut self) {
        self.nearby_list.clear();
        self.crowded_list.clear();
        self.collision_list.clear();
        self.av_position.reset();
        self.av_velocity.reset();
        self.av_crowded_position.reset();
        self.av_collision_direction.reset();
        self.reciprocal_checked.clear();
        self.needs_lists_rebuild = true;
    }

    // ── Proximity helpers ─────────────────────────────────────────────────

    /// Per-axis bounding-box test.  Much cheaper than a distance; use it to
    /// prune before [`within_precise_radius_of_point`](Self::within_precise_radius_of_point).
    #[inline]
    pub fn within_crude_radius_of_point(&self, point: &Vector3, radius: f32) -> bool {
        (self.position.x() - point.x()).abs() <= radius
            && (self.position.y() - point.y()).abs() <= radius
            && (self.position.z() - point.z()).abs() <= radius
    }

    #[inline]
    pub fn within_precise_radius_of_point(&self, point: &Vector3, radius: f32) -> bool {
        self.position.distance_squared_from(point) <= radius * radius
    }

    pub fn within_radius_of_point(&self, point: &Vector3, radius: f32) -> bool {
        self.within_crude_radius_of_point(point, radius)
            && self.within_precise_radius_of_point(point, radius)
    }

    /// Signed angle, in degrees, of `location` relative to the current heading.
    pub fn angle_to_location(&self, location: &Vector3) -> f32 {
        let direction = location - &self.position;
        self.velocity.angle_from(&direction)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    #[inline]
    pub fn position(&self) -> &Vector3 {
        &self.position
    }

    #[inline]
    pub fn velocity(&self) -> &Vector3 {
        &self.velocity
    }

    #[inline]
    pub fn acceleration(&self) -> &Vector3 {
        &self.acceleration
    }

    /// `true` unless the agent is jumping or falling.
    #[inline]
    pub fn is_touching_ground(&self) -> bool {
        self.is_touching_ground
    }

    #[inline]
    pub fn is_in_freefall(&self) -> bool {
        !self.is_touching_ground
    }

    #[inline]
    pub fn needs_lists_rebuild(&self) -> bool {
        self.needs_lists_rebuild
    }

    pub fn nearby_list(&self) -> &[AgentId] {
        &self.nearby_list
    }

    pub fn crowded_list(&self) -> &[AgentId] {
        &self.crowded_list
    }

    pub fn collision_list(&self) -> &[AgentId] {
        &self.collision_list
    }

    pub fn has_neighbours(&self) -> bool {
        !self.nearby_list.is_empty()
    }

    pub fn is_crowded(&self) -> bool {
        !self.crowded_list.is_empty()
    }

    pub fn is_collided(&self) -> bool {
        !self.collision_list.is_empty()
    }

    /// Mean position of self and all nearby agents (own position if alone).
    pub fn average_position(&self) -> &Vector3 {
        &self.av_position
    }

    /// Mean velocity of self and all nearby agents (own velocity if alone).
    pub fn average_velocity(&self) -> &Vector3 {
        &self.av_velocity
    }

    /// Centre of the crowding agents (own position if not crowded).
    pub fn average_crowded_position(&self) -> &Vector3 {
        &self.av_crowded_position
    }

    /// Mean direction from this agent towards the agents it collided with.
    pub fn average_collision_direction(&self) -> Option<&Vector3> {
        if self.collision_list.is_empty() {
            None
        } else {
            Some(&self.av_collision_direction)
        }
    }

    pub fn behaviour_data(&self) -> &BehaviourData {
        &self.behaviour_data
    }

    pub fn behaviour_data_mut(&mut self) -> &mut BehaviourData {
        &mut self.behaviour_data
    }
}

impl fmt::Debug for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentState")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("velocity", &self.velocity)
            .field("touching_ground", &self.is_touching_ground)
            .field("nearby", &self.nearby_list)
            .field("crowded", &self.crowded_list)
            .field("collided", &self.collision_list)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id={}, pos={}, vel={}, acln={}, TG={}",
            self.id.0,
            self.position,
            self.velocity,
            self.acceleration,
            if self.is_touching_ground { "Y" } else { "N" },
        )
    }
}
