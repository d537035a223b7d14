//! Nearby / crowded / collided classification over a whole population.
//!
//! # Algorithm
//!
//! ```text
//! for each agent A with dirty lists:
//!   for each other agent B not yet in A.reciprocal_checked:
//!     B.reciprocal_checked ∪= {A}                  ← pair now owned by A's scan
//!     skip unless A and B are both touching ground
//!     reject if any |Δaxis| > neighbourhood         ← prune & sweep, no sqrt
//!     reject if |B − A|² > neighbourhood²
//!     classify B from A's heading                   ← FOV gate, tiers
//!     classify A from B's heading (reciprocal)      ← distance is symmetric,
//!                                                     the FOV gate is not
//!   finalise A's averages, clear A's dirty flag
//! ```
//!
//! Because A marks every peer it scans, no peer scanned later ever revisits
//! the pair, and no peer writes into A's lists after A has been finalised:
//! each unordered pair is visited once per tick, with at most two
//! field-of-view evaluations (one per side).
//!
//! This pass mutates a *peer's* lists from inside another agent's scan, so it
//! always runs single-threaded.

use swarm_core::{FlockConfig, Vector3};

use crate::AgentState;

/// Anything that owns an [`AgentState`] can be classified in place.
///
/// Implemented for `AgentState` itself and by the agent orchestrator so the
/// pass can run directly over the flock's agent slice.
pub trait HasAgentState {
    fn agent_state(&self) -> &AgentState;
    fn agent_state_mut(&mut self) -> &mut AgentState;
}

impl HasAgentState for AgentState {
    #[inline]
    fn agent_state(&self) -> &AgentState {
        self
    }

    #[inline]
    fn agent_state_mut(&mut self) -> &mut AgentState {
        self
    }
}

/// Work counters from one classification pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassificationStats {
    /// Agents whose lists were rebuilt by their own scan.
    pub agents_scanned: usize,
    /// Unordered pairs visited (each at most once per pass).
    pub pairs_visited: usize,
    /// Pairs that survived the per-axis prune and needed a true distance.
    pub distance_checks: usize,
    /// Heading-vs-direction angle evaluations (at most two per pair).
    pub fov_evaluations: usize,
}

impl std::ops::AddAssign for ClassificationStats {
    fn add_assign(&mut self, rhs: Self) {
        self.agents_scanned  += rhs.agents_scanned;
        self.pairs_visited   += rhs.pairs_visited;
        self.distance_checks += rhs.distance_checks;
        self.fov_evaluations += rhs.fov_evaluations;
    }
}

/// Build every dirty agent's lists and averages.
///
/// With `force_rebuild`, every agent's lists, sums and reciprocal-check set
/// are cleared first, so the whole population is reclassified from scratch.
pub fn build_neighbourhoods<T: HasAgentState>(
    agents:        &mut [T],
    config:        &FlockConfig,
    force_rebuild: bool,
) -> ClassificationStats {
    if force_rebuild {
        for agent in agents.iter_mut() {
            agent.agent_state_mut().reset_lists();
        }
    }

    let mut stats = ClassificationStats::default();

    for i in 0..agents.len() {
        if !agents[i].agent_state().needs_lists_rebuild {
            continue;
        }
        stats.agents_scanned += 1;

        for j in 0..agents.len() {
            if i == j {
                continue;
            }
            let (this, other) = pair_mut(agents, i, j);
            scan_candidate(
                this.agent_state_mut(),
                other.agent_state_mut(),
                config,
                &mut stats,
            );
        }

        agents[i].agent_state_mut().finalise_lists();
    }

    stats
}

/// Disjoint mutable references to `slice[i]` and `slice[j]` (`i != j`).
fn pair_mut<T>(slice: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(i, j);
    if i < j {
        let (head, tail) = slice.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = slice.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}

fn scan_candidate(
    this:   &mut AgentState,
    other:  &mut AgentState,
    config: &FlockConfig,
    stats:  &mut ClassificationStats,
) {
    if this.reciprocal_checked.contains(&other.id()) {
        return;
    }
    // A peer whose lists are already final this tick is perceived one-way
    // only; its own lists are left untouched.
    let reciprocate = other.needs_lists_rebuild;
    if reciprocate {
        other.reciprocal_checked.insert(this.id());
    }
    stats.pairs_visited += 1;

    if this.is_in_freefall() || other.is_in_freefall() {
        return;
    }

    let radius = config.neighbourhood_size;
    if !this.within_crude_radius_of_point(other.position(), radius) {
        return;
    }

    stats.distance_checks += 1;
    let mut direction = other.position() - this.position();
    let distance_squared = direction.magnitude_squared();
    if distance_squared > radius * radius {
        return;
    }

    this.consider_neighbour(other, &direction, distance_squared, config, stats);
    if reciprocate {
        direction.invert();
        other.consider_neighbour(this, &direction, distance_squared, config, stats);
    }
}

impl AgentState {
    /// Field-of-view gate and tiered classification of `other`, which is
    /// already known to lie within the neighbourhood radius.
    fn consider_neighbour(
        &mut self,
        other:            &AgentState,
        direction:        &Vector3,
        distance_squared: f32,
        config:           &FlockConfig,
        stats:            &mut ClassificationStats,
    ) {
        stats.fov_evaluations += 1;
        let angle = self.velocity().angle_between(direction);
        if angle >= config.visible_area_angle() {
            return;
        }

        self.nearby_list.push(other.id());
        self.av_velocity.add(other.velocity());
        self.av_position.add(other.position());

        let crowded = config.crowded_region_size;
        if distance_squared < crowded * crowded {
            self.crowded_list.push(other.id());
            self.av_crowded_position.add(other.position());

            let collision = config.collision_region_size;
            if distance_squared < collision * collision && angle < 90.0 {
                self.collision_list.push(other.id());
                self.av_collision_direction.add(direction);
            }
        }
    }

    /// Turn the running sums into averages and clear the dirty flag.
    fn finalise_lists(&mut self) {
        if self.nearby_list.is_empty() {
            self.av_velocity.reset_to(&self.velocity);
            self.av_position.reset_to(&self.position);
        } else {
            let count = (self.nearby_list.len() + 1) as f32;
            self.av_velocity.add(&self.velocity);
            self.av_velocity.divide(count);
            self.av_position.add(&self.position);
            self.av_position.divide(count);
        }

        if self.crowded_list.is_empty() {
            self.av_crowded_position.reset_to(&self.position);
        } else {
            self.av_crowded_position.divide(self.crowded_list.len() as f32);
        }

        if !self.collision_list.is_empty() {
            self.av_collision_direction.divide(self.collision_list.len() as f32);
        }

        self.needs_lists_rebuild = false;
        log::trace!(
            "{}: nearby={} crowded={} collided={}",
            self.id(),
            self.nearby_list.len(),
            self.crowded_list.len(),
            self.collision_list.len(),
        );
    }
}
