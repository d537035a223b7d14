//! Flock observer trait for progress reporting and data collection.

use swarm_agent::ClassificationStats;
use swarm_core::Tick;

use crate::TickReport;

/// Callbacks invoked by [`Flock::step`][crate::Flock::step] at key points in
/// the tick.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — collision counter
///
/// ```rust
/// use swarm_agent::ClassificationStats;
/// use swarm_core::Tick;
/// use swarm_sim::FlockObserver;
///
/// #[derive(Default)]
/// struct PairCounter { pairs: usize }
///
/// impl FlockObserver for PairCounter {
///     fn on_classified(&mut self, _tick: Tick, stats: &ClassificationStats) {
///         self.pairs += stats.pairs_visited;
///     }
/// }
/// ```
pub trait FlockObserver {
    /// Called at the very start of each tick, before positions are read.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once neighbourhoods are built, before any behaviour runs.
    fn on_classified(&mut self, _tick: Tick, _stats: &ClassificationStats) {}

    /// Called after every pending velocity has been committed.
    fn on_tick_end(&mut self, _tick: Tick, _report: &TickReport) {}
}

/// A [`FlockObserver`] that does nothing.
pub struct NoopObserver;

impl FlockObserver for NoopObserver {}
