//! `swarm-behavior` — behaviour strategies and the agent orchestrator.
//!
//! # Crate layout
//!
//! | Module    | Contents                                                          |
//! |-----------|-------------------------------------------------------------------|
//! | [`model`] | `BehaviourStrategy` trait                                         |
//! | [`agent`] | `Agent` — state + strategy handle + calculate/commit flags         |
//! | [`noop`]  | `NoopBehaviour` — placeholder that never steers                   |
//! | [`error`] | `BehaviourError`, `BehaviourResult<T>`                            |
//!
//! # Design notes
//!
//! Behaviour is computed in two halves so the flock can parallelise it:
//!
//! 1. **Plan** (parallel): every agent with a pending calculation asks its
//!    strategy for a desired acceleration.  Agents and peers are only read.
//!
//! 2. **Apply** (sequential): the planned vectors are stored and each agent
//!    is marked for commit.
//!
//! Strategies therefore only need `&self`; per-agent mutable state lives in
//! the agent's `BehaviourData` slot and is touched only from the update and
//! assignment hooks.

pub mod agent;
pub mod error;
pub mod model;
pub mod noop;

#[cfg(test)]
mod tests;

pub use agent::{Agent, AgentSnapshot};
pub use error::{BehaviourError, BehaviourResult};
pub use model::BehaviourStrategy;
pub use noop::NoopBehaviour;
