//! navbridge_core::lifecycle
//!
//! Pure navigation lifecycle semantics. This module contains **no** collaborator
//! calls; the surface layer applies transitions and owns the side effects.
//!
//! Key ideas:
//! - One table (`next_state`) decides every transition
//! - Host commands and upstream outcomes are both `Trigger`s
//! - `Cancelled` is transient and always followed by `Cleanup`
//! - `Errored` recovers only through an explicit `Retry`

mod engine;
mod graph;
mod state;
mod trigger;

pub use engine::{available_triggers, next_state};
pub use graph::{transition_graph, TransitionEdge, TransitionGraph};
pub use state::{LifecycleState, ALL_STATES};
pub use trigger::{Trigger, ALL_TRIGGERS};
