//! Surface transition stream.
//!
//! Host-facing `onStateChange` events carry labels only; in-process observers
//! (the runtime, tests, the simulator) subscribe to these typed records instead.

use navbridge_core::lifecycle::{LifecycleState, Trigger};

/// Emitted after every applied lifecycle transition.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub from: LifecycleState,
    pub trigger: Trigger,
    pub to: LifecycleState,
}
