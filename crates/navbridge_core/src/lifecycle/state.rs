/// Navigation lifecycle states of one surface.
///
/// Session-holding states:
/// - RequestingRoute, Previewing, Guiding, Arrived
///
/// Resting states:
/// - Idle, AwaitingPermission, AwaitingRouteInputs, Errored
///
/// `Cancelled` is transient: cleanup moves it to `Idle` immediately.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LifecycleState {
    Idle,
    AwaitingPermission,
    AwaitingRouteInputs,
    RequestingRoute,
    Previewing,
    Guiding,
    Arrived,
    Cancelled,
    Errored,
}

/// Internal, compact IDs used for error payloads.
impl LifecycleState {
    pub const fn id(self) -> u8 {
        match self {
            LifecycleState::Idle => 0,
            LifecycleState::AwaitingPermission => 1,
            LifecycleState::AwaitingRouteInputs => 2,
            LifecycleState::RequestingRoute => 3,
            LifecycleState::Previewing => 4,
            LifecycleState::Guiding => 5,
            LifecycleState::Arrived => 6,
            LifecycleState::Cancelled => 7,
            LifecycleState::Errored => 8,
        }
    }

    /// True while the surface owns the registry slot.
    pub const fn holds_session(self) -> bool {
        matches!(
            self,
            LifecycleState::RequestingRoute
                | LifecycleState::Previewing
                | LifecycleState::Guiding
                | LifecycleState::Arrived
        )
    }

    /// True while turn-by-turn guidance is running.
    pub const fn is_guiding(self) -> bool {
        matches!(self, LifecycleState::Guiding | LifecycleState::Arrived)
    }

    /// Stable, human-readable label for host-facing events.
    pub const fn label(self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::AwaitingPermission => "awaitingPermission",
            LifecycleState::AwaitingRouteInputs => "awaitingRouteInputs",
            LifecycleState::RequestingRoute => "requestingRoute",
            LifecycleState::Previewing => "previewing",
            LifecycleState::Guiding => "guiding",
            LifecycleState::Arrived => "arrived",
            LifecycleState::Cancelled => "cancelled",
            LifecycleState::Errored => "errored",
        }
    }
}

pub const ALL_STATES: [LifecycleState; 9] = [
    LifecycleState::Idle,
    LifecycleState::AwaitingPermission,
    LifecycleState::AwaitingRouteInputs,
    LifecycleState::RequestingRoute,
    LifecycleState::Previewing,
    LifecycleState::Guiding,
    LifecycleState::Arrived,
    LifecycleState::Cancelled,
    LifecycleState::Errored,
];
