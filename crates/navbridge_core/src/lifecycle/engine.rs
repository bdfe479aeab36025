use crate::error::{CoreError, Result};

use super::{LifecycleState, Trigger, ALL_TRIGGERS};

/// Apply `via` to `current` and return the next state.
///
/// This enforces:
/// - which triggers are accepted in which states
/// - that `Cancelled` only ever leaves through `Cleanup`
/// - that `Errored` only recovers through `Retry` (or `Stop`)
pub fn next_state(current: LifecycleState, via: Trigger) -> Result<LifecycleState> {
    use LifecycleState::*;
    use Trigger::*;

    let next = match (current, via) {
        (Idle, Enable) => AwaitingRouteInputs,
        (Idle, EnableAwaitingPermission) => AwaitingPermission,
        (AwaitingPermission, PermissionGranted) => AwaitingRouteInputs,

        (AwaitingRouteInputs, RouteInputsReady) => RequestingRoute,

        (RequestingRoute, RoutesFound) => Previewing,
        (RequestingRoute, NoRoutes) => Errored,
        (RequestingRoute, RouteFailed) => Errored,
        // Cancellation re-arms the request; it is not fatal.
        (RequestingRoute, RouteCanceled) => AwaitingRouteInputs,

        // A new trip replaces the in-flight request or the current preview/guidance.
        (RequestingRoute | Previewing | Guiding | Arrived, InputsChanged) => RequestingRoute,

        (Previewing, StartGuidance) => Guiding,
        (Guiding, ArrivalReached) => Arrived,

        (s, Stop) if s != Idle && s != Cancelled => Cancelled,
        (Cancelled, Cleanup) => Idle,

        (s, SessionConflict | PermissionDenied) if s != Cancelled => Errored,
        (
            AwaitingPermission | AwaitingRouteInputs | RequestingRoute | Previewing | Guiding
            | Arrived,
            Fault,
        ) => Errored,

        (Errored, Retry) => AwaitingRouteInputs,

        _ => {
            return Err(CoreError::invalid_transition_lifecycle(
                current.id(),
                via.id(),
            ));
        }
    };

    Ok(next)
}

/// Triggers accepted in `state`, in declaration order.
pub fn available_triggers(state: LifecycleState) -> Vec<Trigger> {
    ALL_TRIGGERS
        .into_iter()
        .filter(|trigger| next_state(state, *trigger).is_ok())
        .collect()
}

//
// Tests
//
