use navbridge_core::logging::log_core_error;
use navbridge_core::Result;

/// Every call the surface makes into a collaborator.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BoundaryOp {
    RequestRoute,
    CancelRoute,
    RenderRoute,
    ClearRoute,
    SetCamera,
    RegisterObservers,
    UnregisterObservers,
    StartTripSession,
    StopTripSession,
    SetVoice,
    RequestPermission,
}

pub const ALL_BOUNDARY_OPS: [BoundaryOp; 11] = [
    BoundaryOp::RequestRoute,
    BoundaryOp::CancelRoute,
    BoundaryOp::RenderRoute,
    BoundaryOp::ClearRoute,
    BoundaryOp::SetCamera,
    BoundaryOp::RegisterObservers,
    BoundaryOp::UnregisterObservers,
    BoundaryOp::StartTripSession,
    BoundaryOp::StopTripSession,
    BoundaryOp::SetVoice,
    BoundaryOp::RequestPermission,
];

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FailurePolicy {
    /// Log through `log_core_error` and carry on.
    LogAndIgnore,
    /// Hand the error to the caller, which moves the surface to `Errored`.
    Propagate,
}

/// Failure policy for one boundary call.
///
/// Only calls without which a session cannot make progress propagate.
pub const fn boundary_policy(op: BoundaryOp) -> FailurePolicy {
    match op {
        BoundaryOp::RequestRoute | BoundaryOp::RegisterObservers | BoundaryOp::StartTripSession => {
            FailurePolicy::Propagate
        }
        BoundaryOp::CancelRoute
        | BoundaryOp::RenderRoute
        | BoundaryOp::ClearRoute
        | BoundaryOp::SetCamera
        | BoundaryOp::UnregisterObservers
        | BoundaryOp::StopTripSession
        | BoundaryOp::SetVoice
        | BoundaryOp::RequestPermission => FailurePolicy::LogAndIgnore,
    }
}

/// Apply the policy for `op` to a collaborator result.
///
/// `Ok(None)` means the call failed and the failure was logged and swallowed.
pub fn settle<T>(op: BoundaryOp, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) => match boundary_policy(op) {
            FailurePolicy::Propagate => Err(err),
            FailurePolicy::LogAndIgnore => {
                tracing::debug!(?op, "collaborator call failed; continuing");
                log_core_error(&err);
                Ok(None)
            }
        },
    }
}
