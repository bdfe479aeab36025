/// Inputs that move a surface between lifecycle states.
///
/// Host commands (enable, start, stop, retry) and upstream outcomes (route
/// responses, arrival, permission changes) are both modeled as triggers so that
/// one table decides every transition.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Trigger {
    /// `enable(true)` with location permission already granted.
    Enable,
    /// `enable(true)` while the permission prompt is pending.
    EnableAwaitingPermission,
    PermissionGranted,
    PermissionDenied,
    /// Origin and destination are present and valid.
    RouteInputsReady,
    /// Destination, waypoints, origin or alternatives changed.
    InputsChanged,
    RoutesFound,
    NoRoutes,
    RouteFailed,
    RouteCanceled,
    StartGuidance,
    ArrivalReached,
    Stop,
    Cleanup,
    SessionConflict,
    /// Engine failure outside the routing path (init, location, native).
    Fault,
    Retry,
}

/// Internal, compact IDs used for error payloads.
impl Trigger {
    pub const fn id(self) -> u8 {
        match self {
            Trigger::Enable => 1,
            Trigger::EnableAwaitingPermission => 2,
            Trigger::PermissionGranted => 3,
            Trigger::PermissionDenied => 4,
            Trigger::RouteInputsReady => 5,
            Trigger::InputsChanged => 6,
            Trigger::RoutesFound => 7,
            Trigger::NoRoutes => 8,
            Trigger::RouteFailed => 9,
            Trigger::RouteCanceled => 10,
            Trigger::StartGuidance => 11,
            Trigger::ArrivalReached => 12,
            Trigger::Stop => 13,
            Trigger::Cleanup => 14,
            Trigger::SessionConflict => 15,
            Trigger::Fault => 16,
            Trigger::Retry => 17,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Trigger::Enable => "enable",
            Trigger::EnableAwaitingPermission => "enableAwaitingPermission",
            Trigger::PermissionGranted => "permissionGranted",
            Trigger::PermissionDenied => "permissionDenied",
            Trigger::RouteInputsReady => "routeInputsReady",
            Trigger::InputsChanged => "inputsChanged",
            Trigger::RoutesFound => "routesFound",
            Trigger::NoRoutes => "noRoutes",
            Trigger::RouteFailed => "routeFailed",
            Trigger::RouteCanceled => "routeCanceled",
            Trigger::StartGuidance => "startGuidance",
            Trigger::ArrivalReached => "arrivalReached",
            Trigger::Stop => "stop",
            Trigger::Cleanup => "cleanup",
            Trigger::SessionConflict => "sessionConflict",
            Trigger::Fault => "fault",
            Trigger::Retry => "retry",
        }
    }
}

pub const ALL_TRIGGERS: [Trigger; 17] = [
    Trigger::Enable,
    Trigger::EnableAwaitingPermission,
    Trigger::PermissionGranted,
    Trigger::PermissionDenied,
    Trigger::RouteInputsReady,
    Trigger::InputsChanged,
    Trigger::RoutesFound,
    Trigger::NoRoutes,
    Trigger::RouteFailed,
    Trigger::RouteCanceled,
    Trigger::StartGuidance,
    Trigger::ArrivalReached,
    Trigger::Stop,
    Trigger::Cleanup,
    Trigger::SessionConflict,
    Trigger::Fault,
    Trigger::Retry,
];
