//! Host-facing event schema.
//!
//! Every native callback shape is normalized into one of these variants before it
//! reaches the `EventBridge`. Payload field names are camelCase for the host.

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::NavErrorCode;
use crate::geo::Coordinate;
use crate::guidance::{BannerInstruction, LocationUpdate, RouteProgress};

/// Bumped whenever an event name or payload field changes incompatibly.
pub const EVENT_SCHEMA_VERSION: u32 = 1;

pub mod names {
    pub const LOCATION_CHANGE: &str = "onLocationChange";
    pub const ROUTE_PROGRESS_CHANGE: &str = "onRouteProgressChange";
    pub const BANNER_INSTRUCTION: &str = "onBannerInstruction";
    pub const ARRIVE: &str = "onArrive";
    pub const DESTINATION_PREVIEW: &str = "onDestinationPreview";
    pub const DESTINATION_CHANGED: &str = "onDestinationChanged";
    pub const CANCEL_NAVIGATION: &str = "onCancelNavigation";
    pub const ERROR: &str = "onError";
    pub const BOTTOM_SHEET_ACTION_PRESS: &str = "onBottomSheetActionPress";
    pub const ROUTE_READY: &str = "onRouteReady";
    pub const STATE_CHANGE: &str = "onStateChange";
}

/// Whether a pressed panel button ships with the bridge or was defined by the host.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionSource {
    Builtin,
    Custom,
}

/// Normalized event delivered to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum NavEvent {
    LocationChange(LocationUpdate),
    RouteProgressChange(RouteProgress),
    BannerInstruction(BannerInstruction),
    Arrive {
        name: Option<String>,
    },
    DestinationPreview,
    DestinationChanged(Coordinate),
    CancelNavigation,
    Error {
        code: NavErrorCode,
        message: String,
    },
    BottomSheetActionPress {
        action_id: String,
        source: ActionSource,
    },
    RouteReady {
        route_count: usize,
        distance_meters: f64,
        duration_seconds: f64,
    },
    StateChange {
        from: &'static str,
        to: &'static str,
    },
}

impl NavEvent {
    pub fn name(&self) -> &'static str {
        match self {
            NavEvent::LocationChange(_) => names::LOCATION_CHANGE,
            NavEvent::RouteProgressChange(_) => names::ROUTE_PROGRESS_CHANGE,
            NavEvent::BannerInstruction(_) => names::BANNER_INSTRUCTION,
            NavEvent::Arrive { .. } => names::ARRIVE,
            NavEvent::DestinationPreview => names::DESTINATION_PREVIEW,
            NavEvent::DestinationChanged(_) => names::DESTINATION_CHANGED,
            NavEvent::CancelNavigation => names::CANCEL_NAVIGATION,
            NavEvent::Error { .. } => names::ERROR,
            NavEvent::BottomSheetActionPress { .. } => names::BOTTOM_SHEET_ACTION_PRESS,
            NavEvent::RouteReady { .. } => names::ROUTE_READY,
            NavEvent::StateChange { .. } => names::STATE_CHANGE,
        }
    }

    /// JSON payload for the host. Non-finite numbers serialize as `null`.
    pub fn payload(&self) -> Value {
        match self {
            NavEvent::LocationChange(update) => to_value(update),
            NavEvent::RouteProgressChange(progress) => to_value(progress),
            NavEvent::BannerInstruction(banner) => to_value(banner),
            NavEvent::Arrive { name } => json!({ "name": name }),
            NavEvent::DestinationPreview => json!({ "active": true }),
            NavEvent::DestinationChanged(coordinate) => to_value(coordinate),
            NavEvent::CancelNavigation => json!({}),
            NavEvent::Error { code, message } => json!({ "code": code, "message": message }),
            NavEvent::BottomSheetActionPress { action_id, source } => {
                json!({ "actionId": action_id, "source": source })
            }
            NavEvent::RouteReady {
                route_count,
                distance_meters,
                duration_seconds,
            } => json!({
                "routeCount": route_count,
                "distanceMeters": distance_meters,
                "durationSeconds": duration_seconds,
            }),
            NavEvent::StateChange { from, to } => json!({ "from": from, "to": to }),
        }
    }
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|err| {
        tracing::warn!(%err, "event payload serialization failed");
        Value::Null
    })
}
