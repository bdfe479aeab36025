use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Domain, ErrorKind, Result};
use crate::geo::{Coordinate, Waypoint};

/// Unit system for spoken and displayed distances.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Metric,
    Imperial,
}

impl DistanceUnit {
    pub const fn as_str(self) -> &'static str {
        match self {
            DistanceUnit::Metric => "metric",
            DistanceUnit::Imperial => "imperial",
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metric" => Ok(DistanceUnit::Metric),
            "imperial" => Ok(DistanceUnit::Imperial),
            other => Err(CoreError::warn()
                .domain(Domain::Config)
                .kind(ErrorKind::InvalidArgument)
                .msgf(format_args!(
                    "unknown distance unit {other:?} (expected metric|imperial)"
                ))
                .build()),
        }
    }
}

/// Everything the routing collaborator needs for one directions request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub origin: Coordinate,
    pub waypoints: Vec<Waypoint>,
    pub destination: Waypoint,
    pub alternatives: bool,
    pub language: String,
    pub distance_unit: DistanceUnit,
}

impl RouteRequest {
    /// Origin, intermediate waypoints and destination, in travel order.
    pub fn stops(&self) -> Vec<Coordinate> {
        std::iter::once(self.origin)
            .chain(self.waypoints.iter().map(|w| w.coordinate))
            .chain(std::iter::once(self.destination.coordinate))
            .collect()
    }

    /// The inputs that decide whether a new request is needed.
    pub fn key(&self) -> RouteKey {
        RouteKey {
            origin: self.origin,
            destination: self.destination.clone(),
            waypoints: self.waypoints.clone(),
            alternatives: self.alternatives,
        }
    }
}

/// Identity of a route request for re-request suppression.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteKey {
    pub origin: Coordinate,
    pub destination: Waypoint,
    pub waypoints: Vec<Waypoint>,
    pub alternatives: bool,
}

/// Handle for one in-flight route request. Results for any other ticket are stale.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct RouteTicket(pub u64);

impl RouteTicket {
    pub const fn next(self) -> Self {
        RouteTicket(self.0 + 1)
    }
}

impl fmt::Display for RouteTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "route#{}", self.0)
    }
}

/// A computed route as reported by the routing collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub geometry: Vec<Coordinate>,
    pub distance_m: f64,
    pub duration_s: f64,
}

/// Completion of a route request.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Routes(Vec<Route>),
    Failed(String),
    Canceled,
}
