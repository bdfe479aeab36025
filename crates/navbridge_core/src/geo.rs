//! Geographic inputs: validation and normalization of origin, destination and waypoints.
//!
//! Waypoints are route-shaping hints and are parsed leniently (invalid entries are
//! dropped). Origin and destination define the trip and fail with
//! `INVALID_COORDINATES` when malformed.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Domain, ErrorKind, NavErrorCode, Payload, Result};

const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// True iff both values are finite and inside the WGS84 ranges.
pub fn validate(lat: f64, lng: f64) -> bool {
    lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng)
}

/// A validated geographic point. Immutable once constructed.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        require_coordinate(latitude, longitude, "coordinate")
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let dlat = lat2 - lat1;
        let dlng = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
    }

    /// Linear interpolation between two points (`t` in `[0,1]`).
    ///
    /// Adequate for the short segments of route geometry.
    pub fn lerp(&self, other: &Coordinate, t: f64) -> Coordinate {
        let t = t.clamp(0.0, 1.0);
        Coordinate {
            latitude: self.latitude + (other.latitude - self.latitude) * t,
            longitude: self.longitude + (other.longitude - self.longitude) * t,
        }
    }

    /// Initial bearing in degrees `[0,360)` from `self` towards `other`.
    pub fn bearing_to(&self, other: &Coordinate) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let dlng = (other.longitude - self.longitude).to_radians();
        let y = dlng.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlng.cos();
        (y.atan2(x).to_degrees() + 360.0) % 360.0
    }
}

/// Validate a hard-required point (origin/destination).
pub fn require_coordinate(lat: f64, lng: f64, field: &'static str) -> Result<Coordinate> {
    if validate(lat, lng) {
        return Ok(Coordinate {
            latitude: lat,
            longitude: lng,
        });
    }

    Err(CoreError::warn()
        .domain(Domain::Geo)
        .kind(ErrorKind::InvalidArgument)
        .msgf(format_args!(
            "invalid {field}: latitude {lat} / longitude {lng} is out of range"
        ))
        .payload(Payload::Nav(NavErrorCode::InvalidCoordinates))
        .build())
}

/// Untrusted point as received from the host.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl RawCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn require(&self, field: &'static str) -> Result<Coordinate> {
        require_coordinate(self.latitude, self.longitude, field)
    }
}

/// Untrusted waypoint as received from the host.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWaypoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub name: Option<String>,
}

impl RawWaypoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            name: None,
        }
    }

    pub fn named(latitude: f64, longitude: f64, name: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            name: Some(name.into()),
        }
    }

    pub fn require(&self, field: &'static str) -> Result<Waypoint> {
        let coordinate = require_coordinate(self.latitude, self.longitude, field)?;
        Ok(Waypoint::new(coordinate, self.name.clone()))
    }
}

/// A validated point with an optional display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    pub coordinate: Coordinate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Waypoint {
    pub fn new(coordinate: Coordinate, name: Option<String>) -> Self {
        // Blank names carry no information for the host.
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Self { coordinate, name }
    }
}

/// Lenient waypoint parsing: invalid entries are dropped, order is preserved.
pub fn parse_waypoint_list(raw: &[RawWaypoint]) -> Vec<Waypoint> {
    raw.iter()
        .filter_map(|wp| match wp.require("waypoint") {
            Ok(waypoint) => Some(waypoint),
            Err(_) => {
                tracing::debug!(
                    latitude = wp.latitude,
                    longitude = wp.longitude,
                    "dropping invalid waypoint"
                );
                None
            }
        })
        .collect()
}

/// Axis-aligned bounds around a set of points.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn center(&self) -> (f64, f64) {
        (
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }
}

/// Bounds of all points, or `None` for an empty set.
pub fn bounding_box<'a, I>(points: I) -> Option<BoundingBox>
where
    I: IntoIterator<Item = &'a Coordinate>,
{
    points.into_iter().fold(None, |acc, p| {
        let (lat, lng) = (p.latitude(), p.longitude());
        Some(match acc {
            None => BoundingBox {
                south: lat,
                west: lng,
                north: lat,
                east: lng,
            },
            Some(b) => BoundingBox {
                south: b.south.min(lat),
                west: b.west.min(lng),
                north: b.north.max(lat),
                east: b.east.max(lng),
            },
        })
    })
}
