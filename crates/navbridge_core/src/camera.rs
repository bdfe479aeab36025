//! Camera policy for the map collaborator.
//!
//! `Following` recenters on location updates, throttled. `Overview` fits the
//! route bounds with fixed edge insets once per route-ready and on demand.

use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Domain, ErrorKind, Result};
use crate::geo::{bounding_box, BoundingBox, Coordinate};
use crate::guidance::LocationUpdate;

/// Minimum spacing between two follow-camera updates.
pub const FOLLOW_THROTTLE: Duration = Duration::from_millis(600);

pub const DEFAULT_FOLLOW_ZOOM: f64 = 16.5;
pub const DEFAULT_FOLLOW_PITCH: f64 = 45.0;

/// Insets used when fitting the route; the bottom inset leaves room for the panel.
pub const OVERVIEW_INSETS: EdgeInsets = EdgeInsets {
    top: 80.0,
    left: 40.0,
    bottom: 240.0,
    right: 40.0,
};

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    #[default]
    Following,
    Overview,
}

impl FromStr for CameraMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "following" => Ok(CameraMode::Following),
            "overview" => Ok(CameraMode::Overview),
            other => Err(CoreError::warn()
                .domain(Domain::Config)
                .kind(ErrorKind::InvalidArgument)
                .msgf(format_args!(
                    "unknown camera mode {other:?} (expected following|overview)"
                ))
                .build()),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EdgeInsets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

/// Instruction for the map collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraCommand {
    Follow {
        center: Coordinate,
        bearing: Option<f64>,
        zoom: f64,
        pitch: f64,
    },
    Fit {
        bounds: BoundingBox,
        insets: EdgeInsets,
    },
}

/// Per-surface camera state.
#[derive(Debug, Clone)]
pub struct CameraController {
    mode: CameraMode,
    last_follow: Option<Instant>,
    last_location: Option<Coordinate>,
    // has_set_route_overview_camera
    overview_applied: bool,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(CameraMode::Following)
    }
}

impl CameraController {
    pub fn new(mode: CameraMode) -> Self {
        Self {
            mode,
            last_follow: None,
            last_location: None,
            overview_applied: false,
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CameraMode) {
        if self.mode != mode {
            // A fresh follow should not wait out the previous throttle window.
            self.last_follow = None;
        }
        self.mode = mode;
    }

    pub fn has_set_route_overview(&self) -> bool {
        self.overview_applied
    }

    /// Follow command for a location update, at most one per `FOLLOW_THROTTLE`.
    pub fn on_location(&mut self, update: &LocationUpdate, now: Instant) -> Option<CameraCommand> {
        let center = Coordinate::new(update.latitude, update.longitude).ok()?;
        self.last_location = Some(center);

        if self.mode != CameraMode::Following {
            return None;
        }
        if let Some(last) = self.last_follow {
            if now.saturating_duration_since(last) < FOLLOW_THROTTLE {
                return None;
            }
        }
        self.last_follow = Some(now);

        Some(self.follow_command(center, update.bearing))
    }

    /// Unthrottled recenter on the last known location.
    pub fn recenter(&mut self, now: Instant) -> Option<CameraCommand> {
        let center = self.last_location?;
        self.last_follow = Some(now);
        Some(self.follow_command(center, None))
    }

    /// Overview fit on route-ready; applies once per requested route.
    pub fn on_route_ready(&mut self, points: &[Coordinate]) -> Option<CameraCommand> {
        if self.overview_applied {
            return None;
        }
        let command = self.overview(points)?;
        self.overview_applied = true;
        Some(command)
    }

    /// Allow the next route-ready to fit again; called when a new route is requested.
    pub fn rearm_overview(&mut self) {
        self.overview_applied = false;
    }

    /// On-demand overview fit.
    pub fn overview(&self, points: &[Coordinate]) -> Option<CameraCommand> {
        let bounds = bounding_box(points.iter())?;
        Some(CameraCommand::Fit {
            bounds,
            insets: OVERVIEW_INSETS,
        })
    }

    /// Drop per-session state; the selected mode persists.
    pub fn reset(&mut self) {
        self.last_follow = None;
        self.last_location = None;
        self.overview_applied = false;
    }

    fn follow_command(&self, center: Coordinate, bearing: Option<f64>) -> CameraCommand {
        CameraCommand::Follow {
            center,
            bearing,
            zoom: DEFAULT_FOLLOW_ZOOM,
            pitch: DEFAULT_FOLLOW_PITCH,
        }
    }
}
