//! Derivation of host-facing guidance snapshots from upstream ticks.
//!
//! Nothing here is persisted; every snapshot is recomputed per tick.

use serde::Serialize;

use crate::route::DistanceUnit;

/// Remaining distance (meters) at or below which the destination counts as reached.
pub const ARRIVAL_THRESHOLD_M: f64 = 5.0;

const METERS_PER_MILE: f64 = 1_609.344;
const FEET_PER_METER: f64 = 3.280_84;

/// Device (or replayed) location as reported by the guidance collaborator.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdate {
    pub latitude: f64,
    pub longitude: f64,
    pub bearing: Option<f64>,
    pub speed: Option<f64>,
    pub altitude: Option<f64>,
    pub accuracy: Option<f64>,
}

impl LocationUpdate {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            bearing: None,
            speed: None,
            altitude: None,
            accuracy: None,
        }
    }
}

/// Progress tick exactly as the guidance engine reports it (unclamped).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RawProgress {
    pub distance_traveled: f64,
    pub distance_remaining: f64,
    pub duration_remaining: f64,
    pub fraction_traveled: f64,
}

/// Normalized progress snapshot.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteProgress {
    pub distance_traveled: f64,
    pub distance_remaining: f64,
    pub duration_remaining: f64,
    pub fraction_traveled: f64,
}

impl RouteProgress {
    /// Normalize an upstream tick. `fraction_traveled` is always in `[0,1]`.
    pub fn from_upstream(raw: RawProgress) -> Self {
        Self {
            distance_traveled: non_negative(raw.distance_traveled),
            distance_remaining: non_negative(raw.distance_remaining),
            duration_remaining: non_negative(raw.duration_remaining),
            fraction_traveled: clamp_fraction(raw.fraction_traveled),
        }
    }
}

/// `max(0, min(v, 1))`; NaN maps to 0.
pub fn clamp_fraction(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() {
        v.max(0.0)
    } else {
        0.0
    }
}

/// Maneuver text as the guidance engine reports it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawBanner {
    pub primary_text: Option<String>,
    pub secondary_text: Option<String>,
    pub step_distance_remaining: f64,
}

/// Normalized banner instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerInstruction {
    pub primary_text: String,
    pub secondary_text: Option<String>,
    pub step_distance_remaining: f64,
}

impl BannerInstruction {
    /// `None` when the primary text is empty after trimming.
    pub fn from_upstream(raw: &RawBanner) -> Option<Self> {
        let primary_text = raw.primary_text.as_deref().map(str::trim).unwrap_or("");
        if primary_text.is_empty() {
            return None;
        }

        let secondary_text = raw
            .secondary_text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Some(Self {
            primary_text: primary_text.to_string(),
            secondary_text,
            step_distance_remaining: non_negative(raw.step_distance_remaining),
        })
    }
}

/// One-shot arrival latch (`has_emitted_arrival`).
#[derive(Debug, Default, Clone)]
pub struct ArrivalDetector {
    fired: bool,
}

impl ArrivalDetector {
    pub const fn new() -> Self {
        Self { fired: false }
    }

    /// True exactly once: on the first tick at or under the threshold.
    pub fn observe(&mut self, distance_remaining: f64) -> bool {
        if self.fired || distance_remaining.is_nan() || distance_remaining > ARRIVAL_THRESHOLD_M {
            return false;
        }
        self.fired = true;
        true
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn reset(&mut self) {
        self.fired = false;
    }
}

/// Short distance label for panel display ("850 m", "1.2 km", "500 ft", "3.4 mi").
pub fn format_distance(meters: f64, unit: DistanceUnit) -> String {
    let meters = non_negative(meters);
    match unit {
        DistanceUnit::Metric if meters < 1_000.0 => format!("{} m", round_to(meters, 10.0)),
        DistanceUnit::Metric => format!("{:.1} km", meters / 1_000.0),
        DistanceUnit::Imperial => {
            let miles = meters / METERS_PER_MILE;
            if miles < 0.1 {
                format!("{} ft", round_to(meters * FEET_PER_METER, 50.0))
            } else {
                format!("{miles:.1} mi")
            }
        }
    }
}

/// Remaining-time label ("45 s", "12 min", "1 h 05 min").
pub fn format_duration(seconds: f64) -> String {
    let total = non_negative(seconds).round() as u64;
    match total {
        0..=59 => format!("{total} s"),
        60..=3_599 => format!("{} min", (total + 30) / 60),
        _ => {
            let minutes = (total + 30) / 60;
            format!("{} h {:02} min", minutes / 60, minutes % 60)
        }
    }
}

fn round_to(v: f64, step: f64) -> u64 {
    ((v / step).round() * step) as u64
}
