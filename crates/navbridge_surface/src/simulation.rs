//! Replayed location traces for simulated guidance.
//!
//! A trace walks the route geometry at a constant speed, one frame per tick.
//! When no trace can be built the surface falls back to live tracking.

use std::time::Duration;

use navbridge_core::error::{CoreError, Domain, ErrorKind};
use navbridge_core::guidance::{LocationUpdate, RawBanner, RawProgress};
use navbridge_core::route::Route;
use navbridge_core::Result;

/// Simulated travel speed (about 50 km/h).
pub const REPLAY_SPEED_MPS: f64 = 13.9;
/// Wall-clock spacing between replayed frames.
pub const REPLAY_TICK: Duration = Duration::from_secs(1);

/// One replayed guidance tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayFrame {
    pub location: LocationUpdate,
    pub progress: RawProgress,
    /// Set on the first frame of each geometry segment.
    pub banner: Option<RawBanner>,
}

pub fn build_replay_trace(route: &Route) -> Result<Vec<ReplayFrame>> {
    build_replay_trace_with_step(route, REPLAY_SPEED_MPS * REPLAY_TICK.as_secs_f64())
}

/// Trace with frames `step_m` meters apart. The last frame sits on the final point.
pub fn build_replay_trace_with_step(route: &Route, step_m: f64) -> Result<Vec<ReplayFrame>> {
    if route.geometry.len() < 2 {
        return Err(trace_error("route geometry needs at least two points"));
    }
    if !(step_m.is_finite() && step_m > 0.0) {
        return Err(trace_error("replay step must be a positive distance"));
    }

    let segments: Vec<f64> = route
        .geometry
        .windows(2)
        .map(|pair| pair[0].distance_to(&pair[1]))
        .collect();
    let total: f64 = segments.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(trace_error("route geometry has zero length"));
    }

    let duration = if route.duration_s.is_finite() && route.duration_s > 0.0 {
        route.duration_s
    } else {
        total / REPLAY_SPEED_MPS
    };
    let speed = step_m / REPLAY_TICK.as_secs_f64();

    let mut frames = Vec::new();
    let mut traveled = 0.0_f64;
    let mut segment = 0;
    let mut segment_start = 0.0_f64;
    let mut announced: Option<usize> = None;

    loop {
        while segment + 1 < segments.len() && traveled >= segment_start + segments[segment] {
            segment_start += segments[segment];
            segment += 1;
        }

        let from = route.geometry[segment];
        let to = route.geometry[segment + 1];
        let segment_len = segments[segment];
        let t = if segment_len > 0.0 {
            (traveled - segment_start) / segment_len
        } else {
            1.0
        };
        let position = from.lerp(&to, t);
        let remaining = (total - traveled).max(0.0);

        let mut location = LocationUpdate::at(position.latitude(), position.longitude());
        location.bearing = Some(from.bearing_to(&to));
        location.speed = Some(speed);

        let banner = if announced != Some(segment) {
            announced = Some(segment);
            let last = segment + 1 == segments.len();
            Some(segment_banner(last, segment_start + segment_len - traveled))
        } else {
            None
        };

        frames.push(ReplayFrame {
            location,
            progress: RawProgress {
                distance_traveled: traveled,
                distance_remaining: remaining,
                duration_remaining: duration * remaining / total,
                fraction_traveled: traveled / total,
            },
            banner,
        });

        if traveled >= total {
            break;
        }
        traveled = (traveled + step_m).min(total);
    }

    Ok(frames)
}

fn segment_banner(last: bool, step_distance_remaining: f64) -> RawBanner {
    let primary = if last {
        "Arrive at your destination"
    } else {
        "Continue straight"
    };
    RawBanner {
        primary_text: Some(primary.to_string()),
        secondary_text: None,
        step_distance_remaining,
    }
}

fn trace_error(message: &'static str) -> CoreError {
    CoreError::info()
        .domain(Domain::Guidance)
        .kind(ErrorKind::InvalidArgument)
        .msg(message)
        .build()
}
