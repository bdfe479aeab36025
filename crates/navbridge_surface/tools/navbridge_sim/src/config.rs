use std::env;
use std::time::Duration;

use navbridge_core::config::{self, NavConfig};
use navbridge_core::geo::{RawCoordinate, RawWaypoint};

pub const ENV_TICK_MS: &str = "NAVBRIDGE_SIM_TICK_MS";

/// Alexanderplatz, Berlin. Reported as the device location when `--from` is absent.
pub const DEFAULT_DEVICE_LOCATION: (f64, f64) = (52.5219, 13.4132);
/// Brandenburger Tor, Berlin.
pub const DEFAULT_DESTINATION: (f64, f64) = (52.5163, 13.3777);
pub const DEFAULT_TICK: Duration = Duration::from_millis(200);
pub const DEFAULT_MAX_TICKS: u32 = 10_000;

/// Stands in for a real token; the mock engine never leaves the process.
pub const OFFLINE_ACCESS_TOKEN: &str = "pk.navbridge-sim-offline";

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub nav: NavConfig,
    pub origin: Option<RawCoordinate>,
    pub device_location: RawCoordinate,
    pub destination: RawWaypoint,
    pub waypoints: Vec<RawWaypoint>,
    pub alternatives: bool,
    pub tick: Duration,
    pub max_ticks: u32,
}

impl SimConfig {
    pub fn from_args() -> Self {
        Self::from_args_iter(env::args())
    }

    /// Shared navigation flags go through `NavConfig`; the simulator always replays.
    pub fn from_args_iter<I, S>(iter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = iter.into_iter().map(|a| a.as_ref().to_string()).collect();

        let mut nav = NavConfig::from_args_iter(&args);
        nav.simulate = true;
        if nav.access_token.is_none() {
            tracing::debug!("no access token configured; using the offline placeholder");
            nav.access_token = Some(OFFLINE_ACCESS_TOKEN.to_string());
        }

        let mut destination = DEFAULT_DESTINATION;
        let mut destination_name: Option<String> = None;
        let mut config = Self {
            nav,
            origin: None,
            device_location: RawCoordinate::new(DEFAULT_DEVICE_LOCATION.0, DEFAULT_DEVICE_LOCATION.1),
            destination: RawWaypoint::new(DEFAULT_DESTINATION.0, DEFAULT_DESTINATION.1),
            waypoints: Vec::new(),
            alternatives: false,
            tick: DEFAULT_TICK,
            max_ticks: DEFAULT_MAX_TICKS,
        };

        if let Some(ms) = env::var(ENV_TICK_MS).ok().and_then(|v| v.trim().parse().ok()) {
            config.tick = Duration::from_millis(ms);
        }

        let mut args = args.iter().map(String::as_str);
        let _ = args.next();
        while let Some(arg) = args.next() {
            match arg {
                "--from" => {
                    if let Some(point) = args.next().and_then(|v| parse_point("--from", v)) {
                        config.origin = Some(RawCoordinate::new(point.0, point.1));
                    }
                }
                "--to" => {
                    if let Some(point) = args.next().and_then(|v| parse_point("--to", v)) {
                        destination = point;
                    }
                }
                "--to-name" => destination_name = args.next().map(str::to_string),
                "--via" => {
                    if let Some(point) = args.next().and_then(|v| parse_point("--via", v)) {
                        config.waypoints.push(RawWaypoint::new(point.0, point.1));
                    }
                }
                "--device" => {
                    if let Some(point) = args.next().and_then(|v| parse_point("--device", v)) {
                        config.device_location = RawCoordinate::new(point.0, point.1);
                    }
                }
                "--alternatives" => config.alternatives = true,
                "--tick-ms" => {
                    if let Some(ms) = args.next().and_then(|v| parse_count::<u64>("--tick-ms", v)) {
                        config.tick = Duration::from_millis(ms);
                    }
                }
                "--max-ticks" => {
                    if let Some(n) = args.next().and_then(|v| parse_count("--max-ticks", v)) {
                        config.max_ticks = n;
                    }
                }
                _ if arg.starts_with("--from=") => {
                    if let Some(point) = parse_point("--from", &arg["--from=".len()..]) {
                        config.origin = Some(RawCoordinate::new(point.0, point.1));
                    }
                }
                _ if arg.starts_with("--to=") => {
                    if let Some(point) = parse_point("--to", &arg["--to=".len()..]) {
                        destination = point;
                    }
                }
                _ if arg.starts_with("--via=") => {
                    if let Some(point) = parse_point("--via", &arg["--via=".len()..]) {
                        config.waypoints.push(RawWaypoint::new(point.0, point.1));
                    }
                }
                _ if arg.starts_with("--tick-ms=") => {
                    if let Some(ms) = parse_count::<u64>("--tick-ms", &arg["--tick-ms=".len()..]) {
                        config.tick = Duration::from_millis(ms);
                    }
                }
                _ => {}
            }
        }

        config.destination = match destination_name {
            Some(name) => RawWaypoint::named(destination.0, destination.1, name),
            None => RawWaypoint::new(destination.0, destination.1),
        };
        config
    }
}

pub fn usage() -> String {
    format!(
        "navbridge_sim [--from lat,lng] [--to lat,lng] [--to-name name] [--via lat,lng]... \
         [--device lat,lng] [--alternatives] [--tick-ms n] [--max-ticks n] {}",
        config::usage()
    )
}

/// `"lat,lng"`. Range checks are left to the surface so bad input surfaces as
/// `INVALID_COORDINATES`.
pub fn parse_point(flag: &str, value: &str) -> Option<(f64, f64)> {
    let parsed = value.split_once(',').and_then(|(lat, lng)| {
        Some((lat.trim().parse().ok()?, lng.trim().parse().ok()?))
    });
    if parsed.is_none() {
        tracing::warn!(flag, value, "ignoring malformed point; expected lat,lng");
    }
    parsed
}

fn parse_count<T: std::str::FromStr>(flag: &str, value: &str) -> Option<T> {
    let parsed = value.trim().parse().ok();
    if parsed.is_none() {
        tracing::warn!(flag, value, "ignoring malformed number");
    }
    parsed
}
