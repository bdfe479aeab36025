use std::env;
use std::time::Duration;

use crate::camera::CameraMode;
use crate::error::{CoreError, Domain, ErrorKind, NavErrorCode, Result};
use crate::retry::RetryPolicy;
use crate::route::DistanceUnit;
use crate::voice::validate_language;

pub const ENV_ACCESS_TOKEN: &str = "MAPBOX_ACCESS_TOKEN";
pub const ENV_DOWNLOADS_TOKEN: &str = "MAPBOX_DOWNLOADS_TOKEN";
pub const ENV_LANGUAGE: &str = "NAVBRIDGE_LANGUAGE";
pub const ENV_DISTANCE_UNIT: &str = "NAVBRIDGE_DISTANCE_UNIT";
pub const ENV_SIMULATE: &str = "NAVBRIDGE_SIMULATE";
pub const ENV_STYLE_URI: &str = "NAVBRIDGE_STYLE_URI";
pub const ENV_CAMERA_MODE: &str = "NAVBRIDGE_CAMERA_MODE";
pub const ENV_SHEET: &str = "NAVBRIDGE_SHEET";
pub const ENV_SHEET_EXPANDED: &str = "NAVBRIDGE_SHEET_EXPANDED";

pub const DEFAULT_LANGUAGE: &str = "en";
pub const MIN_TOKEN_LEN: usize = 20;

/// How long full-screen mode waits for a device location when no origin is given.
pub const ORIGIN_RESOLUTION_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TokenKind {
    /// `pk.` runtime token used for directions and tiles.
    Public,
    /// `sk.` build-time token used to download the native SDK.
    Secret,
}

impl TokenKind {
    const fn prefix(self) -> &'static str {
        match self {
            TokenKind::Public => "pk.",
            TokenKind::Secret => "sk.",
        }
    }
}

/// Shape check only; the token is never sent anywhere from here.
pub fn validate_token(token: &str, kind: TokenKind) -> Result<()> {
    let token = token.trim();
    if token.is_empty() {
        return Err(CoreError::nav(
            Domain::Config,
            ErrorKind::InvalidArgument,
            NavErrorCode::MissingAccessToken,
        ));
    }

    if !token.starts_with(kind.prefix()) || token.len() < MIN_TOKEN_LEN {
        return Err(CoreError::warn()
            .domain(Domain::Config)
            .kind(ErrorKind::InvalidArgument)
            .msgf(format_args!(
                "access token must start with {:?} and be at least {MIN_TOKEN_LEN} characters",
                kind.prefix()
            ))
            .code(NavErrorCode::MapboxTokenInvalid)
            .build());
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavConfig {
    pub access_token: Option<String>,
    pub downloads_token: Option<String>,
    pub style_uri: Option<String>,
    pub language: String,
    pub distance_unit: DistanceUnit,
    pub camera_mode: CameraMode,
    pub simulate: bool,
    /// Show the guidance bottom sheet at all.
    pub sheet_enabled: bool,
    /// Present the sheet expanded instead of collapsed when guidance starts.
    pub sheet_expanded: bool,
    pub retry: RetryPolicy,
    pub origin_timeout: Duration,
    pub show_help: bool,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            downloads_token: None,
            style_uri: None,
            language: DEFAULT_LANGUAGE.to_string(),
            distance_unit: DistanceUnit::Metric,
            camera_mode: CameraMode::Following,
            simulate: false,
            sheet_enabled: true,
            sheet_expanded: false,
            retry: RetryPolicy::default(),
            origin_timeout: ORIGIN_RESOLUTION_TIMEOUT,
            show_help: false,
        }
    }
}

impl NavConfig {
    pub fn from_env() -> Self {
        Self::from_args_iter(["navbridge"])
    }

    pub fn from_args() -> Self {
        Self::from_args_iter(env::args())
    }

    /// Environment first, then CLI flags override. The first item is the program name.
    pub fn from_args_iter<I, S>(iter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self {
            access_token: env::var(ENV_ACCESS_TOKEN).ok(),
            downloads_token: env::var(ENV_DOWNLOADS_TOKEN).ok(),
            style_uri: env::var(ENV_STYLE_URI).ok(),
            ..Self::default()
        };
        if let Ok(value) = env::var(ENV_LANGUAGE) {
            config.apply_language(&value);
        }
        if let Ok(value) = env::var(ENV_DISTANCE_UNIT) {
            config.apply_unit(&value);
        }
        if let Ok(value) = env::var(ENV_CAMERA_MODE) {
            config.apply_camera(&value);
        }
        if let Some(simulate) = env::var(ENV_SIMULATE).ok().and_then(parse_bool) {
            config.simulate = simulate;
        }
        if let Some(enabled) = env::var(ENV_SHEET).ok().and_then(parse_bool) {
            config.sheet_enabled = enabled;
        }
        if let Some(expanded) = env::var(ENV_SHEET_EXPANDED).ok().and_then(parse_bool) {
            config.sheet_expanded = expanded;
        }

        let mut args = iter.into_iter();
        let _ = args.next();
        while let Some(arg) = args.next() {
            let arg = arg.as_ref();
            match arg {
                "-h" | "--help" => config.show_help = true,
                "--token" => {
                    if let Some(value) = args.next() {
                        config.access_token = Some(value.as_ref().to_string());
                    }
                }
                "--style" => {
                    if let Some(value) = args.next() {
                        config.style_uri = Some(value.as_ref().to_string());
                    }
                }
                "--language" => {
                    if let Some(value) = args.next() {
                        config.apply_language(value.as_ref());
                    }
                }
                "--unit" => {
                    if let Some(value) = args.next() {
                        config.apply_unit(value.as_ref());
                    }
                }
                "--camera" => {
                    if let Some(value) = args.next() {
                        config.apply_camera(value.as_ref());
                    }
                }
                "--simulate" => config.simulate = true,
                "--no-simulate" => config.simulate = false,
                "--no-sheet" => config.sheet_enabled = false,
                "--sheet-expanded" => config.sheet_expanded = true,
                _ if arg.starts_with("--token=") => {
                    config.access_token = Some(arg["--token=".len()..].to_string());
                }
                _ if arg.starts_with("--style=") => {
                    config.style_uri = Some(arg["--style=".len()..].to_string());
                }
                _ if arg.starts_with("--language=") => {
                    config.apply_language(&arg["--language=".len()..]);
                }
                _ if arg.starts_with("--unit=") => config.apply_unit(&arg["--unit=".len()..]),
                _ if arg.starts_with("--camera=") => {
                    config.apply_camera(&arg["--camera=".len()..]);
                }
                _ => {}
            }
        }

        config
    }

    /// The validated public token, or `MISSING_ACCESS_TOKEN`.
    pub fn require_access_token(&self) -> Result<&str> {
        let token = self.access_token.as_deref().unwrap_or("");
        validate_token(token, TokenKind::Public)?;
        Ok(token.trim())
    }

    fn apply_language(&mut self, value: &str) {
        match validate_language(value) {
            Ok(language) => self.language = language,
            Err(err) => tracing::warn!("ignoring language setting: {err}"),
        }
    }

    fn apply_unit(&mut self, value: &str) {
        match value.parse() {
            Ok(unit) => self.distance_unit = unit,
            Err(err) => tracing::warn!("ignoring distance unit setting: {err}"),
        }
    }

    fn apply_camera(&mut self, value: &str) {
        match value.parse() {
            Ok(mode) => self.camera_mode = mode,
            Err(err) => tracing::warn!("ignoring camera mode setting: {err}"),
        }
    }
}

pub fn usage() -> &'static str {
    "[--token pk.xxx] [--language en] [--unit metric|imperial] [--camera following|overview] [--style uri] [--simulate|--no-simulate] [--no-sheet] [--sheet-expanded]"
}

pub fn parse_bool(value: String) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
