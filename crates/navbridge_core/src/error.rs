use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Convenient result alias for navbridge_core.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Log/handling importance. Maps onto tracing levels in `logging::log_core_error`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// Where an error came from (helps triage and routing).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Domain {
    Lifecycle,
    Session,
    Geo,
    Routing,
    Guidance,
    Bridge,
    Config,
    Other,
}

/// Stable error "kind" for matching/branching.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidArgument,
    InvalidState,
    InvalidTransition,
    Conflict,
    PermissionDenied,
    NotSupported,
    Upstream,
    Canceled,
    Timeout,
    Other,
}

/// Machine-readable error codes surfaced to the host in `onError`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NavErrorCode {
    InvalidCoordinates,
    MissingAccessToken,
    NavigationSessionConflict,
    LocationPermissionRequired,
    NoRoute,
    RouteError,
    MapboxTokenInvalid,
    MapboxTokenForbidden,
    MapboxRateLimited,
    RouteFetchCanceled,
    NavigationInitFailed,
    NativeError,
}

impl NavErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            NavErrorCode::InvalidCoordinates => "INVALID_COORDINATES",
            NavErrorCode::MissingAccessToken => "MISSING_ACCESS_TOKEN",
            NavErrorCode::NavigationSessionConflict => "NAVIGATION_SESSION_CONFLICT",
            NavErrorCode::LocationPermissionRequired => "LOCATION_PERMISSION_REQUIRED",
            NavErrorCode::NoRoute => "NO_ROUTE",
            NavErrorCode::RouteError => "ROUTE_ERROR",
            NavErrorCode::MapboxTokenInvalid => "MAPBOX_TOKEN_INVALID",
            NavErrorCode::MapboxTokenForbidden => "MAPBOX_TOKEN_FORBIDDEN",
            NavErrorCode::MapboxRateLimited => "MAPBOX_RATE_LIMITED",
            NavErrorCode::RouteFetchCanceled => "ROUTE_FETCH_CANCELED",
            NavErrorCode::NavigationInitFailed => "NAVIGATION_INIT_FAILED",
            NavErrorCode::NativeError => "NATIVE_ERROR",
        }
    }

    /// Classify an upstream routing failure by sniffing its reason text.
    ///
    /// Unrecognized reasons fall back to `RouteError`; callers keep the raw text
    /// as the message.
    pub fn from_route_failure(reason: &str) -> Self {
        let lower = reason.to_ascii_lowercase();
        // "rate" must start a word so "generate" and "accurate" stay route errors.
        let rate_word = lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|t| t.starts_with("rate"));

        if lower.contains("401") || lower.contains("unauthorized") {
            NavErrorCode::MapboxTokenInvalid
        } else if lower.contains("403") || lower.contains("forbidden") {
            NavErrorCode::MapboxTokenForbidden
        } else if lower.contains("429") || rate_word {
            NavErrorCode::MapboxRateLimited
        } else {
            NavErrorCode::RouteError
        }
    }

    /// Human-readable default message, suitable for direct display.
    pub const fn user_message(self) -> &'static str {
        match self {
            NavErrorCode::InvalidCoordinates => "The provided coordinates are not valid.",
            NavErrorCode::MissingAccessToken => "A Mapbox access token is required.",
            NavErrorCode::NavigationSessionConflict => {
                "Another navigation session is already active. Stop it before starting a new one."
            }
            NavErrorCode::LocationPermissionRequired => {
                "Location permission is required to start navigation."
            }
            NavErrorCode::NoRoute => "No route was found for the selected points.",
            NavErrorCode::RouteError => "The route could not be fetched.",
            NavErrorCode::MapboxTokenInvalid => "The Mapbox access token is invalid.",
            NavErrorCode::MapboxTokenForbidden => {
                "The Mapbox access token is not allowed to make this request."
            }
            NavErrorCode::MapboxRateLimited => {
                "Too many navigation requests. Please try again shortly."
            }
            NavErrorCode::RouteFetchCanceled => "The route request was canceled.",
            NavErrorCode::NavigationInitFailed => "Navigation could not be started.",
            NavErrorCode::NativeError => "The navigation engine reported an error.",
        }
    }
}

impl fmt::Display for NavErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional structured payload for rich context without forcing allocation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Payload {
    None,

    /// Generic key/value context (usually no heap alloc if using &str).
    Context {
        key: &'static str,
        value: Cow<'static, str>,
    },

    /// Lifecycle-specific context.
    LifecycleTransition { from_state: u8, via_trigger: u8 },

    /// Host-facing error code.
    Nav(NavErrorCode),
}

/// The one error type that crosses module boundaries in navbridge.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("{severity:?}: {message}")]
pub struct CoreError {
    pub domain: Domain,
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: Cow<'static, str>,
    pub payload: Payload,
}

impl CoreError {
    // ---------------- Fluent entry points ----------------

    #[inline]
    pub fn info() -> ErrB {
        ErrB::new(Severity::Info)
    }
    #[inline]
    pub fn warn() -> ErrB {
        ErrB::new(Severity::Warn)
    }
    #[inline]
    pub fn error() -> ErrB {
        ErrB::new(Severity::Error)
    }

    /// Construct a lifecycle InvalidTransition error with structured context.
    pub fn invalid_transition_lifecycle(from_state: u8, via_trigger: u8) -> Self {
        CoreError::warn()
            .domain(Domain::Lifecycle)
            .kind(ErrorKind::InvalidTransition)
            .msg("invalid lifecycle transition")
            .payload(Payload::LifecycleTransition {
                from_state,
                via_trigger,
            })
            .build()
    }

    /// Construct an error carrying a host-facing code and its default message.
    pub fn nav(domain: Domain, kind: ErrorKind, code: NavErrorCode) -> Self {
        CoreError::error()
            .domain(domain)
            .kind(kind)
            .msg(code.user_message())
            .payload(Payload::Nav(code))
            .build()
    }

    /// Host-facing code for this error.
    ///
    /// Errors without an explicit `Payload::Nav` are reported as `NATIVE_ERROR`,
    /// except coordinate validation failures.
    pub fn code(&self) -> NavErrorCode {
        match self.payload {
            Payload::Nav(code) => code,
            _ if self.domain == Domain::Geo => NavErrorCode::InvalidCoordinates,
            _ => NavErrorCode::NativeError,
        }
    }
}

/// Fluent builder that behaves like iterator chains (takes self, returns Self).
/// Defaults:
/// - domain = Other
/// - kind = Other
/// - message = ""
/// - payload = None
#[derive(Debug, Clone)]
pub struct ErrB {
    domain: Domain,
    kind: ErrorKind,
    severity: Severity,
    message: Cow<'static, str>,
    payload: Payload,
}

impl ErrB {
    #[inline]
    fn new(severity: Severity) -> Self {
        Self {
            domain: Domain::Other,
            kind: ErrorKind::Other,
            severity,
            message: Cow::Borrowed(""),
            payload: Payload::None,
        }
    }

    // -------- Guided setters --------

    /// Set/override the domain (defaults to Domain::Other).
    #[inline]
    pub fn domain(mut self, d: Domain) -> Self {
        self.domain = d;
        self
    }

    /// Set/override the kind (defaults to ErrorKind::Other).
    #[inline]
    pub fn kind(mut self, k: ErrorKind) -> Self {
        self.kind = k;
        self
    }

    /// Set/override the message (defaults to "").
    #[inline]
    pub fn msg(mut self, m: impl Into<Cow<'static, str>>) -> Self {
        self.message = m.into();
        self
    }

    /// Formatting-friendly message setter.
    #[inline]
    pub fn msgf(mut self, args: fmt::Arguments<'_>) -> Self {
        self.message = Cow::Owned(args.to_string());
        self
    }

    /// Only one payload: this replaces any previous payload (default is None).
    #[inline]
    pub fn payload(mut self, p: Payload) -> Self {
        self.payload = p;
        self
    }

    /// Shorthand for `payload(Payload::Nav(code))`.
    #[inline]
    pub fn code(self, code: NavErrorCode) -> Self {
        self.payload(Payload::Nav(code))
    }

    // -------- Finish --------
    #[inline]
    pub fn build(self) -> CoreError {
        CoreError {
            domain: self.domain,
            kind: self.kind,
            severity: self.severity,
            message: self.message,
            payload: self.payload,
        }
    }
}

impl From<ErrB> for CoreError {
    fn from(b: ErrB) -> Self {
        b.build()
    }
}
