//! navbridge_core: transport-agnostic coordination core for the navigation bridge.
//!
//! Design goals:
//! - Pure, testable logic (no SDK or host-binding deps).
//! - Explicit types; shared services are constructed and passed in, never global.
//! - Small, stable public API surface.

pub mod error;

/// Tracing helpers for `CoreError`.
pub mod logging;

/// Environment/CLI configuration and access token shape checks.
pub mod config;

/// Coordinate validation and waypoint parsing.
pub mod geo;

/// Route request/response types.
pub mod route;

/// Progress, banner and arrival derivation.
pub mod guidance;

/// Voice guidance parameters.
pub mod voice;

/// Camera policy (follow throttling, overview fitting).
pub mod camera;

/// Bottom sheet presentation state.
pub mod sheet;

/// Bounded retry policy for late engine initialization.
pub mod retry;

/// Host-facing event schema.
pub mod events;

/// Single-slot event relay to the host.
pub mod bridge;

/// Process-wide single-owner session gate.
pub mod session;

/// Navigation lifecycle state machine.
pub mod lifecycle;

pub use error::{CoreError, NavErrorCode, Result};
