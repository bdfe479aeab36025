//! navbridge_surface
//!
//! Host-facing adapter layer built on top of `navbridge_core`.
//! Drives real navigation collaborators (routing, map, guidance, permissions)
//! through the core lifecycle, while keeping the semantics in `navbridge_core`.

// Collaborator capability traits.
pub mod engine;

// Log-and-ignore vs propagate, per collaborator call.
pub mod policy;

// Replayed location traces for simulated sessions.
pub mod simulation;

// The per-surface lifecycle driver.
pub mod surface;

// Single-owner tokio actor around a surface.
pub mod runtime;

// Full-screen entry point.
pub mod fullscreen;

// Scriptable collaborators for tests and tooling.
pub mod mock;

// Re-export core types that surface users will commonly need
pub use navbridge_core::error::{CoreError, NavErrorCode, Result};
pub use navbridge_core::lifecycle::{LifecycleState, Trigger};

pub use engine::{Collaborators, NavServices};
pub use fullscreen::{launch_full_screen, FullScreenRequest};
pub use runtime::{SurfaceHandle, SurfaceInput, SurfaceRuntime};
pub use surface::{NavigationSurface, StateTransition, SurfaceCommand, SurfaceMode, SurfaceSnapshot};
