//! Capability traits for the external navigation collaborators.
//!
//! Each trait is deliberately narrow so tests and tools can substitute
//! `mock::MockEngine` for the real SDK bindings.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use navbridge_core::bridge::EventBridge;
use navbridge_core::camera::CameraCommand;
use navbridge_core::geo::Coordinate;
use navbridge_core::guidance::{LocationUpdate, RawBanner, RawProgress};
use navbridge_core::route::{Route, RouteOutcome, RouteRequest, RouteTicket};
use navbridge_core::session::SessionRegistry;
use navbridge_core::voice::VoiceSettings;
use navbridge_core::Result;

use crate::simulation::ReplayFrame;

/// Boxed, sendable future used at async collaborator seams.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Completion of one route request. Resolves to `RouteOutcome::Canceled` when the
/// ticket is canceled upstream.
pub type PendingRoute = BoxFuture<RouteOutcome>;

/// Callback the guidance engine drives while observers are registered.
pub type ObserverSink = Arc<dyn Fn(GuidanceUpdate) + Send + Sync>;

/// Raw guidance callback shapes, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum GuidanceUpdate {
    Location(LocationUpdate),
    Progress(RawProgress),
    Banner(RawBanner),
}

/// Where the trip session takes its locations from.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationSource {
    Live,
    Replay(Vec<ReplayFrame>),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Unknown,
}

/// Directions engine.
pub trait RoutingEngine: Send {
    fn request_route(&mut self, ticket: RouteTicket, request: &RouteRequest) -> Result<PendingRoute>;

    fn cancel_route(&mut self, ticket: RouteTicket) -> Result<()>;
}

/// Map renderer (route lines and camera).
pub trait MapRenderer: Send {
    fn render_route(&mut self, routes: &[Route]) -> Result<()>;

    fn clear_route(&mut self) -> Result<()>;

    fn set_camera(&mut self, command: &CameraCommand) -> Result<()>;
}

/// Turn-by-turn guidance engine (trip session, observers, voice).
pub trait GuidanceEngine: Send {
    /// False until the native SDK finishes its late initialization.
    fn is_initialized(&self) -> bool;

    fn register_observers(&mut self, sink: ObserverSink) -> Result<()>;

    fn unregister_observers(&mut self) -> Result<()>;

    fn start_trip_session(&mut self, route: &Route, source: LocationSource) -> Result<()>;

    fn stop_trip_session(&mut self) -> Result<()>;

    fn set_voice(&mut self, voice: &VoiceSettings) -> Result<()>;
}

/// Location permission state.
pub trait PermissionSource: Send {
    fn status(&self) -> PermissionStatus;

    /// Prompt the user. The answer arrives later as a `PermissionChanged` command.
    fn request(&mut self) -> Result<()>;
}

/// One-shot device location lookup.
pub trait LocationProvider: Send + Sync {
    fn current_location(&self) -> BoxFuture<Result<Coordinate>>;
}

/// The collaborators one surface drives. Each surface owns its own set.
pub struct Collaborators {
    pub routing: Box<dyn RoutingEngine>,
    pub map: Box<dyn MapRenderer>,
    pub guidance: Box<dyn GuidanceEngine>,
    pub permission: Box<dyn PermissionSource>,
    pub location: Arc<dyn LocationProvider>,
}

/// Process-wide services shared by every surface.
#[derive(Debug, Clone, Default)]
pub struct NavServices {
    pub bridge: Arc<EventBridge>,
    pub registry: Arc<SessionRegistry>,
}

impl NavServices {
    pub fn new() -> Self {
        Self::default()
    }
}
