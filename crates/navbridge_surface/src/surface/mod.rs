//! navbridge_surface::surface
//!
//! `NavigationSurface` applies the core lifecycle table to real collaborators.
//!
//! Responsibilities:
//! - Hold the current lifecycle state and the route inputs
//! - Claim and release the shared session slot
//! - Translate collaborator callbacks into normalized host events
//! - Publish every applied transition on a broadcast stream
//!
//! The surface is synchronous and has exactly one owner. Work that must wait
//! (route responses, init retries, origin lookups) is queued as `Deferred` and
//! driven by `runtime::SurfaceRuntime`, which posts results back in.

mod command;
mod events;
mod upstream;

pub use command::SurfaceCommand;
pub use events::StateTransition;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use navbridge_core::camera::{CameraController, CameraMode};
use navbridge_core::config::NavConfig;
use navbridge_core::error::{CoreError, Domain, ErrorKind, NavErrorCode};
use navbridge_core::events::NavEvent;
use navbridge_core::geo::{Coordinate, Waypoint};
use navbridge_core::guidance::ArrivalDetector;
use navbridge_core::lifecycle::{next_state, LifecycleState, Trigger};
use navbridge_core::logging::log_core_error;
use navbridge_core::retry::RetryPolicy;
use navbridge_core::route::{DistanceUnit, Route, RouteKey, RouteRequest, RouteTicket};
use navbridge_core::session::session_conflict;
use navbridge_core::sheet::{BottomSheetController, SheetState};
use navbridge_core::voice::VoiceSettings;
use navbridge_core::Result;

use crate::engine::{
    BoxFuture, Collaborators, GuidanceUpdate, LocationSource, NavServices, ObserverSink,
    PendingRoute,
};
use crate::policy::{settle, BoundaryOp};
use crate::simulation::build_replay_trace;

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

/// Which host UI a surface backs.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceMode {
    /// Embedded view: the host must supply an origin.
    Embedded,
    /// Full-screen activity: a missing origin is resolved from the device location.
    FullScreen,
}

/// Work the surface cannot finish synchronously.
pub enum Deferred {
    /// Await a route response and post it back as `on_route_response`.
    AwaitRoute {
        ticket: RouteTicket,
        pending: PendingRoute,
    },
    /// Probe engine initialization again after `delay`.
    RetryObservers {
        generation: u64,
        attempt: u32,
        delay: Duration,
    },
    /// Resolve the device location, bounded by `timeout`.
    ResolveOrigin {
        generation: u64,
        timeout: Duration,
        lookup: BoxFuture<Result<Coordinate>>,
    },
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deferred::AwaitRoute { ticket, .. } => {
                f.debug_struct("AwaitRoute").field("ticket", ticket).finish()
            }
            Deferred::RetryObservers {
                generation,
                attempt,
                delay,
            } => f
                .debug_struct("RetryObservers")
                .field("generation", generation)
                .field("attempt", attempt)
                .field("delay", delay)
                .finish(),
            Deferred::ResolveOrigin {
                generation,
                timeout,
                ..
            } => f
                .debug_struct("ResolveOrigin")
                .field("generation", generation)
                .field("timeout", timeout)
                .finish(),
        }
    }
}

/// Point-in-time view of a surface, for queries and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSnapshot {
    pub owner_id: String,
    pub state: LifecycleState,
    pub enabled: bool,
    pub holds_session: bool,
    pub in_flight: Option<RouteTicket>,
    pub route_count: usize,
    pub has_requested_route: bool,
    pub has_emitted_arrival: bool,
    pub has_set_route_overview: bool,
    pub observers_registered: bool,
    pub trip_active: bool,
    pub guidance_requested: bool,
    pub sheet: SheetState,
    pub camera_mode: CameraMode,
    pub voice: VoiceSettings,
    pub distance_unit: DistanceUnit,
    pub simulate: bool,
}

pub struct NavigationSurface {
    owner_id: String,
    mode: SurfaceMode,
    state: LifecycleState,
    enabled: bool,

    collaborators: Collaborators,
    services: NavServices,

    origin: Option<Coordinate>,
    resolved_origin: Option<Coordinate>,
    destination: Option<Waypoint>,
    waypoints: Vec<Waypoint>,
    alternatives: bool,
    distance_unit: DistanceUnit,
    simulate: bool,

    voice: VoiceSettings,
    camera: CameraController,
    sheet: BottomSheetController,
    arrival: ArrivalDetector,
    retry: RetryPolicy,
    origin_timeout: Duration,

    routes: Vec<Route>,
    last_ticket: RouteTicket,
    in_flight: Option<RouteTicket>,
    has_requested_route: Option<RouteKey>,
    guidance_requested: bool,
    observers_registered: bool,
    trip_active: bool,
    origin_lookup_pending: bool,
    // Bumped on cleanup and on each guidance start; stale deferred work is dropped.
    generation: u64,

    observer_sink: Option<ObserverSink>,
    deferred: Vec<Deferred>,

    // broadcast so a slow subscriber never stalls the surface.
    transitions: broadcast::Sender<StateTransition>,
}

/// Construction and introspection.
impl NavigationSurface {
    /// Create a surface in `Idle` with an owner id unique to this process.
    pub fn new(mode: SurfaceMode, collaborators: Collaborators, services: NavServices) -> Self {
        let id = NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed);
        let owner_id = match mode {
            SurfaceMode::FullScreen => format!("fullscreen-{id}"),
            SurfaceMode::Embedded => format!("embedded-{id}"),
        };
        let (transitions, _rx) = broadcast::channel(64);

        Self {
            owner_id,
            mode,
            state: LifecycleState::Idle,
            enabled: false,
            collaborators,
            services,
            origin: None,
            resolved_origin: None,
            destination: None,
            waypoints: Vec::new(),
            alternatives: false,
            distance_unit: DistanceUnit::default(),
            simulate: false,
            voice: VoiceSettings::default(),
            camera: CameraController::default(),
            sheet: BottomSheetController::default(),
            arrival: ArrivalDetector::new(),
            retry: RetryPolicy::default(),
            origin_timeout: navbridge_core::config::ORIGIN_RESOLUTION_TIMEOUT,
            routes: Vec::new(),
            last_ticket: RouteTicket(0),
            in_flight: None,
            has_requested_route: None,
            guidance_requested: false,
            observers_registered: false,
            trip_active: false,
            origin_lookup_pending: false,
            generation: 0,
            observer_sink: None,
            deferred: Vec::new(),
            transitions,
        }
    }

    /// Apply process-wide settings from `NavConfig`.
    pub fn configure(&mut self, config: &NavConfig) {
        if let Err(err) = self.voice.set_language(&config.language) {
            log_core_error(&err);
        }
        self.distance_unit = config.distance_unit;
        self.sheet.set_unit(config.distance_unit);
        self.sheet.set_enabled(config.sheet_enabled);
        self.sheet.set_initially_expanded(config.sheet_expanded);
        self.camera.set_mode(config.camera_mode);
        self.simulate = config.simulate;
        self.retry = config.retry;
        self.origin_timeout = config.origin_timeout;
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn mode(&self) -> SurfaceMode {
        self.mode
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn services(&self) -> &NavServices {
        &self.services
    }

    pub fn subscribe_transitions(&self) -> broadcast::Receiver<StateTransition> {
        self.transitions.subscribe()
    }

    pub(crate) fn transition_sender(&self) -> broadcast::Sender<StateTransition> {
        self.transitions.clone()
    }

    /// Route guidance callbacks into `sink` once observers are registered.
    pub fn set_observer_sink(&mut self, sink: ObserverSink) {
        self.observer_sink = Some(sink);
    }

    /// Drain queued work for the runtime.
    pub fn take_deferred(&mut self) -> Vec<Deferred> {
        std::mem::take(&mut self.deferred)
    }

    pub fn snapshot(&self) -> SurfaceSnapshot {
        SurfaceSnapshot {
            owner_id: self.owner_id.clone(),
            state: self.state,
            enabled: self.enabled,
            holds_session: self.services.registry.is_held_by(&self.owner_id),
            in_flight: self.in_flight,
            route_count: self.routes.len(),
            has_requested_route: self.has_requested_route.is_some(),
            has_emitted_arrival: self.arrival.has_fired(),
            has_set_route_overview: self.camera.has_set_route_overview(),
            observers_registered: self.observers_registered,
            trip_active: self.trip_active,
            guidance_requested: self.guidance_requested,
            sheet: self.sheet.state(),
            camera_mode: self.camera.mode(),
            voice: self.voice.clone(),
            distance_unit: self.distance_unit,
            simulate: self.simulate,
        }
    }
}

/// Internal lifecycle plumbing shared by command and upstream handlers.
impl NavigationSurface {
    fn emit(&self, event: NavEvent) {
        self.services.bridge.emit_event(&event);
    }

    fn transition(&mut self, via: Trigger) -> Result<LifecycleState> {
        let from = self.state;
        let to = next_state(from, via)?;
        self.state = to;

        tracing::debug!(
            owner = %self.owner_id,
            from = from.label(),
            trigger = via.label(),
            to = to.label(),
            "lifecycle transition"
        );

        // No receivers is fine.
        let _ = self.transitions.send(StateTransition {
            from,
            trigger: via,
            to,
        });
        self.emit(NavEvent::StateChange {
            from: from.label(),
            to: to.label(),
        });

        Ok(to)
    }

    /// Clean up, enter `Errored` via `via`, and tell the host.
    fn fail(&mut self, via: Trigger, code: NavErrorCode, message: impl Into<String>) {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = code.user_message().to_string();
        }

        self.cleanup();
        if let Err(err) = self.transition(via) {
            log_core_error(&err);
        }

        tracing::warn!(owner = %self.owner_id, %code, "{message}");
        self.emit(NavEvent::Error { code, message });
    }

    fn fail_with(&mut self, via: Trigger, err: CoreError) {
        log_core_error(&err);
        let code = err.code();
        self.fail(via, code, err.message.into_owned());
    }

    /// Ordered teardown: observers, in-flight ticket, session slot, latches.
    fn cleanup(&mut self) {
        if self.observers_registered {
            best_effort(
                BoundaryOp::UnregisterObservers,
                self.collaborators.guidance.unregister_observers(),
            );
            self.observers_registered = false;
        }
        if self.trip_active {
            best_effort(
                BoundaryOp::StopTripSession,
                self.collaborators.guidance.stop_trip_session(),
            );
            self.trip_active = false;
        }

        if let Some(ticket) = self.in_flight.take() {
            tracing::debug!(%ticket, "dropping in-flight route request");
            best_effort(
                BoundaryOp::CancelRoute,
                self.collaborators.routing.cancel_route(ticket),
            );
        }

        if self.services.registry.release(&self.owner_id) {
            tracing::debug!(owner = %self.owner_id, "navigation session released");
        }

        self.has_requested_route = None;
        self.arrival.reset();
        self.camera.reset();

        self.sheet.hide();
        self.sheet.clear_content();
        if !self.routes.is_empty() {
            self.routes.clear();
            best_effort(BoundaryOp::ClearRoute, self.collaborators.map.clear_route());
        }
        self.guidance_requested = false;
        self.origin_lookup_pending = false;
        self.resolved_origin = None;
        self.generation += 1;
    }

    fn effective_origin(&self) -> Option<Coordinate> {
        self.origin.or(self.resolved_origin)
    }

    fn build_request(&self) -> Option<RouteRequest> {
        Some(RouteRequest {
            origin: self.effective_origin()?,
            waypoints: self.waypoints.clone(),
            destination: self.destination.clone()?,
            alternatives: self.alternatives,
            language: self.voice.language().to_string(),
            distance_unit: self.distance_unit,
        })
    }

    /// Re-evaluate the route inputs after any change.
    fn refresh_route(&mut self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        match self.state {
            LifecycleState::Idle => self.activate(),
            LifecycleState::AwaitingRouteInputs => match self.build_request() {
                Some(request) => self.begin_route_request(Trigger::RouteInputsReady, request),
                None => {
                    self.resolve_origin_if_needed();
                    Ok(())
                }
            },
            state if state.holds_session() => {
                let Some(request) = self.build_request() else {
                    return Ok(());
                };
                if self.has_requested_route.as_ref() == Some(&request.key()) {
                    tracing::trace!(owner = %self.owner_id, "route inputs unchanged; not re-requesting");
                    return Ok(());
                }
                if state.is_guiding() {
                    self.guidance_requested = true;
                }
                self.begin_route_request(Trigger::InputsChanged, request)
            }
            _ => Ok(()),
        }
    }

    fn begin_route_request(&mut self, via: Trigger, request: RouteRequest) -> Result<()> {
        // Reject before any side effect.
        next_state(self.state, via)?;

        if !self.services.registry.acquire(&self.owner_id) {
            let err = session_conflict(&self.owner_id);
            self.fail(Trigger::SessionConflict, err.code(), err.message.into_owned());
            return Ok(());
        }

        if let Some(stale) = self.in_flight.take() {
            best_effort(
                BoundaryOp::CancelRoute,
                self.collaborators.routing.cancel_route(stale),
            );
        }
        if self.trip_active {
            best_effort(
                BoundaryOp::StopTripSession,
                self.collaborators.guidance.stop_trip_session(),
            );
            self.trip_active = false;
        }

        self.transition(via)?;
        self.camera.rearm_overview();

        let ticket = self.last_ticket.next();
        self.last_ticket = ticket;
        self.in_flight = Some(ticket);
        self.has_requested_route = Some(request.key());

        tracing::info!(
            owner = %self.owner_id,
            %ticket,
            stops = request.stops().len(),
            "requesting route"
        );

        let result = self.collaborators.routing.request_route(ticket, &request);
        match settle(BoundaryOp::RequestRoute, result) {
            Ok(Some(pending)) => self.deferred.push(Deferred::AwaitRoute { ticket, pending }),
            Ok(None) => {}
            Err(err) => {
                log_core_error(&err);
                let code = match err.code() {
                    NavErrorCode::NativeError => NavErrorCode::RouteError,
                    code => code,
                };
                self.fail(Trigger::RouteFailed, code, err.message.into_owned());
            }
        }
        Ok(())
    }

    fn resolve_origin_if_needed(&mut self) {
        if self.mode != SurfaceMode::FullScreen
            || self.origin_lookup_pending
            || self.destination.is_none()
            || self.effective_origin().is_some()
        {
            return;
        }

        tracing::debug!(timeout = ?self.origin_timeout, "resolving origin from device location");
        self.origin_lookup_pending = true;
        let lookup = self.collaborators.location.current_location();
        self.deferred.push(Deferred::ResolveOrigin {
            generation: self.generation,
            timeout: self.origin_timeout,
            lookup,
        });
    }

    fn begin_guidance(&mut self) -> Result<()> {
        if self.routes.is_empty() {
            return Err(CoreError::warn()
                .domain(Domain::Guidance)
                .kind(ErrorKind::InvalidState)
                .msg("no route available to guide along")
                .build());
        }

        self.transition(Trigger::StartGuidance)?;
        self.guidance_requested = false;
        self.generation += 1;

        self.sheet.present();
        best_effort(BoundaryOp::SetVoice, self.collaborators.guidance.set_voice(&self.voice));
        self.attach_guidance(1);
        Ok(())
    }

    /// Register observers and start the trip, or schedule another readiness check while
    /// the engine is still initializing. Gives up silently after the retry budget.
    fn attach_guidance(&mut self, attempt: u32) {
        if !self.collaborators.guidance.is_initialized() {
            match self.retry.delay_after(attempt) {
                Some(delay) => {
                    tracing::debug!(attempt, ?delay, "guidance engine not initialized; retrying");
                    self.deferred.push(Deferred::RetryObservers {
                        generation: self.generation,
                        attempt: attempt + 1,
                        delay,
                    });
                }
                None => tracing::warn!(
                    attempts = attempt,
                    "guidance engine never initialized; giving up on observers"
                ),
            }
            return;
        }

        if let Err(err) = self.start_trip() {
            log_core_error(&err);
            self.fail(
                Trigger::Fault,
                NavErrorCode::NavigationInitFailed,
                err.message.into_owned(),
            );
        }
    }

    fn start_trip(&mut self) -> Result<()> {
        if !self.observers_registered {
            let sink: ObserverSink = match &self.observer_sink {
                Some(sink) => Arc::clone(sink),
                None => Arc::new(|_update: GuidanceUpdate| {}),
            };
            settle(
                BoundaryOp::RegisterObservers,
                self.collaborators.guidance.register_observers(sink),
            )?;
            self.observers_registered = true;
        }

        let Some(route) = self.routes.first() else {
            return Ok(());
        };
        let source = self.location_source(route);
        settle(
            BoundaryOp::StartTripSession,
            self.collaborators.guidance.start_trip_session(route, source),
        )?;
        self.trip_active = true;
        tracing::info!(owner = %self.owner_id, simulate = self.simulate, "trip session started");
        Ok(())
    }

    fn location_source(&self, route: &Route) -> LocationSource {
        if !self.simulate {
            return LocationSource::Live;
        }
        match build_replay_trace(route) {
            Ok(frames) => LocationSource::Replay(frames),
            Err(err) => {
                tracing::warn!("replay trace unavailable, using live tracking: {err}");
                LocationSource::Live
            }
        }
    }
}

fn best_effort(op: BoundaryOp, result: Result<()>) {
    if let Err(err) = settle(op, result) {
        log_core_error(&err);
    }
}
