//! In-process stand-in for the native navigation SDK.
//!
//! One `MockEngine` implements every collaborator trait; clones share state so a
//! test (or the simulator) can script outcomes and inspect the calls a surface made.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use navbridge_core::camera::CameraCommand;
use navbridge_core::error::{CoreError, Domain, ErrorKind};
use navbridge_core::geo::Coordinate;
use navbridge_core::route::{Route, RouteOutcome, RouteRequest, RouteTicket};
use navbridge_core::voice::VoiceSettings;
use navbridge_core::Result;

use crate::engine::{
    BoxFuture, Collaborators, GuidanceEngine, GuidanceUpdate, LocationProvider, LocationSource,
    MapRenderer, ObserverSink, PendingRoute, PermissionSource, PermissionStatus, RoutingEngine,
};
use crate::policy::BoundaryOp;
use crate::simulation::{ReplayFrame, REPLAY_SPEED_MPS};

/// A recorded collaborator call.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    RequestRoute { ticket: RouteTicket, stops: usize },
    CancelRoute(RouteTicket),
    RenderRoute { routes: usize },
    ClearRoute,
    SetCamera(CameraCommand),
    RegisterObservers,
    UnregisterObservers,
    StartTripSession { simulated: bool },
    StopTripSession,
    SetVoice(VoiceSettings),
    RequestPermission,
}

struct MockState {
    calls: Vec<MockCall>,
    scripted_routes: VecDeque<RouteOutcome>,
    route_delay: Duration,
    init_after: u32,
    init_checks: u32,
    permission: PermissionStatus,
    location: Option<Coordinate>,
    failing: Vec<BoundaryOp>,
    sink: Option<ObserverSink>,
    replay: VecDeque<ReplayFrame>,
}

#[derive(Clone)]
pub struct MockEngine {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("MockEngine")
            .field("calls", &state.calls.len())
            .field("permission", &state.permission)
            .finish()
    }
}

/// Scripting and inspection.
impl MockEngine {
    /// Initialized, permission granted, routes computed as straight lines.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                calls: Vec::new(),
                scripted_routes: VecDeque::new(),
                route_delay: Duration::ZERO,
                init_after: 0,
                init_checks: 0,
                permission: PermissionStatus::Granted,
                location: None,
                failing: Vec::new(),
                sink: None,
                replay: VecDeque::new(),
            })),
        }
    }

    /// Report "not initialized" for the first `checks` initialization checks.
    pub fn with_init_after(self, checks: u32) -> Self {
        self.lock().init_after = checks;
        self
    }

    pub fn with_permission(self, permission: PermissionStatus) -> Self {
        self.lock().permission = permission;
        self
    }

    /// Device location; without one, lookups never resolve.
    pub fn with_location(self, location: Coordinate) -> Self {
        self.lock().location = Some(location);
        self
    }

    pub fn with_route_delay(self, delay: Duration) -> Self {
        self.lock().route_delay = delay;
        self
    }

    /// Queue the outcome of the next unscripted route request.
    pub fn script_route(&self, outcome: RouteOutcome) {
        self.lock().scripted_routes.push_back(outcome);
    }

    /// Make `op` return an upstream error from now on.
    pub fn fail_on(&self, op: BoundaryOp) {
        self.lock().failing.push(op);
    }

    pub fn set_permission(&self, permission: PermissionStatus) {
        self.lock().permission = permission;
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn count(&self, matches: impl Fn(&MockCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|call| matches(call)).count()
    }

    pub fn init_checks(&self) -> u32 {
        self.lock().init_checks
    }

    pub fn has_observers(&self) -> bool {
        self.lock().sink.is_some()
    }

    /// Deliver a guidance callback to the registered observers, if any.
    pub fn push(&self, update: GuidanceUpdate) -> bool {
        // Clone out of the lock so the sink may call back into the engine.
        let sink = self.lock().sink.clone();
        match sink {
            Some(sink) => {
                sink(update);
                true
            }
            None => false,
        }
    }

    /// Play the next replayed frame. False once the trace is exhausted.
    pub fn replay_next(&self) -> bool {
        let Some(frame) = self.lock().replay.pop_front() else {
            return false;
        };
        self.push(GuidanceUpdate::Location(frame.location));
        if let Some(banner) = frame.banner {
            self.push(GuidanceUpdate::Banner(banner));
        }
        self.push(GuidanceUpdate::Progress(frame.progress));
        true
    }

    pub fn remaining_replay_frames(&self) -> usize {
        self.lock().replay.len()
    }

    /// Boxed collaborators sharing this engine's state.
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            routing: Box::new(self.clone()),
            map: Box::new(self.clone()),
            guidance: Box::new(self.clone()),
            permission: Box::new(self.clone()),
            location: Arc::new(self.clone()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, op: BoundaryOp, call: MockCall) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(call);
        if state.failing.contains(&op) {
            return Err(CoreError::error()
                .domain(Domain::Other)
                .kind(ErrorKind::Upstream)
                .msgf(format_args!("mock failure in {op:?}"))
                .build());
        }
        Ok(())
    }
}

impl RoutingEngine for MockEngine {
    fn request_route(&mut self, ticket: RouteTicket, request: &RouteRequest) -> Result<PendingRoute> {
        let stops = request.stops();
        self.record(
            BoundaryOp::RequestRoute,
            MockCall::RequestRoute {
                ticket,
                stops: stops.len(),
            },
        )?;

        let (outcome, delay) = {
            let mut state = self.lock();
            let outcome = state
                .scripted_routes
                .pop_front()
                .unwrap_or_else(|| RouteOutcome::Routes(vec![straight_route(&stops)]));
            (outcome, state.route_delay)
        };

        Ok(Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            outcome
        }))
    }

    fn cancel_route(&mut self, ticket: RouteTicket) -> Result<()> {
        self.record(BoundaryOp::CancelRoute, MockCall::CancelRoute(ticket))
    }
}

impl MapRenderer for MockEngine {
    fn render_route(&mut self, routes: &[Route]) -> Result<()> {
        self.record(
            BoundaryOp::RenderRoute,
            MockCall::RenderRoute {
                routes: routes.len(),
            },
        )
    }

    fn clear_route(&mut self) -> Result<()> {
        self.record(BoundaryOp::ClearRoute, MockCall::ClearRoute)
    }

    fn set_camera(&mut self, command: &CameraCommand) -> Result<()> {
        self.record(BoundaryOp::SetCamera, MockCall::SetCamera(command.clone()))
    }
}

impl GuidanceEngine for MockEngine {
    fn is_initialized(&self) -> bool {
        let mut state = self.lock();
        state.init_checks += 1;
        state.init_checks > state.init_after
    }

    fn register_observers(&mut self, sink: ObserverSink) -> Result<()> {
        self.record(BoundaryOp::RegisterObservers, MockCall::RegisterObservers)?;
        self.lock().sink = Some(sink);
        Ok(())
    }

    fn unregister_observers(&mut self) -> Result<()> {
        self.lock().sink = None;
        self.record(BoundaryOp::UnregisterObservers, MockCall::UnregisterObservers)
    }

    fn start_trip_session(&mut self, _route: &Route, source: LocationSource) -> Result<()> {
        let simulated = matches!(source, LocationSource::Replay(_));
        self.record(
            BoundaryOp::StartTripSession,
            MockCall::StartTripSession { simulated },
        )?;
        if let LocationSource::Replay(frames) = source {
            self.lock().replay = frames.into();
        }
        Ok(())
    }

    fn stop_trip_session(&mut self) -> Result<()> {
        self.lock().replay.clear();
        self.record(BoundaryOp::StopTripSession, MockCall::StopTripSession)
    }

    fn set_voice(&mut self, voice: &VoiceSettings) -> Result<()> {
        self.record(BoundaryOp::SetVoice, MockCall::SetVoice(voice.clone()))
    }
}

impl PermissionSource for MockEngine {
    fn status(&self) -> PermissionStatus {
        self.lock().permission
    }

    fn request(&mut self) -> Result<()> {
        self.record(BoundaryOp::RequestPermission, MockCall::RequestPermission)
    }
}

impl LocationProvider for MockEngine {
    fn current_location(&self) -> BoxFuture<Result<Coordinate>> {
        match self.lock().location {
            Some(location) => Box::pin(async move { Ok(location) }),
            None => Box::pin(std::future::pending()),
        }
    }
}

/// Route that runs straight through `stops`, timed at the replay speed.
pub fn straight_route(stops: &[Coordinate]) -> Route {
    let distance_m: f64 = stops.windows(2).map(|p| p[0].distance_to(&p[1])).sum();
    Route {
        geometry: stops.to_vec(),
        distance_m,
        duration_s: distance_m / REPLAY_SPEED_MPS,
    }
}
