use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde_json::Value;

use navbridge_core::camera::CameraCommand;
use navbridge_core::config::NavConfig;
use navbridge_core::error::NavErrorCode;
use navbridge_core::geo::{Coordinate, RawCoordinate, RawWaypoint};
use navbridge_core::guidance::{RawBanner, RawProgress};
use navbridge_core::route::{Route, RouteOutcome};
use navbridge_core::sheet::SheetState;
use navbridge_surface::engine::{NavServices, PermissionStatus};
use navbridge_surface::mock::{straight_route, MockCall, MockEngine};
use navbridge_surface::surface::Deferred;
use navbridge_surface::{LifecycleState, NavigationSurface, SurfaceCommand, SurfaceMode};

type Events = Arc<Mutex<Vec<(String, Value)>>>;

struct Harness {
    engine: MockEngine,
    surface: NavigationSurface,
    events: Events,
}

fn recording_services() -> (NavServices, Events) {
    let services = NavServices::new();
    let events: Events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    services.bridge.set_emitter(move |name: &str, payload: &Value| {
        sink.lock().unwrap().push((name.to_string(), payload.clone()));
    });
    (services, events)
}

fn harness(engine: MockEngine) -> Harness {
    let (services, events) = recording_services();
    harness_with(engine, services, events, SurfaceMode::Embedded)
}

fn harness_with(
    engine: MockEngine,
    services: NavServices,
    events: Events,
    mode: SurfaceMode,
) -> Harness {
    let surface = NavigationSurface::new(mode, engine.collaborators(), services);
    Harness {
        engine,
        surface,
        events,
    }
}

impl Harness {
    fn names(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .filter(|name| name != "onStateChange")
            .collect()
    }

    fn count(&self, name: &str) -> usize {
        self.names().iter().filter(|n| *n == name).count()
    }

    fn last(&self, name: &str) -> Option<Value> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, payload)| payload.clone())
    }

    fn apply(&mut self, command: SurfaceCommand) {
        self.surface.apply(command).expect("command should be accepted");
    }

    fn state(&self) -> LifecycleState {
        self.surface.state()
    }

    fn set_inputs(&mut self) {
        self.apply(SurfaceCommand::SetStartOrigin(Some(RawCoordinate::new(52.52, 13.40))));
        self.apply(SurfaceCommand::SetDestination(RawWaypoint::named(
            52.53, 13.41, "Office",
        )));
    }

    fn respond(&mut self, outcome: RouteOutcome) {
        let ticket = self.surface.snapshot().in_flight.expect("route in flight");
        self.surface.on_route_response(ticket, outcome).unwrap();
    }

    fn preview(&mut self) {
        self.set_inputs();
        self.apply(SurfaceCommand::Enable(true));
        assert_eq!(self.state(), LifecycleState::RequestingRoute);
        self.respond(RouteOutcome::Routes(vec![route()]));
        assert_eq!(self.state(), LifecycleState::Previewing);
    }

    fn guide(&mut self) {
        self.preview();
        self.apply(SurfaceCommand::StartGuidance);
        assert_eq!(self.state(), LifecycleState::Guiding);
    }

    fn progress(&mut self, distance_remaining: f64) {
        self.surface
            .on_progress(RawProgress {
                distance_traveled: 100.0,
                distance_remaining,
                duration_remaining: distance_remaining / 10.0,
                fraction_traveled: 0.9,
            })
            .unwrap();
    }
}

fn coordinate(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng).unwrap()
}

fn route() -> Route {
    straight_route(&[coordinate(52.52, 13.40), coordinate(52.53, 13.41)])
}

fn requests(engine: &MockEngine) -> usize {
    engine.count(|call| matches!(call, MockCall::RequestRoute { .. }))
}

#[test]
fn enable_with_inputs_requests_and_previews() {
    let mut h = harness(MockEngine::new());
    h.preview();

    let names = h.names();
    assert_eq!(
        names,
        vec!["onDestinationChanged", "onRouteReady", "onDestinationPreview"]
    );
    assert_eq!(h.last("onRouteReady").unwrap()["routeCount"], 1);

    let snapshot = h.surface.snapshot();
    assert!(snapshot.holds_session);
    assert!(snapshot.has_requested_route);
    assert!(snapshot.has_set_route_overview);
    assert_eq!(
        h.engine
            .count(|call| matches!(call, MockCall::SetCamera(CameraCommand::Fit { .. }))),
        1
    );
    assert_eq!(h.engine.count(|call| *call == MockCall::RenderRoute { routes: 1 }), 1);
}

#[test]
fn embedded_surface_waits_for_an_origin() {
    let mut h = harness(MockEngine::new());
    h.apply(SurfaceCommand::Enable(true));
    h.apply(SurfaceCommand::SetDestination(RawWaypoint::new(52.53, 13.41)));

    assert_eq!(h.state(), LifecycleState::AwaitingRouteInputs);
    assert_eq!(requests(&h.engine), 0);
    assert!(h.surface.take_deferred().is_empty());

    h.apply(SurfaceCommand::SetStartOrigin(Some(RawCoordinate::new(52.52, 13.40))));
    assert_eq!(h.state(), LifecycleState::RequestingRoute);
}

#[test]
fn arrival_fires_once() {
    let mut h = harness(MockEngine::new());
    h.guide();

    for remaining in [50.0, 20.0, 4.0, 2.0] {
        h.progress(remaining);
    }

    assert_eq!(h.count("onRouteProgressChange"), 4);
    assert_eq!(h.count("onArrive"), 1);
    assert_eq!(h.last("onArrive").unwrap()["name"], "Office");
    assert_eq!(h.state(), LifecycleState::Arrived);
    assert!(h.surface.snapshot().has_emitted_arrival);

    // Arrival happened on the third tick.
    let names = h.names();
    let arrive_at = names.iter().position(|n| n == "onArrive").unwrap();
    let ticks_before = names[..arrive_at]
        .iter()
        .filter(|n| *n == "onRouteProgressChange")
        .count();
    assert_eq!(ticks_before, 3);
}

#[test]
fn progress_fraction_is_clamped_before_emission() {
    let mut h = harness(MockEngine::new());
    h.guide();

    h.surface
        .on_progress(RawProgress {
            distance_traveled: 10.0,
            distance_remaining: 500.0,
            duration_remaining: 60.0,
            fraction_traveled: 1.7,
        })
        .unwrap();

    let payload = h.last("onRouteProgressChange").unwrap();
    assert_eq!(payload["fractionTraveled"], 1.0);
}

#[test]
fn identical_inputs_do_not_re_request() {
    let mut h = harness(MockEngine::new());
    h.preview();
    assert_eq!(requests(&h.engine), 1);

    h.set_inputs();
    h.apply(SurfaceCommand::SetWaypoints(Some(vec![RawWaypoint::new(f64::NAN, 0.0)])));
    h.apply(SurfaceCommand::SetWaypoints(None));
    assert_eq!(requests(&h.engine), 1);
    assert_eq!(h.state(), LifecycleState::Previewing);

    h.apply(SurfaceCommand::SetAlternatives(true));
    assert_eq!(requests(&h.engine), 2);
    assert_eq!(h.state(), LifecycleState::RequestingRoute);
}

#[test]
fn invalid_waypoints_are_dropped_from_the_request() {
    let mut h = harness(MockEngine::new());
    h.apply(SurfaceCommand::SetWaypoints(Some(vec![
        RawWaypoint::named(52.525, 13.405, "Cafe"),
        RawWaypoint::new(120.0, 13.0),
    ])));
    h.set_inputs();
    h.apply(SurfaceCommand::Enable(true));

    assert!(h
        .engine
        .calls()
        .contains(&MockCall::RequestRoute {
            ticket: h.surface.snapshot().in_flight.unwrap(),
            stops: 3,
        }));
}

#[test]
fn invalid_origin_or_destination_is_rejected_without_side_effects() {
    let mut h = harness(MockEngine::new());
    h.apply(SurfaceCommand::Enable(true));
    h.engine.clear_calls();
    h.events.lock().unwrap().clear();

    let err = h
        .surface
        .apply(SurfaceCommand::SetDestination(RawWaypoint::new(91.0, 0.0)))
        .unwrap_err();
    assert_eq!(err.code(), NavErrorCode::InvalidCoordinates);

    let err = h
        .surface
        .apply(SurfaceCommand::SetStartOrigin(Some(RawCoordinate::new(0.0, f64::INFINITY))))
        .unwrap_err();
    assert_eq!(err.code(), NavErrorCode::InvalidCoordinates);

    assert!(h.engine.calls().is_empty());
    assert!(h.events.lock().unwrap().is_empty());
    assert_eq!(h.state(), LifecycleState::AwaitingRouteInputs);
}

#[test]
fn stale_route_responses_are_discarded() {
    let mut h = harness(MockEngine::new());
    h.set_inputs();
    h.apply(SurfaceCommand::Enable(true));
    let first = h.surface.snapshot().in_flight.unwrap();

    h.apply(SurfaceCommand::SetDestination(RawWaypoint::new(52.54, 13.42)));
    let second = h.surface.snapshot().in_flight.unwrap();
    assert_ne!(first, second);
    assert!(h.engine.calls().contains(&MockCall::CancelRoute(first)));

    h.surface
        .on_route_response(first, RouteOutcome::Failed("401".into()))
        .unwrap();
    assert_eq!(h.state(), LifecycleState::RequestingRoute);
    assert_eq!(h.count("onError"), 0);

    h.surface
        .on_route_response(second, RouteOutcome::Routes(vec![route()]))
        .unwrap();
    assert_eq!(h.state(), LifecycleState::Previewing);
}

#[test]
fn second_surface_is_refused_while_first_holds_the_session() {
    let (services, events) = recording_services();
    let mut first = harness_with(
        MockEngine::new(),
        services.clone(),
        Arc::clone(&events),
        SurfaceMode::Embedded,
    );
    let mut second = harness_with(MockEngine::new(), services.clone(), events, SurfaceMode::Embedded);

    first.preview();
    second.set_inputs();
    second.apply(SurfaceCommand::Enable(true));

    assert_eq!(second.state(), LifecycleState::Errored);
    assert_eq!(requests(&second.engine), 0);
    assert_eq!(
        second.last("onError").unwrap()["code"],
        "NAVIGATION_SESSION_CONFLICT"
    );
    assert_eq!(
        services.registry.current_owner().as_deref(),
        Some(first.surface.owner_id())
    );

    // Stopping the conflicting surface must not evict the owner.
    second.apply(SurfaceCommand::Stop);
    assert!(services.registry.is_held_by(first.surface.owner_id()));

    first.apply(SurfaceCommand::Stop);
    assert!(services.registry.current_owner().is_none());

    second.apply(SurfaceCommand::Enable(true));
    assert_eq!(second.state(), LifecycleState::RequestingRoute);
    assert!(services.registry.is_held_by(second.surface.owner_id()));
}

#[test]
fn upstream_failures_are_classified() {
    let cases = [
        ("HTTP 401 Unauthorized", "MAPBOX_TOKEN_INVALID"),
        ("request forbidden for this token", "MAPBOX_TOKEN_FORBIDDEN"),
        ("status 429", "MAPBOX_RATE_LIMITED"),
        ("Rate limit exceeded", "MAPBOX_RATE_LIMITED"),
        ("socket closed", "ROUTE_ERROR"),
    ];

    for (reason, code) in cases {
        let mut h = harness(MockEngine::new());
        h.set_inputs();
        h.apply(SurfaceCommand::Enable(true));
        h.respond(RouteOutcome::Failed(reason.to_string()));

        assert_eq!(h.state(), LifecycleState::Errored, "{reason}");
        let error = h.last("onError").unwrap();
        assert_eq!(error["code"], code, "{reason}");
        assert_eq!(error["message"], reason);
        assert!(!h.surface.snapshot().holds_session);
    }
}

#[test]
fn empty_route_list_is_no_route() {
    let mut h = harness(MockEngine::new());
    h.set_inputs();
    h.apply(SurfaceCommand::Enable(true));
    h.respond(RouteOutcome::Routes(Vec::new()));

    assert_eq!(h.state(), LifecycleState::Errored);
    assert_eq!(h.last("onError").unwrap()["code"], "NO_ROUTE");

    h.apply(SurfaceCommand::Retry);
    assert_eq!(h.state(), LifecycleState::RequestingRoute);
}

#[test]
fn upstream_cancel_re_arms_without_error() {
    let mut h = harness(MockEngine::new());
    h.set_inputs();
    h.apply(SurfaceCommand::Enable(true));
    h.respond(RouteOutcome::Canceled);

    assert_eq!(h.state(), LifecycleState::AwaitingRouteInputs);
    assert_eq!(h.count("onError"), 0);
    let snapshot = h.surface.snapshot();
    assert!(!snapshot.has_requested_route);
    assert!(!snapshot.holds_session);

    h.apply(SurfaceCommand::SetAlternatives(true));
    assert_eq!(h.state(), LifecycleState::RequestingRoute);
}

#[test]
fn upstream_cancel_after_reroute_detaches_guidance() {
    let mut h = harness(MockEngine::new());
    h.guide();
    assert!(h.engine.has_observers());

    h.apply(SurfaceCommand::SetDestination(RawWaypoint::new(52.54, 13.42)));
    assert_eq!(h.state(), LifecycleState::RequestingRoute);
    h.respond(RouteOutcome::Canceled);

    assert_eq!(h.state(), LifecycleState::AwaitingRouteInputs);
    assert_eq!(h.count("onError"), 0);
    let snapshot = h.surface.snapshot();
    assert!(!snapshot.holds_session);
    assert!(!snapshot.observers_registered);
    assert!(!snapshot.trip_active);
    assert_eq!(snapshot.route_count, 0);
    assert!(!h.engine.has_observers());
    assert!(h.engine.calls().contains(&MockCall::ClearRoute));
}

#[test]
fn full_screen_surfaces_do_not_share_a_session() {
    let (services, events) = recording_services();
    let mut first = harness_with(
        MockEngine::new(),
        services.clone(),
        Arc::clone(&events),
        SurfaceMode::FullScreen,
    );
    let mut second = harness_with(MockEngine::new(), services.clone(), events, SurfaceMode::FullScreen);
    assert_ne!(first.surface.owner_id(), second.surface.owner_id());

    first.guide();
    second.set_inputs();
    second.apply(SurfaceCommand::Enable(true));

    assert_eq!(second.state(), LifecycleState::Errored);
    assert_eq!(requests(&second.engine), 0);
    assert_eq!(
        second.last("onError").unwrap()["code"],
        "NAVIGATION_SESSION_CONFLICT"
    );

    second.apply(SurfaceCommand::Stop);
    assert_eq!(first.state(), LifecycleState::Guiding);
    assert!(first.surface.snapshot().holds_session);
    assert!(services.registry.is_held_by(first.surface.owner_id()));
}

#[test]
fn reroute_fits_the_new_route_overview() {
    let mut h = harness(MockEngine::new());
    h.preview();
    let fits = |engine: &MockEngine| {
        engine.count(|call| matches!(call, MockCall::SetCamera(CameraCommand::Fit { .. })))
    };
    assert_eq!(fits(&h.engine), 1);

    h.apply(SurfaceCommand::SetAlternatives(true));
    assert!(!h.surface.snapshot().has_set_route_overview);
    h.respond(RouteOutcome::Routes(vec![route()]));

    assert_eq!(h.state(), LifecycleState::Previewing);
    assert_eq!(fits(&h.engine), 2);
    assert!(h.surface.snapshot().has_set_route_overview);
}

#[test]
fn configured_sheet_options_apply_when_guidance_starts() {
    let mut expanded = harness(MockEngine::new());
    expanded.surface.configure(&NavConfig {
        sheet_expanded: true,
        ..NavConfig::default()
    });
    expanded.guide();
    assert_eq!(expanded.surface.snapshot().sheet, SheetState::Expanded);

    let mut disabled = harness(MockEngine::new());
    disabled.surface.configure(&NavConfig {
        sheet_enabled: false,
        ..NavConfig::default()
    });
    disabled.guide();
    assert_eq!(disabled.surface.snapshot().sheet, SheetState::Hidden);
    disabled.apply(SurfaceCommand::ShowSheet { expanded: true });
    assert_eq!(disabled.surface.snapshot().sheet, SheetState::Hidden);
}

#[test]
fn stop_cleans_up_in_order() {
    let mut h = harness(MockEngine::new());
    h.guide();
    h.progress(3.0);
    h.apply(SurfaceCommand::SetAlternatives(true));
    assert_eq!(h.state(), LifecycleState::RequestingRoute);
    let in_flight = h.surface.snapshot().in_flight.unwrap();
    h.engine.clear_calls();

    h.apply(SurfaceCommand::Stop);

    assert_eq!(h.state(), LifecycleState::Idle);
    assert_eq!(h.count("onCancelNavigation"), 1);

    let calls = h.engine.calls();
    let position = |wanted: &MockCall| calls.iter().position(|call| call == wanted).unwrap();
    assert!(position(&MockCall::UnregisterObservers) < position(&MockCall::CancelRoute(in_flight)));

    let snapshot = h.surface.snapshot();
    assert!(!snapshot.holds_session);
    assert!(snapshot.in_flight.is_none());
    assert!(!snapshot.has_requested_route);
    assert!(!snapshot.has_emitted_arrival);
    assert!(!snapshot.has_set_route_overview);
    assert!(!snapshot.observers_registered);
    assert_eq!(snapshot.sheet, SheetState::Hidden);

    // A late result for the dropped ticket changes nothing.
    h.surface
        .on_route_response(in_flight, RouteOutcome::Routes(vec![route()]))
        .unwrap();
    assert_eq!(h.state(), LifecycleState::Idle);

    // Stop is idempotent.
    h.apply(SurfaceCommand::Stop);
    assert_eq!(h.count("onCancelNavigation"), 1);
}

#[test]
fn late_engine_init_is_retried_then_abandoned() {
    let mut h = harness(MockEngine::new().with_init_after(u32::MAX));
    h.guide();

    let mut retries = 0;
    loop {
        let next = h.surface.take_deferred().into_iter().find_map(|work| match work {
            Deferred::RetryObservers {
                generation,
                attempt,
                delay,
            } => Some((generation, attempt, delay)),
            _ => None,
        });
        let Some((generation, attempt, delay)) = next else {
            break;
        };
        assert_eq!(delay.as_millis(), 150);
        retries += 1;
        h.surface.retry_observers(generation, attempt);
    }

    assert_eq!(retries, 9);
    assert_eq!(h.engine.init_checks(), 10);
    assert!(!h.surface.snapshot().observers_registered);
    assert_eq!(h.state(), LifecycleState::Guiding);
    assert_eq!(h.count("onError"), 0);
}

#[test]
fn late_engine_init_registers_once_ready() {
    let mut h = harness(MockEngine::new().with_init_after(2));
    h.guide();

    for _ in 0..2 {
        let (generation, attempt) = h
            .surface
            .take_deferred()
            .into_iter()
            .find_map(|work| match work {
                Deferred::RetryObservers {
                    generation,
                    attempt,
                    ..
                } => Some((generation, attempt)),
                _ => None,
            })
            .expect("a scheduled retry");
        h.surface.retry_observers(generation, attempt);
    }

    assert!(h.surface.snapshot().observers_registered);
    assert!(h.surface.snapshot().trip_active);
    assert!(h.engine.has_observers());
}

#[test]
fn observer_registration_failure_is_init_failed() {
    let mut h = harness(MockEngine::new());
    h.engine
        .fail_on(navbridge_surface::policy::BoundaryOp::RegisterObservers);
    h.guide_expecting_error();

    assert_eq!(h.last("onError").unwrap()["code"], "NAVIGATION_INIT_FAILED");
    assert!(!h.surface.snapshot().holds_session);
}

impl Harness {
    fn guide_expecting_error(&mut self) {
        self.preview();
        self.apply(SurfaceCommand::StartGuidance);
        assert_eq!(self.state(), LifecycleState::Errored);
    }
}

#[test]
fn permission_prompt_then_grant() {
    let mut h = harness(MockEngine::new().with_permission(PermissionStatus::Unknown));
    h.set_inputs();
    h.apply(SurfaceCommand::Enable(true));

    assert_eq!(h.state(), LifecycleState::AwaitingPermission);
    assert!(h.engine.calls().contains(&MockCall::RequestPermission));

    h.engine.set_permission(PermissionStatus::Granted);
    h.apply(SurfaceCommand::PermissionChanged(true));
    assert_eq!(h.state(), LifecycleState::RequestingRoute);
}

#[test]
fn revoked_permission_errors_and_releases() {
    let mut h = harness(MockEngine::new());
    h.guide();

    h.engine.set_permission(PermissionStatus::Denied);
    h.apply(SurfaceCommand::PermissionChanged(false));

    assert_eq!(h.state(), LifecycleState::Errored);
    assert_eq!(
        h.last("onError").unwrap()["code"],
        "LOCATION_PERMISSION_REQUIRED"
    );
    assert!(!h.surface.snapshot().holds_session);

    // Retrying without permission lands back in Errored.
    h.apply(SurfaceCommand::Retry);
    assert_eq!(h.state(), LifecycleState::Errored);
}

#[test]
fn guidance_rejected_after_error() {
    let mut h = harness(MockEngine::new());
    h.set_inputs();
    h.apply(SurfaceCommand::Enable(true));
    h.respond(RouteOutcome::Failed("boom".into()));

    assert!(h.surface.apply(SurfaceCommand::StartGuidance).is_err());
    let mut fresh = harness(MockEngine::new());
    assert!(fresh.surface.apply(SurfaceCommand::Retry).is_err());
}

#[test]
fn start_before_route_ready_guides_on_arrival_of_route() {
    let mut h = harness(MockEngine::new());
    h.set_inputs();
    h.apply(SurfaceCommand::StartGuidance);
    h.apply(SurfaceCommand::Enable(true));
    assert!(h.surface.snapshot().guidance_requested);

    h.respond(RouteOutcome::Routes(vec![route()]));
    assert_eq!(h.state(), LifecycleState::Guiding);
    assert_eq!(h.surface.snapshot().sheet, SheetState::Collapsed);
}

#[test]
fn sheet_actions_are_forwarded_and_reported() {
    let mut h = harness(MockEngine::new());
    h.guide();

    h.apply(SurfaceCommand::PressSheetAction("toggleMute".into()));
    assert!(h.surface.snapshot().voice.muted);
    let press = h.last("onBottomSheetActionPress").unwrap();
    assert_eq!(press["actionId"], "toggleMute");
    assert_eq!(press["source"], "builtin");

    h.apply(SurfaceCommand::PressSheetAction("share".into()));
    assert_eq!(h.last("onBottomSheetActionPress").unwrap()["source"], "custom");
    assert_eq!(h.state(), LifecycleState::Guiding);

    h.apply(SurfaceCommand::PressSheetAction("stop".into()));
    assert_eq!(h.state(), LifecycleState::Idle);
    assert_eq!(h.count("onCancelNavigation"), 1);
}

#[test]
fn sheet_content_updates_never_change_visibility() {
    let mut h = harness(MockEngine::new());
    h.guide();
    h.apply(SurfaceCommand::HideSheet);

    h.surface.on_banner(&RawBanner {
        primary_text: Some("Turn left onto Main St".into()),
        secondary_text: None,
        step_distance_remaining: 120.0,
    });
    h.progress(300.0);
    assert_eq!(h.surface.snapshot().sheet, SheetState::Hidden);

    h.apply(SurfaceCommand::ShowSheet { expanded: false });
    h.apply(SurfaceCommand::ToggleSheet);
    assert_eq!(h.surface.snapshot().sheet, SheetState::Expanded);
}

#[test]
fn blank_banners_are_dropped() {
    let mut h = harness(MockEngine::new());
    h.guide();

    h.surface.on_banner(&RawBanner {
        primary_text: Some("   ".into()),
        secondary_text: Some("ignored".into()),
        step_distance_remaining: 10.0,
    });
    assert_eq!(h.count("onBannerInstruction"), 0);

    h.surface.on_banner(&RawBanner {
        primary_text: Some(" Turn right ".into()),
        secondary_text: Some("".into()),
        step_distance_remaining: 10.0,
    });
    let banner = h.last("onBannerInstruction").unwrap();
    assert_eq!(banner["primaryText"], "Turn right");
    assert_eq!(banner["secondaryText"], Value::Null);
}

#[test]
fn follow_camera_is_throttled() {
    let mut h = harness(MockEngine::new());
    h.guide();
    h.engine.clear_calls();

    let start = Instant::now();
    let update = navbridge_core::guidance::LocationUpdate::at(52.521, 13.401);
    h.surface.on_location(update, start);
    h.surface
        .on_location(update, start + std::time::Duration::from_millis(200));
    h.surface
        .on_location(update, start + std::time::Duration::from_millis(700));

    assert_eq!(h.count("onLocationChange"), 3);
    assert_eq!(
        h.engine
            .count(|call| matches!(call, MockCall::SetCamera(CameraCommand::Follow { .. }))),
        2
    );
}

#[test]
fn voice_settings_clamp_and_reject() {
    let mut h = harness(MockEngine::new());
    h.apply(SurfaceCommand::SetVoiceVolume(1.7));
    assert_eq!(h.surface.snapshot().voice.volume(), 1.0);
    assert!(h.surface.apply(SurfaceCommand::SetVoiceVolume(f64::NAN)).is_err());
    assert!(h.surface.apply(SurfaceCommand::SetLanguage("  ".into())).is_err());

    h.apply(SurfaceCommand::SetLanguage("de".into()));
    assert_eq!(h.surface.snapshot().voice.language(), "de");
}

#[test]
fn simulated_trip_uses_a_replay_trace() {
    let mut h = harness(MockEngine::new());
    h.apply(SurfaceCommand::SetSimulate(true));
    h.guide();

    assert!(h
        .engine
        .calls()
        .contains(&MockCall::StartTripSession { simulated: true }));
    assert!(h.engine.remaining_replay_frames() > 1);
}

#[test]
fn full_screen_resolves_a_missing_origin() {
    let (services, events) = recording_services();
    let mut h = harness_with(MockEngine::new(), services, events, SurfaceMode::FullScreen);
    h.apply(SurfaceCommand::SetDestination(RawWaypoint::new(52.53, 13.41)));
    h.apply(SurfaceCommand::Enable(true));
    assert_eq!(h.state(), LifecycleState::AwaitingRouteInputs);

    let generation = h
        .surface
        .take_deferred()
        .into_iter()
        .find_map(|work| match work {
            Deferred::ResolveOrigin { generation, .. } => Some(generation),
            _ => None,
        })
        .expect("origin lookup scheduled");

    h.surface
        .origin_resolved(generation, Ok(coordinate(52.52, 13.40)))
        .unwrap();
    assert_eq!(h.state(), LifecycleState::RequestingRoute);
}
