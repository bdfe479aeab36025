use std::time::Instant;

use navbridge_core::error::NavErrorCode;
use navbridge_core::events::NavEvent;
use navbridge_core::geo::{self, Coordinate};
use navbridge_core::guidance::{
    BannerInstruction, LocationUpdate, RawBanner, RawProgress, RouteProgress,
};
use navbridge_core::lifecycle::{LifecycleState, Trigger};
use navbridge_core::route::{Route, RouteOutcome, RouteTicket};
use navbridge_core::Result;

use super::{best_effort, NavigationSurface};
use crate::engine::GuidanceUpdate;
use crate::policy::BoundaryOp;

/// Upstream results and collaborator callbacks.
///
/// Late results (stale ticket or generation) are discarded.
impl NavigationSurface {
    pub fn on_route_response(&mut self, ticket: RouteTicket, outcome: RouteOutcome) -> Result<()> {
        if self.in_flight != Some(ticket) {
            tracing::debug!(%ticket, "discarding stale route response");
            return Ok(());
        }
        self.in_flight = None;

        match outcome {
            RouteOutcome::Routes(routes) if routes.is_empty() => {
                let code = NavErrorCode::NoRoute;
                self.fail(Trigger::NoRoutes, code, code.user_message());
                Ok(())
            }
            RouteOutcome::Routes(routes) => self.routes_ready(routes),
            RouteOutcome::Failed(reason) => {
                let code = NavErrorCode::from_route_failure(&reason);
                self.fail(Trigger::RouteFailed, code, reason);
                Ok(())
            }
            RouteOutcome::Canceled => {
                tracing::debug!(
                    code = %NavErrorCode::RouteFetchCanceled,
                    %ticket,
                    "route request canceled upstream; re-arming"
                );
                self.cleanup();
                self.transition(Trigger::RouteCanceled)?;
                Ok(())
            }
        }
    }

    fn routes_ready(&mut self, routes: Vec<Route>) -> Result<()> {
        let Some(primary) = routes.first() else {
            return Ok(());
        };
        let ready = NavEvent::RouteReady {
            route_count: routes.len(),
            distance_meters: primary.distance_m,
            duration_seconds: primary.duration_s,
        };
        let overview = self.camera.on_route_ready(&primary.geometry);

        self.transition(Trigger::RoutesFound)?;
        tracing::info!(owner = %self.owner_id, routes = routes.len(), "route ready");

        best_effort(BoundaryOp::RenderRoute, self.collaborators.map.render_route(&routes));
        if let Some(command) = overview {
            best_effort(BoundaryOp::SetCamera, self.collaborators.map.set_camera(&command));
        }
        self.routes = routes;

        self.emit(ready);
        self.emit(NavEvent::DestinationPreview);

        if self.guidance_requested {
            self.begin_guidance()?;
        }
        Ok(())
    }

    pub fn on_guidance(&mut self, update: GuidanceUpdate, now: Instant) -> Result<()> {
        match update {
            GuidanceUpdate::Location(location) => {
                self.on_location(location, now);
                Ok(())
            }
            GuidanceUpdate::Progress(progress) => self.on_progress(progress),
            GuidanceUpdate::Banner(banner) => {
                self.on_banner(&banner);
                Ok(())
            }
        }
    }

    pub fn on_location(&mut self, update: LocationUpdate, now: Instant) {
        if !self.state.is_guiding() {
            return;
        }
        if !geo::validate(update.latitude, update.longitude) {
            tracing::debug!(
                latitude = update.latitude,
                longitude = update.longitude,
                "dropping invalid location"
            );
            return;
        }

        self.emit(NavEvent::LocationChange(update));
        if let Some(command) = self.camera.on_location(&update, now) {
            best_effort(BoundaryOp::SetCamera, self.collaborators.map.set_camera(&command));
        }
    }

    pub fn on_progress(&mut self, raw: RawProgress) -> Result<()> {
        if !self.state.is_guiding() {
            return Ok(());
        }

        let progress = RouteProgress::from_upstream(raw);
        self.sheet.apply_progress(&progress);
        self.emit(NavEvent::RouteProgressChange(progress));

        if self.state == LifecycleState::Guiding && self.arrival.observe(progress.distance_remaining) {
            self.transition(Trigger::ArrivalReached)?;
            let name = self.destination.as_ref().and_then(|d| d.name.clone());
            tracing::info!(owner = %self.owner_id, "arrived");
            self.emit(NavEvent::Arrive { name });
        }
        Ok(())
    }

    pub fn on_banner(&mut self, raw: &RawBanner) {
        if !self.state.is_guiding() {
            return;
        }
        let Some(banner) = BannerInstruction::from_upstream(raw) else {
            return;
        };
        self.sheet.apply_banner(&banner);
        self.emit(NavEvent::BannerInstruction(banner));
    }

    /// Scheduled readiness check. `attempt` counts from 1.
    pub fn retry_observers(&mut self, generation: u64, attempt: u32) {
        if generation != self.generation || !self.state.is_guiding() || self.trip_active {
            tracing::trace!(generation, attempt, "dropping stale init retry");
            return;
        }
        self.attach_guidance(attempt);
    }

    pub fn origin_resolved(&mut self, generation: u64, result: Result<Coordinate>) -> Result<()> {
        if generation != self.generation
            || self.origin.is_some()
            || self.state != LifecycleState::AwaitingRouteInputs
        {
            tracing::trace!(generation, "dropping stale origin resolution");
            return Ok(());
        }
        self.origin_lookup_pending = false;

        match result {
            Ok(origin) => {
                tracing::debug!(
                    latitude = origin.latitude(),
                    longitude = origin.longitude(),
                    "origin resolved"
                );
                self.resolved_origin = Some(origin);
                self.refresh_route()
            }
            Err(err) => {
                self.fail_with(Trigger::Fault, err);
                Ok(())
            }
        }
    }
}
