use std::time::Instant;

use navbridge_core::camera::CameraMode;
use navbridge_core::error::NavErrorCode;
use navbridge_core::events::NavEvent;
use navbridge_core::geo::{parse_waypoint_list, RawCoordinate, RawWaypoint};
use navbridge_core::lifecycle::{LifecycleState, Trigger};
use navbridge_core::route::DistanceUnit;
use navbridge_core::sheet::{QuickAction, SheetState};
use navbridge_core::{CoreError, Result};

use super::{best_effort, NavigationSurface};
use crate::engine::PermissionStatus;
use crate::policy::BoundaryOp;

/// Host commands accepted by a surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    Enable(bool),
    SetStartOrigin(Option<RawCoordinate>),
    SetDestination(RawWaypoint),
    SetWaypoints(Option<Vec<RawWaypoint>>),
    SetAlternatives(bool),
    SetSimulate(bool),
    SetCameraMode(CameraMode),
    SetMute(bool),
    SetVoiceVolume(f64),
    SetLanguage(String),
    SetDistanceUnit(DistanceUnit),
    StartGuidance,
    Stop,
    Retry,
    PermissionChanged(bool),
    PressSheetAction(String),
    ShowSheet { expanded: bool },
    HideSheet,
    ToggleSheet,
    Detach,
}

impl SurfaceCommand {
    /// Stable name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            SurfaceCommand::Enable(_) => "enable",
            SurfaceCommand::SetStartOrigin(_) => "setStartOrigin",
            SurfaceCommand::SetDestination(_) => "setDestination",
            SurfaceCommand::SetWaypoints(_) => "setWaypoints",
            SurfaceCommand::SetAlternatives(_) => "setAlternatives",
            SurfaceCommand::SetSimulate(_) => "setSimulate",
            SurfaceCommand::SetCameraMode(_) => "setCameraMode",
            SurfaceCommand::SetMute(_) => "setMute",
            SurfaceCommand::SetVoiceVolume(_) => "setVoiceVolume",
            SurfaceCommand::SetLanguage(_) => "setLanguage",
            SurfaceCommand::SetDistanceUnit(_) => "setDistanceUnit",
            SurfaceCommand::StartGuidance => "startGuidance",
            SurfaceCommand::Stop => "stop",
            SurfaceCommand::Retry => "retry",
            SurfaceCommand::PermissionChanged(_) => "permissionChanged",
            SurfaceCommand::PressSheetAction(_) => "pressSheetAction",
            SurfaceCommand::ShowSheet { .. } => "showSheet",
            SurfaceCommand::HideSheet => "hideSheet",
            SurfaceCommand::ToggleSheet => "toggleSheet",
            SurfaceCommand::Detach => "detach",
        }
    }
}

/// Public API (host facing).
///
/// Input errors come back as `Err` with no side effects. Conflicts and upstream
/// failures are reported through `onError` and leave the surface in `Errored`.
impl NavigationSurface {
    pub fn apply(&mut self, command: SurfaceCommand) -> Result<()> {
        tracing::trace!(owner = %self.owner_id, command = command.name(), "applying command");
        match command {
            SurfaceCommand::Enable(enabled) => self.enable(enabled),
            SurfaceCommand::SetStartOrigin(origin) => self.set_start_origin(origin),
            SurfaceCommand::SetDestination(destination) => self.set_destination(destination),
            SurfaceCommand::SetWaypoints(waypoints) => self.set_waypoints(waypoints),
            SurfaceCommand::SetAlternatives(alternatives) => self.set_alternatives(alternatives),
            SurfaceCommand::SetSimulate(simulate) => {
                self.set_simulate(simulate);
                Ok(())
            }
            SurfaceCommand::SetCameraMode(mode) => {
                self.set_camera_mode(mode);
                Ok(())
            }
            SurfaceCommand::SetMute(muted) => {
                self.set_mute(muted);
                Ok(())
            }
            SurfaceCommand::SetVoiceVolume(volume) => self.set_voice_volume(volume),
            SurfaceCommand::SetLanguage(language) => self.set_language(&language),
            SurfaceCommand::SetDistanceUnit(unit) => {
                self.set_distance_unit(unit);
                Ok(())
            }
            SurfaceCommand::StartGuidance => self.start_guidance(),
            SurfaceCommand::Stop => self.stop(),
            SurfaceCommand::Retry => self.retry(),
            SurfaceCommand::PermissionChanged(granted) => self.permission_changed(granted),
            SurfaceCommand::PressSheetAction(action_id) => self.press_sheet_action(&action_id),
            SurfaceCommand::ShowSheet { expanded } => {
                self.show_sheet(expanded);
                Ok(())
            }
            SurfaceCommand::HideSheet => {
                self.hide_sheet();
                Ok(())
            }
            SurfaceCommand::ToggleSheet => {
                self.toggle_sheet();
                Ok(())
            }
            SurfaceCommand::Detach => self.detach(),
        }
    }

    /// `enable(false)` stops any session; `enable(true)` leaves `Idle`.
    pub fn enable(&mut self, enabled: bool) -> Result<()> {
        if !enabled {
            self.enabled = false;
            return self.stop();
        }

        self.enabled = true;
        if self.state == LifecycleState::Idle {
            self.activate()
        } else {
            Ok(())
        }
    }

    pub(super) fn activate(&mut self) -> Result<()> {
        match self.collaborators.permission.status() {
            PermissionStatus::Granted => {
                self.transition(Trigger::Enable)?;
                self.refresh_route()
            }
            PermissionStatus::Unknown => {
                self.transition(Trigger::EnableAwaitingPermission)?;
                best_effort(
                    BoundaryOp::RequestPermission,
                    self.collaborators.permission.request(),
                );
                Ok(())
            }
            PermissionStatus::Denied => {
                let code = NavErrorCode::LocationPermissionRequired;
                self.fail(Trigger::PermissionDenied, code, code.user_message());
                Ok(())
            }
        }
    }

    /// `None` clears the origin; in full-screen mode it is then resolved from
    /// the device location.
    pub fn set_start_origin(&mut self, origin: Option<RawCoordinate>) -> Result<()> {
        let origin = origin.map(|raw| raw.require("origin")).transpose()?;
        if origin == self.origin {
            return Ok(());
        }
        self.origin = origin;
        self.refresh_route()
    }

    pub fn set_destination(&mut self, destination: RawWaypoint) -> Result<()> {
        let destination = destination.require("destination")?;
        if self.destination.as_ref() == Some(&destination) {
            return Ok(());
        }

        self.emit(NavEvent::DestinationChanged(destination.coordinate));
        self.destination = Some(destination);
        self.arrival.reset();
        self.refresh_route()
    }

    /// Invalid entries are dropped; `None` clears the list.
    pub fn set_waypoints(&mut self, waypoints: Option<Vec<RawWaypoint>>) -> Result<()> {
        let waypoints = waypoints
            .map(|raw| parse_waypoint_list(&raw))
            .unwrap_or_default();
        if waypoints == self.waypoints {
            return Ok(());
        }

        self.waypoints = waypoints;
        self.arrival.reset();
        self.refresh_route()
    }

    pub fn set_alternatives(&mut self, alternatives: bool) -> Result<()> {
        if alternatives == self.alternatives {
            return Ok(());
        }
        self.alternatives = alternatives;
        self.refresh_route()
    }

    /// Takes effect at the next trip session start.
    pub fn set_simulate(&mut self, simulate: bool) {
        self.simulate = simulate;
    }

    pub fn set_camera_mode(&mut self, mode: CameraMode) {
        self.camera.set_mode(mode);
        let command = match mode {
            CameraMode::Overview => self
                .routes
                .first()
                .and_then(|route| self.camera.overview(&route.geometry)),
            CameraMode::Following => self.camera.recenter(Instant::now()),
        };
        if let Some(command) = command {
            best_effort(BoundaryOp::SetCamera, self.collaborators.map.set_camera(&command));
        }
    }

    pub fn set_mute(&mut self, muted: bool) {
        self.voice.muted = muted;
        self.push_voice();
    }

    /// Out-of-range volumes are clamped into `[0,1]`; non-finite ones are rejected.
    pub fn set_voice_volume(&mut self, volume: f64) -> Result<()> {
        self.voice.set_volume(volume)?;
        self.push_voice();
        Ok(())
    }

    pub fn set_language(&mut self, language: &str) -> Result<()> {
        self.voice.set_language(language)?;
        self.push_voice();
        Ok(())
    }

    pub fn set_distance_unit(&mut self, unit: DistanceUnit) {
        self.distance_unit = unit;
        self.sheet.set_unit(unit);
    }

    /// Start guidance now when previewing; otherwise as soon as a route is ready.
    /// Rejected from `Errored` until `retry`.
    pub fn start_guidance(&mut self) -> Result<()> {
        match self.state {
            LifecycleState::Previewing => self.begin_guidance(),
            LifecycleState::Guiding | LifecycleState::Arrived => Ok(()),
            LifecycleState::Idle
            | LifecycleState::AwaitingPermission
            | LifecycleState::AwaitingRouteInputs
            | LifecycleState::RequestingRoute => {
                self.guidance_requested = true;
                Ok(())
            }
            state => Err(CoreError::invalid_transition_lifecycle(
                state.id(),
                Trigger::StartGuidance.id(),
            )),
        }
    }

    /// Stop any session and return to `Idle`. Idempotent.
    pub fn stop(&mut self) -> Result<()> {
        if self.state == LifecycleState::Idle {
            return Ok(());
        }

        let held_session = self.state.holds_session();
        self.transition(Trigger::Stop)?;
        self.cleanup();
        if held_session {
            self.emit(NavEvent::CancelNavigation);
        }
        self.transition(Trigger::Cleanup)?;
        Ok(())
    }

    pub fn retry(&mut self) -> Result<()> {
        self.transition(Trigger::Retry)?;

        if self.collaborators.permission.status() == PermissionStatus::Denied {
            let code = NavErrorCode::LocationPermissionRequired;
            self.fail(Trigger::PermissionDenied, code, code.user_message());
            return Ok(());
        }
        self.refresh_route()
    }

    pub fn permission_changed(&mut self, granted: bool) -> Result<()> {
        if granted {
            if self.state == LifecycleState::AwaitingPermission {
                self.transition(Trigger::PermissionGranted)?;
                return self.refresh_route();
            }
            return Ok(());
        }

        match self.state {
            LifecycleState::Idle | LifecycleState::Cancelled | LifecycleState::Errored => Ok(()),
            _ => {
                let code = NavErrorCode::LocationPermissionRequired;
                self.fail(Trigger::PermissionDenied, code, code.user_message());
                Ok(())
            }
        }
    }

    /// Run a builtin quick action (if `action_id` names one) and report the press.
    pub fn press_sheet_action(&mut self, action_id: &str) -> Result<()> {
        let press = self.sheet.press(action_id);

        match press.action {
            Some(QuickAction::Overview) => self.set_camera_mode(CameraMode::Overview),
            Some(QuickAction::Recenter) => self.set_camera_mode(CameraMode::Following),
            Some(QuickAction::Mute) => self.set_mute(true),
            Some(QuickAction::Unmute) => self.set_mute(false),
            Some(QuickAction::ToggleMute) => self.set_mute(!self.voice.muted),
            Some(QuickAction::Stop) => self.stop()?,
            None => {}
        }

        self.emit(NavEvent::BottomSheetActionPress {
            action_id: press.action_id,
            source: press.source,
        });
        Ok(())
    }

    pub fn show_sheet(&mut self, expanded: bool) -> SheetState {
        let target = if expanded {
            SheetState::Expanded
        } else {
            SheetState::Collapsed
        };
        self.sheet.show(target)
    }

    pub fn hide_sheet(&mut self) {
        self.sheet.hide();
    }

    pub fn toggle_sheet(&mut self) -> bool {
        self.sheet.toggle()
    }

    /// Host view unmounted: stop, drop the observer sink and pending work.
    pub fn detach(&mut self) -> Result<()> {
        self.enabled = false;
        self.stop()?;
        self.observer_sink = None;
        self.deferred.clear();
        Ok(())
    }

    fn push_voice(&mut self) {
        best_effort(BoundaryOp::SetVoice, self.collaborators.guidance.set_voice(&self.voice));
    }
}
