use navbridge_core::config::NavConfig;
use navbridge_core::geo::{RawCoordinate, RawWaypoint};
use navbridge_core::Result;

use crate::engine::{Collaborators, NavServices};
use crate::runtime::{SurfaceHandle, SurfaceRuntime};
use crate::surface::{NavigationSurface, SurfaceCommand, SurfaceMode};

/// Inputs for one full-screen navigation session.
#[derive(Debug, Clone, PartialEq)]
pub struct FullScreenRequest {
    /// `None` resolves the origin from the device location.
    pub origin: Option<RawCoordinate>,
    pub destination: RawWaypoint,
    pub waypoints: Vec<RawWaypoint>,
    pub alternatives: bool,
}

impl FullScreenRequest {
    pub fn to(destination: RawWaypoint) -> Self {
        Self {
            origin: None,
            destination,
            waypoints: Vec::new(),
            alternatives: false,
        }
    }
}

/// Start a full-screen session: validate, spawn its runtime, and start guidance
/// as soon as a route is ready.
///
/// A missing or malformed access token and invalid origin/destination fail here,
/// before any collaborator is touched.
pub async fn launch_full_screen(
    request: FullScreenRequest,
    config: &NavConfig,
    collaborators: Collaborators,
    services: NavServices,
) -> Result<SurfaceHandle> {
    config.require_access_token()?;
    request.destination.require("destination")?;
    if let Some(origin) = &request.origin {
        origin.require("origin")?;
    }

    let mut surface = NavigationSurface::new(SurfaceMode::FullScreen, collaborators, services);
    surface.configure(config);
    let handle = SurfaceRuntime::spawn(surface);

    tracing::info!(owner = handle.owner_id(), "launching full-screen navigation");

    let commands = [
        SurfaceCommand::SetWaypoints(Some(request.waypoints)),
        SurfaceCommand::SetAlternatives(request.alternatives),
        SurfaceCommand::SetStartOrigin(request.origin),
        SurfaceCommand::SetDestination(request.destination),
        SurfaceCommand::StartGuidance,
        SurfaceCommand::Enable(true),
    ];
    send_all(&handle, commands).await?;

    Ok(handle)
}

/// Send `commands` in order. The first failure shuts the runtime down.
async fn send_all(
    handle: &SurfaceHandle,
    commands: impl IntoIterator<Item = SurfaceCommand>,
) -> Result<()> {
    for command in commands {
        let name = command.name();
        if let Err(err) = handle.send(command).await {
            tracing::warn!(owner = handle.owner_id(), command = name, "launch aborted: {err}");
            // Errs only when the runtime has already stopped.
            let _ = handle.shutdown();
            return Err(err);
        }
    }
    Ok(())
}
