//! One simulated full-screen trip against the mock engine.

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use navbridge_core::lifecycle::LifecycleState;
use navbridge_surface::engine::NavServices;
use navbridge_surface::mock::MockEngine;
use navbridge_surface::{launch_full_screen, FullScreenRequest, SurfaceCommand};

use crate::config::SimConfig;

/// How a scenario ended.
#[derive(Debug, Clone, PartialEq)]
pub struct SimReport {
    pub final_state: LifecycleState,
    pub frames_played: u32,
    pub ticks: u32,
}

impl SimReport {
    pub fn arrived(&self) -> bool {
        self.final_state == LifecycleState::Arrived
    }
}

/// Launch, replay the trace one frame per tick until arrival, then stop and shut down.
///
/// Host events go to whatever emitter is installed on `services.bridge`.
pub async fn run(config: &SimConfig, services: NavServices) -> Result<SimReport> {
    let device = config.device_location.require("device")?;
    let engine = MockEngine::new().with_location(device);

    let request = FullScreenRequest {
        origin: config.origin,
        destination: config.destination.clone(),
        waypoints: config.waypoints.clone(),
        alternatives: config.alternatives,
    };
    let handle = launch_full_screen(request, &config.nav, engine.collaborators(), services)
        .await
        .context("launching full-screen navigation")?;

    let mut interval = tokio::time::interval(config.tick);
    let mut report = SimReport {
        final_state: LifecycleState::Idle,
        frames_played: 0,
        ticks: 0,
    };

    while report.ticks < config.max_ticks {
        interval.tick().await;
        report.ticks += 1;

        let snapshot = handle.snapshot().await?;
        report.final_state = snapshot.state;
        match snapshot.state {
            LifecycleState::Arrived => break,
            LifecycleState::Errored => {
                handle.shutdown()?;
                bail!("navigation session failed; see the onError event");
            }
            LifecycleState::Guiding if snapshot.trip_active => {
                if engine.replay_next() {
                    report.frames_played += 1;
                } else {
                    debug!("replay trace exhausted before arrival");
                }
            }
            state => debug!(state = state.label(), "waiting for guidance"),
        }
    }

    info!(
        state = report.final_state.label(),
        frames = report.frames_played,
        ticks = report.ticks,
        "scenario finished"
    );

    handle.send(SurfaceCommand::Stop).await?;
    handle.shutdown()?;
    Ok(report)
}
