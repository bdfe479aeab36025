use anyhow::Result;
use serde_json::{json, Value};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use navbridge_core::events::EVENT_SCHEMA_VERSION;
use navbridge_sim::config::{usage, SimConfig};
use navbridge_sim::scenario;
use navbridge_surface::engine::NavServices;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = SimConfig::from_args();
    if config.nav.show_help {
        println!("{}", usage());
        return Ok(());
    }

    // Host events as JSON lines on stdout; logs stay on stderr.
    let services = NavServices::new();
    services.bridge.set_emitter(|name: &str, payload: &Value| {
        println!("{}", json!({ "version": EVENT_SCHEMA_VERSION, "event": name, "payload": payload }));
    });

    tokio::select! {
        report = scenario::run(&config, services.clone()) => {
            let report = report?;
            if !report.arrived() {
                warn!(state = report.final_state.label(), "stopped before arrival");
            }
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("interrupted");
        }
    }

    services.bridge.clear_emitter();
    Ok(())
}
