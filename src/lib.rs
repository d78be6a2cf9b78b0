//! hydrodash mirrors the state of a hydroponics controller out of a
//! key-path document store onto named display regions, and pushes operator
//! commands back into the store.

pub mod control;
pub mod dashboard;
pub mod models;
pub mod rig;
pub mod store;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testkit;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use control::CommandDispatcher;
use dashboard::{ConsoleSurface, DashboardController, DashboardSurface};
use models::PumpId;
use store::MemoryStore;

pub async fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("hydrodash starting up...");

    let store = Arc::new(MemoryStore::new());
    let surface: Arc<dyn DashboardSurface> = Arc::new(ConsoleSurface);
    let controller = DashboardController::start(store.as_ref(), Arc::clone(&surface));

    let cancel = CancellationToken::new();
    let rig_task = tokio::spawn(rig::run_rig(Arc::clone(&store), cancel.clone()));

    // After half a minute the operator takes the water pump manual; the rig
    // observes the override flag and leaves that pump alone from then on.
    let dispatcher = CommandDispatcher::new(Arc::clone(&store), Arc::clone(&surface));
    let demo_toggle = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(30)).await;
        if let Err(err) = dispatcher.toggle_pump(PumpId::WaterPump, true).await {
            warn!("water pump toggle failed: {err:#}");
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    cancel.cancel();
    demo_toggle.abort();
    let _ = rig_task.await;
    controller.shutdown().await;
    Ok(())
}
