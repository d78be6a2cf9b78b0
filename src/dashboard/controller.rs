//! Listener lifecycle: one task per subscribed path, all funneling into the
//! shared projector, shut down together through a cancellation token.

use std::sync::Arc;

use log::info;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::models::{paths, Snapshot, LOG_TAIL_LIMIT};
use crate::store::StateStore;
use crate::telemetry::TelemetryProjector;

use super::DashboardSurface;

type Handler = fn(&mut TelemetryProjector, Snapshot);

/// Owns the projector and its listener tasks. Started once at startup;
/// lives for the page lifetime of the process.
pub struct DashboardController {
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl DashboardController {
    pub fn start<S: StateStore>(store: &S, surface: Arc<dyn DashboardSurface>) -> Self {
        let projector = Arc::new(Mutex::new(TelemetryProjector::new(surface)));
        let cancel = CancellationToken::new();

        // Notifications across paths arrive in arbitrary relative order;
        // the projector mutex serializes the handlers, nothing more.
        let feeds: [(watch::Receiver<Snapshot>, Handler); 4] = [
            (
                store.subscribe(paths::SENSORS),
                TelemetryProjector::handle_sensors,
            ),
            (
                store.subscribe(paths::PUMPS),
                TelemetryProjector::handle_pumps,
            ),
            (
                store.subscribe(paths::CONFIG),
                TelemetryProjector::handle_config,
            ),
            (
                store.subscribe_tail(paths::LOGS, LOG_TAIL_LIMIT),
                TelemetryProjector::handle_logs,
            ),
        ];

        let tasks = feeds
            .into_iter()
            .map(|(rx, handler)| {
                tokio::spawn(path_loop(
                    rx,
                    Arc::clone(&projector),
                    handler,
                    cancel.clone(),
                ))
            })
            .collect();

        Self { cancel, tasks }
    }

    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
        info!("dashboard listeners stopped");
    }
}

async fn path_loop(
    mut rx: watch::Receiver<Snapshot>,
    projector: Arc<Mutex<TelemetryProjector>>,
    handler: Handler,
    cancel: CancellationToken,
) {
    loop {
        // The receiver starts out holding the current value, so the first
        // pass projects whatever the path already contains.
        let snapshot = rx.borrow_and_update().clone();
        handler(&mut *projector.lock().await, snapshot);

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = cancel.cancelled() => break,
        }
    }
}
