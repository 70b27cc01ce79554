//! Data bridge: connects [`Dashboard`] watch channels to TUI actions.
//!
//! Runs as a background task: starts the dashboard, then forwards every
//! surface replacement and in-flight count change as an [`Action`]
//! through the TUI's action channel.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use ghwatch_core::Dashboard;

use crate::action::Action;

pub async fn spawn_data_bridge(
    dashboard: Dashboard,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut surface = dashboard.surface();
    let mut in_flight = dashboard.in_flight();

    if let Err(e) = dashboard.start().await {
        warn!(error = %e, "failed to start dashboard");
        return;
    }

    let _ = action_tx.send(Action::SurfaceUpdated(surface.borrow_and_update().clone()));

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Ok(()) = surface.changed() => {
                let s = surface.borrow_and_update().clone();
                debug!(cycle = s.cycle, "dispatching SurfaceUpdated");
                let _ = action_tx.send(Action::SurfaceUpdated(s));
            }
            Ok(()) = in_flight.changed() => {
                let n = *in_flight.borrow_and_update();
                let _ = action_tx.send(Action::InFlightChanged(n));
            }
        }
    }

    dashboard.shutdown().await;
    debug!("data bridge shut down");
}
