//! Periodic uniqueness projection.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::application::services::ProjectorService;
use crate::domain::repositories::{ShardRepository, UniqueRepository};

/// Runs the projector every `period` until `shutdown` flips to `true`.
///
/// A failed run is logged by the projector and retried on the next tick; runs
/// never overlap because each one is awaited inside the loop.
pub async fn run_projection_worker<S, U>(
    projector: Arc<ProjectorService<S, U>>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    S: ShardRepository + ?Sized,
    U: UniqueRepository + ?Sized,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let _ = projector.run().await;
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    tracing::info!("Projection worker stopped");
                    return;
                }
            }
        }
    }
}
