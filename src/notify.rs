//! Operations that span both registries: pushing a transfer to a device,
//! revoking a transfer, and the background sweep that expires transfers.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{AppError, DeviceRegistry, PendingTransfer, TransferStore};

/// Authorizes the transfer and leaves a snapshot of it in the device's
/// pending slot.
pub async fn notify_device(
    store: &TransferStore,
    registry: &DeviceRegistry,
    device_id: &str,
    transfer_id: &str,
    token: &str,
) -> Result<PendingTransfer, AppError> {
    let transfer = store.authorize(transfer_id, token).await?;
    let pending = PendingTransfer::from_transfer(&transfer);
    registry.notify(device_id, pending.clone()).await?;

    info!(device_id, transfer_id, "device notified");
    Ok(pending)
}

/// Deletes an authorized transfer and any notification pointing at it.
pub async fn revoke_transfer(
    store: &TransferStore,
    registry: &DeviceRegistry,
    transfer_id: &str,
    token: &str,
) -> Result<(), AppError> {
    store.authorize(transfer_id, token).await?;
    store.remove(transfer_id).await;
    registry.clear_by_transfer(transfer_id).await;
    Ok(())
}

/// Handle to the recurring expiry sweep.
pub struct CleanupTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl CleanupTask {
    /// Signals the task to stop. Does not wait for it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancels the task and waits for it to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "cleanup task ended abnormally");
        }
    }
}

/// Evicts transfers older than `ttl` every `interval` until `cancel` fires.
/// Devices still pointing at an evicted transfer have their slot cleared.
pub fn spawn_cleanup(
    store: Arc<TransferStore>,
    registry: Arc<DeviceRegistry>,
    ttl: Duration,
    interval: Duration,
    cancel: CancellationToken,
) -> CleanupTask {
    let period = interval.max(Duration::from_millis(1));
    let task_cancel = cancel.clone();

    let handle = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(?ttl, ?period, "cleanup task started");

        loop {
            tokio::select! {
                biased;

                _ = task_cancel.cancelled() => {
                    info!("cleanup task shutting down");
                    break;
                }

                _ = ticker.tick() => {
                    for id in store.evict_older_than(ttl).await {
                        registry.clear_by_transfer(&id).await;
                    }
                }
            }
        }
    });

    CleanupTask { cancel, handle }
}
