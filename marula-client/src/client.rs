//! Remote store client
//!
//! Thin wrapper around the hosted real-time key-value database. Orders are
//! written once under `orders/{generatedKey}` with a server-assigned
//! timestamp field; the reserved `.info/connected` path answers the
//! background connectivity probe.
//!
//! Writes are bounded: a capped number of attempts with exponential
//! backoff, after which the caller falls back to local-only persistence.
//! Nothing here ever blocks the user's flow indefinitely.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use shared::models::Order;
use shared::util::remote_order_key;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};

/// Connectivity to the hosted store, as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No request has completed yet
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

/// Client for the hosted key-value store.
///
/// The connection-state flag is mutated only by this client's own request
/// outcomes and probe loop; everyone else holds a read-only
/// [`watch::Receiver`].
pub struct RemoteStore {
    http: reqwest::Client,
    config: SyncConfig,
    state_tx: watch::Sender<ConnectionState>,
}

impl RemoteStore {
    pub fn new(config: SyncConfig) -> SyncResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        let (state_tx, _) = watch::channel(ConnectionState::Unknown);
        Ok(Self {
            http,
            config,
            state_tx,
        })
    }

    /// Subscribe to connection-state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, next: ConnectionState) {
        let previous = *self.state_tx.borrow();
        if previous != next {
            tracing::info!(?previous, ?next, "Remote store connection state changed");
        }
        self.state_tx.send_replace(next);
    }

    /// Write an order once under `orders/{generatedKey}`.
    ///
    /// Returns the generated key. Retries transient failures with
    /// exponential backoff up to the configured attempt cap; a permission
    /// rejection fails immediately (the store is reachable, retrying
    /// cannot help).
    pub async fn push_order(&self, order: &Order) -> SyncResult<String> {
        let key = remote_order_key(order.id);
        let url = format!("{}/orders/{}.json", self.config.base_url, key);
        let body = json!({
            "order": order,
            // Server-assigned write timestamp
            "created_at": { ".sv": "timestamp" },
        });

        let mut delay = Duration::from_millis(self.config.initial_retry_delay_ms);
        let mut last_error = SyncError::Unavailable("no attempt made".to_string());

        for attempt in 1..=self.config.max_retries.max(1) {
            match self.try_put(&url, &body).await {
                Ok(()) => {
                    self.set_state(ConnectionState::Connected);
                    tracing::debug!(%key, order_id = order.id, "Order pushed to remote store");
                    return Ok(key);
                }
                Err(SyncError::PermissionDenied) => {
                    // The server answered; connectivity is fine.
                    self.set_state(ConnectionState::Connected);
                    return Err(SyncError::PermissionDenied);
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        max = self.config.max_retries,
                        error = %e,
                        "Remote order write failed"
                    );
                    last_error = e;
                    if attempt < self.config.max_retries {
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                }
            }
        }

        self.set_state(ConnectionState::Disconnected);
        Err(last_error)
    }

    async fn try_put(&self, url: &str, body: &serde_json::Value) -> SyncResult<()> {
        let response = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(|e| if e.is_timeout() { SyncError::Timeout } else { e.into() })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SyncError::from_status(status))
        }
    }

    /// One connectivity check against the reserved `.info/connected` path.
    /// Updates the published state and returns whether the store answered.
    pub async fn check_connection(&self) -> bool {
        let url = format!("{}/.info/connected.json", self.config.base_url);
        let reachable = match self.http.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "Connectivity probe failed");
                false
            }
        };
        self.set_state(if reachable {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        });
        reachable
    }

    /// Spawn the periodic background probe. It keeps trying to restore the
    /// connection without blocking any user action; cancel the token to
    /// stop it.
    pub fn spawn_probe(self: &Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(store.config.probe_interval_secs));
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::info!("Connectivity probe stopping");
                        break;
                    }
                    _ = interval.tick() => {
                        store.check_connection().await;
                    }
                }
            }
        })
    }
}
