//! Location provider
//!
//! Wraps device geolocation, reverse geocoding, and distance computation
//! into the "current delivery location" concept. Detection is bounded in
//! time and never errors to the caller: on any failure the fixed
//! restaurant position is used and flagged as degraded.
//!
//! Each detection carries a request id; when a newer detection has been
//! started, a completing older one is discarded instead of racing it for
//! the active-location slot.

pub mod geocoder;

pub use geocoder::{Geocoder, HttpGeocoder, RouteInfo};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared::geo::{self, Coordinates};
use shared::models::{AddressFields, DeliveryLocation, DeliveryOptions, LocationKind};
use shared::util::now_millis;
use thiserror::Error;

use crate::config::Config;
use crate::storage::LocalStore;

/// A device position fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub coordinates: Coordinates,
    pub accuracy_m: Option<f64>,
    /// When the fix was taken (millis); cached fixes may be old
    pub timestamp: i64,
}

/// Failures reported by a position source.
#[derive(Debug, Error)]
pub enum PositionError {
    #[error("position request denied")]
    Denied,
    #[error("position unavailable: {0}")]
    Unavailable(String),
}

/// Seam to the device geolocation API (owned by the UI host).
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn current_position(&self) -> Result<Position, PositionError>;
}

/// Outcome of a detection. `degraded` means the fixed restaurant position
/// was substituted for a real fix; callers surface that to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedLocation {
    pub location: DeliveryLocation,
    pub degraded: bool,
}

pub struct LocationProvider {
    source: Arc<dyn PositionSource>,
    geocoder: Arc<dyn Geocoder>,
    store: LocalStore,
    config: Config,
    /// Id of the most recently started detection; completions of older
    /// requests are discarded
    latest_request: AtomicU64,
    active: RwLock<Option<DeliveryLocation>>,
}

impl LocationProvider {
    pub fn new(
        source: Arc<dyn PositionSource>,
        geocoder: Arc<dyn Geocoder>,
        store: LocalStore,
        config: Config,
    ) -> Self {
        Self {
            source,
            geocoder,
            store,
            config,
            latest_request: AtomicU64::new(0),
            active: RwLock::new(None),
        }
    }

    /// The location currently treated as the delivery destination.
    pub fn active_location(&self) -> Option<DeliveryLocation> {
        self.active.read().clone()
    }

    /// The user picked a saved location explicitly; it overrides any
    /// auto-detected one and in-flight detections must not clobber it.
    pub fn choose_saved(&self, location: DeliveryLocation) {
        self.latest_request.fetch_add(1, Ordering::SeqCst);
        if let Err(e) = self
            .store
            .push_saved_location(&location, self.config.saved_locations_cap)
        {
            tracing::warn!(error = %e, "Failed to persist saved location");
        }
        *self.active.write() = Some(location);
    }

    /// Detect the device position and resolve it into the active delivery
    /// location. Bounded by the configured timeout; cached fixes older
    /// than the max age count as failures. Never errors: the restaurant
    /// position is the degraded fallback.
    pub async fn detect_current(&self) -> DetectedLocation {
        let request = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;

        let budget = Duration::from_millis(self.config.geolocation_timeout_ms);
        let position = match tokio::time::timeout(budget, self.source.current_position()).await {
            Ok(Ok(position)) => {
                let age = now_millis() - position.timestamp;
                if age <= self.config.geolocation_max_age_ms as i64 {
                    Some(position)
                } else {
                    tracing::warn!(age_ms = age, "Cached position too old, falling back");
                    None
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Geolocation failed, falling back");
                None
            }
            Err(_) => {
                tracing::warn!(budget_ms = self.config.geolocation_timeout_ms,
                    "Geolocation timed out, falling back");
                None
            }
        };

        let (coordinates, degraded) = match position {
            Some(p) => (p.coordinates, false),
            None => (self.config.restaurant_location, true),
        };

        let address = self.reverse_geocode(coordinates).await;
        let location = DeliveryLocation {
            address: address.display_name,
            notes: String::new(),
            created_at: now_millis(),
            coordinates,
            kind: LocationKind::Current,
            auto_detected: !degraded,
        };

        if self.latest_request.load(Ordering::SeqCst) == request {
            *self.active.write() = Some(location.clone());
            if let Err(e) = self
                .store
                .push_saved_location(&location, self.config.saved_locations_cap)
            {
                tracing::warn!(error = %e, "Failed to persist detected location");
            }
        } else {
            tracing::debug!(request, "Superseded detection discarded");
        }

        DetectedLocation { location, degraded }
    }

    /// Resolve coordinates into address text. Served from the local cache
    /// (keyed at ~11 m resolution) when possible; on a lookup failure the
    /// placeholder is returned. Never errors.
    pub async fn reverse_geocode(&self, coords: Coordinates) -> AddressFields {
        let key = coords.cache_key();
        if let Some(cached) = self.store.geocode_get(&key) {
            return cached;
        }

        match self.geocoder.reverse(coords).await {
            Ok(address) => {
                if let Err(e) = self.store.geocode_put(&key, &address) {
                    tracing::warn!(error = %e, "Failed to cache geocode result");
                }
                address
            }
            Err(e) => {
                tracing::warn!(error = %e, "Reverse geocoding failed, using placeholder");
                AddressFields::placeholder()
            }
        }
    }

    /// Straight-line distance, fee, and ETA for delivering to `coords`.
    pub fn delivery_options_for(&self, coords: Coordinates) -> DeliveryOptions {
        let distance_m = geo::distance_meters(coords, self.config.restaurant_location);
        DeliveryOptions {
            distance_m,
            fee: geo::delivery_fee(distance_m),
            eta_minutes: geo::estimated_eta_minutes(distance_m),
        }
    }

    /// Routed distance and duration from the restaurant to `destination`,
    /// falling back to the straight-line estimate when routing fails.
    pub async fn route_from_restaurant(&self, destination: Coordinates) -> RouteInfo {
        match self
            .geocoder
            .route(self.config.restaurant_location, destination)
            .await
        {
            Ok(route) => route,
            Err(e) => {
                tracing::warn!(error = %e, "Routing failed, using straight-line estimate");
                let distance_m = geo::distance_meters(self.config.restaurant_location, destination);
                RouteInfo {
                    distance_m,
                    duration_s: f64::from(geo::estimated_eta_minutes(distance_m)) * 60.0,
                }
            }
        }
    }
}
