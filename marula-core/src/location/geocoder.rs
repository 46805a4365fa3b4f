//! Reverse geocoding and routing over HTTP
//!
//! Both services are best-effort collaborators: the provider falls back to
//! cached addresses and straight-line distances when they fail.

use async_trait::async_trait;
use serde::Deserialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::geo::Coordinates;
use shared::models::AddressFields;
use std::time::Duration;

use crate::config::Config;

/// Path summary returned by the routing service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteInfo {
    pub distance_m: f64,
    pub duration_s: f64,
}

/// Seam to the geocoding/routing HTTP APIs, injectable for tests.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn reverse(&self, coords: Coordinates) -> AppResult<AddressFields>;
    async fn route(&self, origin: Coordinates, destination: Coordinates) -> AppResult<RouteInfo>;
}

/// Nominatim-style reverse geocoding + OSRM-style routing.
pub struct HttpGeocoder {
    http: reqwest::Client,
    geocoder_base_url: String,
    routing_base_url: String,
}

impl HttpGeocoder {
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent("marula-client/0.1")
            .timeout(Duration::from_secs(8))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            geocoder_base_url: config.geocoder_base_url.trim_end_matches('/').to_string(),
            routing_base_url: config.routing_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: String,
    #[serde(default)]
    address: ReverseAddress,
}

#[derive(Debug, Deserialize, Default)]
struct ReverseAddress {
    road: Option<String>,
    suburb: Option<String>,
    city: Option<String>,
    town: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    routes: Vec<RouteLeg>,
}

#[derive(Debug, Deserialize)]
struct RouteLeg {
    /// Meters
    distance: f64,
    /// Seconds
    duration: f64,
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn reverse(&self, coords: Coordinates) -> AppResult<AddressFields> {
        let url = format!(
            "{}/reverse?format=jsonv2&lat={}&lon={}",
            self.geocoder_base_url, coords.lat, coords.lon
        );
        let response: ReverseResponse = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::with_message(ErrorCode::GeocodingFailed, e.to_string()))?
            .json()
            .await
            .map_err(|e| AppError::with_message(ErrorCode::GeocodingFailed, e.to_string()))?;

        Ok(AddressFields {
            road: response.address.road,
            suburb: response.address.suburb,
            city: response.address.city.or(response.address.town),
            country: response.address.country,
            display_name: response.display_name,
        })
    }

    async fn route(&self, origin: Coordinates, destination: Coordinates) -> AppResult<RouteInfo> {
        // OSRM takes lon,lat pairs
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}?overview=false",
            self.routing_base_url, origin.lon, origin.lat, destination.lon, destination.lat
        );
        let response: RouteResponse = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::with_message(ErrorCode::RoutingFailed, e.to_string()))?
            .json()
            .await
            .map_err(|e| AppError::with_message(ErrorCode::RoutingFailed, e.to_string()))?;

        let leg = response
            .routes
            .first()
            .ok_or_else(|| AppError::with_message(ErrorCode::RoutingFailed, "no route found"))?;
        Ok(RouteInfo {
            distance_m: leg.distance,
            duration_s: leg.duration,
        })
    }
}
