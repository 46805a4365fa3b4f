//! Geo utility
//!
//! Pure geometry and fee-schedule functions. No I/O, no state: everything
//! here is deterministic and unit-testable in isolation.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters (used by the Haversine formula).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Flat minimum delivery fee in currency units.
pub const MIN_DELIVERY_FEE: f64 = 10.0;

/// Distances up to this many meters are charged the flat minimum.
const FLAT_FEE_RANGE_M: f64 = 120.0;

/// Divisor of the linear fee schedule beyond the flat range.
const FEE_DIVISOR_M: f64 = 90.0;

/// Kitchen preparation time included in every ETA estimate.
const BASE_PREP_MINUTES: u32 = 15;

/// Travel time charged per started kilometer.
const TRAVEL_MINUTES_PER_KM: u32 = 2;

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Round both components to 4 decimal places (~11 m), the resolution
    /// used to key the reverse-geocoding cache.
    pub fn rounded_4dp(&self) -> Coordinates {
        Coordinates {
            lat: (self.lat * 10_000.0).round() / 10_000.0,
            lon: (self.lon * 10_000.0).round() / 10_000.0,
        }
    }

    /// Cache key string for the 4-dp rounded position.
    pub fn cache_key(&self) -> String {
        let r = self.rounded_4dp();
        format!("{:.4},{:.4}", r.lat, r.lon)
    }
}

/// Great-circle distance between two coordinates in meters (Haversine).
///
/// Symmetric, and `distance_meters(a, a) == 0`.
pub fn distance_meters(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Delivery fee for a given distance to the restaurant, in currency units.
///
/// Flat minimum within 120 m, then `ceil(distance / 90)` floored at the
/// minimum. Monotonic non-decreasing, never below [`MIN_DELIVERY_FEE`].
pub fn delivery_fee(distance_m: f64) -> f64 {
    if distance_m <= FLAT_FEE_RANGE_M {
        return MIN_DELIVERY_FEE;
    }
    (distance_m / FEE_DIVISOR_M).ceil().max(MIN_DELIVERY_FEE)
}

/// Estimated minutes until a delivery arrives: fixed preparation time plus
/// travel time per started kilometer.
pub fn estimated_eta_minutes(distance_m: f64) -> u32 {
    let km_started = (distance_m.max(0.0) / 1000.0).ceil() as u32;
    BASE_PREP_MINUTES + TRAVEL_MINUTES_PER_KM * km_started
}
