//! Delivery location and service mode models

use crate::geo::Coordinates;
use serde::{Deserialize, Serialize};

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceMode {
    /// Customer collects at the restaurant
    #[default]
    Pickup,
    /// Courier delivery to a location
    Delivery,
}

/// Origin of a saved location entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationKind {
    /// Auto-detected device position (at most one in the history)
    Current,
    /// Explicitly saved by the customer
    Saved,
}

/// A delivery destination with its resolved address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryLocation {
    /// Resolved or user-entered address text
    pub address: String,
    /// Courier notes ("gate code 1234", possibly empty)
    #[serde(default)]
    pub notes: String,
    /// Creation timestamp (millis)
    pub created_at: i64,
    pub coordinates: Coordinates,
    pub kind: LocationKind,
    /// Whether the position came from device geolocation
    pub auto_detected: bool,
}

/// The user's current fulfilment choice: pickup or delivery, and where.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DeliverySelection {
    pub mode: ServiceMode,
    /// Active delivery destination; must be set before a delivery checkout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<DeliveryLocation>,
}

impl DeliverySelection {
    pub fn is_delivery(&self) -> bool {
        self.mode == ServiceMode::Delivery
    }

    /// Post-checkout reset: back to pickup with no destination.
    pub fn reset_to_pickup(&mut self) {
        self.mode = ServiceMode::Pickup;
        self.location = None;
    }
}

/// Address fields returned by reverse geocoding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AddressFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub road: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suburb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Single display line composed by the geocoder
    pub display_name: String,
}

impl AddressFields {
    /// Placeholder used when geocoding fails and no cached entry exists.
    pub fn placeholder() -> Self {
        Self {
            road: None,
            suburb: None,
            city: None,
            country: Some("Zambia".to_string()),
            display_name: "Unknown location, Zambia".to_string(),
        }
    }
}

/// Distance, fee, and ETA for delivering to a position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DeliveryOptions {
    pub distance_m: f64,
    pub fee: f64,
    pub eta_minutes: u32,
}
