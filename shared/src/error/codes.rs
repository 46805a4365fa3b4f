//! Unified error codes for the Marula client
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Checkout validation errors
//! - 2xxx: Promo errors
//! - 3xxx: Payment errors
//! - 4xxx: Order errors
//! - 5xxx: Remote store errors
//! - 6xxx: Location errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (the order history is also read by web
/// tooling against the hosted store).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Checkout validation ====================
    /// Cart has no lines
    EmptyCart = 1001,
    /// No customer profile exists yet
    ProfileMissing = 1002,
    /// Delivery selected but no delivery location set
    DeliveryLocationMissing = 1003,
    /// Profile fields failed validation
    ProfileInvalid = 1004,

    // ==================== 2xxx: Promo ====================
    /// Promo code not in the rule table
    InvalidPromoCode = 2001,
    /// Subtotal below the promo's minimum order
    MinimumOrderNotMet = 2002,

    // ==================== 3xxx: Payment ====================
    /// Payment proof file rejected (type or size)
    PaymentProofInvalid = 3001,
    /// Neither a proof upload nor an explicit confirmation was given
    PaymentUnconfirmed = 3002,

    // ==================== 4xxx: Order ====================
    /// Order id not present in local history
    OrderNotFound = 4001,
    /// Requested status change violates the state machine
    InvalidStatusTransition = 4002,
    /// Order already completed or cancelled
    OrderAlreadyTerminal = 4003,

    // ==================== 5xxx: Remote store ====================
    /// Remote store unreachable or returned a server error
    RemoteUnavailable = 5001,
    /// Remote store rejected the write
    RemotePermissionDenied = 5002,
    /// Remote request exceeded its budget
    RemoteTimeout = 5003,

    // ==================== 6xxx: Location ====================
    /// Device position could not be obtained
    GeolocationUnavailable = 6001,
    /// User denied the position request
    GeolocationDenied = 6002,
    /// Reverse geocoding failed
    GeocodingFailed = 6003,
    /// Route lookup failed
    RoutingFailed = 6004,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Local storage failure
    StorageError = 9401,
    /// Serialization failure
    SerializationError = 9402,
}

impl ErrorCode {
    /// Numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Default human-readable message for this code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::InvalidRequest => "Invalid request",

            Self::EmptyCart => "Your cart is empty",
            Self::ProfileMissing => "Please create your profile before ordering",
            Self::DeliveryLocationMissing => "Please set a delivery location",
            Self::ProfileInvalid => "Profile details are invalid",

            Self::InvalidPromoCode => "Invalid promo code",
            Self::MinimumOrderNotMet => "Order total is below the promo minimum",

            Self::PaymentProofInvalid => "Payment screenshot was rejected",
            Self::PaymentUnconfirmed => "Please confirm that payment was completed",

            Self::OrderNotFound => "Order not found",
            Self::InvalidStatusTransition => "Order status change not allowed",
            Self::OrderAlreadyTerminal => "Order is already completed or cancelled",

            Self::RemoteUnavailable => "Could not reach the order server",
            Self::RemotePermissionDenied => "The order server rejected the request",
            Self::RemoteTimeout => "The order server took too long to respond",

            Self::GeolocationUnavailable => "Could not detect your location",
            Self::GeolocationDenied => "Location access was denied",
            Self::GeocodingFailed => "Could not look up the address",
            Self::RoutingFailed => "Could not compute the delivery route",

            Self::InternalError => "Internal error",
            Self::StorageError => "Local storage error",
            Self::SerializationError => "Data encoding error",
        }
    }

    /// Category derived from the code range
    pub fn category(&self) -> super::ErrorCategory {
        super::ErrorCategory::from_code(self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code as u16
    }
}

/// Error returned when a u16 does not map to a known [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Unknown),
            2 => Ok(Self::ValidationFailed),
            3 => Ok(Self::NotFound),
            5 => Ok(Self::InvalidRequest),
            1001 => Ok(Self::EmptyCart),
            1002 => Ok(Self::ProfileMissing),
            1003 => Ok(Self::DeliveryLocationMissing),
            1004 => Ok(Self::ProfileInvalid),
            2001 => Ok(Self::InvalidPromoCode),
            2002 => Ok(Self::MinimumOrderNotMet),
            3001 => Ok(Self::PaymentProofInvalid),
            3002 => Ok(Self::PaymentUnconfirmed),
            4001 => Ok(Self::OrderNotFound),
            4002 => Ok(Self::InvalidStatusTransition),
            4003 => Ok(Self::OrderAlreadyTerminal),
            5001 => Ok(Self::RemoteUnavailable),
            5002 => Ok(Self::RemotePermissionDenied),
            5003 => Ok(Self::RemoteTimeout),
            6001 => Ok(Self::GeolocationUnavailable),
            6002 => Ok(Self::GeolocationDenied),
            6003 => Ok(Self::GeocodingFailed),
            6004 => Ok(Self::RoutingFailed),
            9001 => Ok(Self::InternalError),
            9401 => Ok(Self::StorageError),
            9402 => Ok(Self::SerializationError),
            other => Err(InvalidErrorCode(other)),
        }
    }
}

// Display as "E<code>" for log correlation
impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
