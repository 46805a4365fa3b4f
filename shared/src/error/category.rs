//! Error category classification

use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the code range:
/// - 0xxx: General errors
/// - 1xxx: Checkout validation errors
/// - 2xxx: Promo errors
/// - 3xxx: Payment errors
/// - 4xxx: Order errors
/// - 5xxx: Remote store errors
/// - 6xxx: Location errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Checkout validation errors (1xxx)
    Checkout,
    /// Promo errors (2xxx)
    Promo,
    /// Payment errors (3xxx)
    Payment,
    /// Order errors (4xxx)
    Order,
    /// Remote store errors (5xxx)
    Remote,
    /// Location errors (6xxx)
    Location,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Checkout,
            2000..3000 => Self::Promo,
            3000..4000 => Self::Payment,
            4000..5000 => Self::Order,
            5000..6000 => Self::Remote,
            6000..7000 => Self::Location,
            _ => Self::System,
        }
    }

    /// Whether errors of this category are recovered automatically
    /// (degraded mode) rather than blocking the user's flow.
    ///
    /// Remote failures fall back to local persistence; location failures
    /// fall back to the fixed restaurant position and placeholder
    /// addresses. Everything else must be surfaced.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Remote | Self::Location)
    }
}
