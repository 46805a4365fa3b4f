//! Unified error system for the Marula client
//!
//! - [`ErrorCode`]: standardized error codes for all error types
//! - [`ErrorCategory`]: classification of errors by domain, driving the
//!   propagation policy (recover in degraded mode vs. surface and block)
//! - [`AppError`]: rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Checkout validation errors
//! - 2xxx: Promo errors
//! - 3xxx: Payment errors
//! - 4xxx: Order errors
//! - 5xxx: Remote store errors
//! - 6xxx: Location errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::EmptyCart);
//! assert!(!err.is_recoverable());
//!
//! let err = AppError::validation("Missing required field")
//!     .with_detail("field", "phone");
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
