//! Data models
//!
//! Shared between the core engine and the remote sync client. Money is
//! `f64` at rest (two decimal places); all arithmetic on it goes through
//! `rust_decimal` in the pricing layer.

pub mod cart;
pub mod location;
pub mod order;
pub mod profile;
pub mod promo;

// Re-exports
pub use cart::*;
pub use location::*;
pub use order::*;
pub use profile::*;
pub use promo::*;
