//! Marula ordering engine
//!
//! The client-side core of the food-ordering app: cart, pricing, promos,
//! order lifecycle with offline fallback, and delivery-location handling.
//! The UI layer drives this crate and renders its outcomes; maps,
//! notification display, and the chat assistant stay out there.

pub mod cart;
pub mod config;
pub mod location;
pub mod logger;
pub mod orders;
pub mod payment;
pub mod pricing;
pub mod promo;
pub mod state;
pub mod storage;
pub mod validation;

pub use cart::CartStore;
pub use config::Config;
pub use orders::{CheckoutOutcome, OrderService, Persistence};
pub use pricing::PricingEngine;
pub use promo::PromoEngine;
pub use state::AppState;
pub use storage::LocalStore;
