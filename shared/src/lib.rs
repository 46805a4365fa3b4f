//! Shared types for the Marula ordering client
//!
//! Domain models, the unified error system, the geo utility, and the
//! background-worker message protocol used across the workspace crates.

pub mod error;
pub mod geo;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCode};
pub use geo::Coordinates;
pub use message::{WorkerMessage, WorkerNotice};
