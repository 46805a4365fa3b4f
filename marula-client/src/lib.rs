//! Remote store sync client
//!
//! Wraps the hosted real-time key-value database behind a small client:
//! connection-state tracking, bounded retry with capped exponential
//! backoff, and write-once order persistence. The core treats every
//! failure here as recoverable; local storage is the fallback.

mod client;
mod config;
mod error;

pub use client::{ConnectionState, RemoteStore};
pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
