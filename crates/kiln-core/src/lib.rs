//! Kiln Core - Foundational types for the Kiln runtime
//!
//! This crate provides the core types that all other Kiln crates depend on:
//! - `AssetId`, `AppId` - Stable identifiers
//! - `Color` - RGBA color used for placeholder resources
//! - `EventBus` - queued notifications drained by consumers
//! - Error types and Result alias

mod error;
mod event_bus;
mod id;
mod types;

pub use error::{KilnError, Result};
pub use event_bus::EventBus;
pub use id::{AppId, AssetId};
pub use types::Color;
