//! Stable asset and application identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating unique asset IDs
static NEXT_ASSET_ID: AtomicU64 = AtomicU64::new(1);

/// Global counter for application instances
static NEXT_APP_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of an addressable resource owned by a provider.
///
/// Material data refers to its dependencies either by this id or by path.
/// Ids survive reloads of the underlying resource.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub u64);

impl AssetId {
    /// Create a new unique AssetId
    pub fn new() -> Self {
        Self(NEXT_ASSET_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Create an AssetId from a raw value (for deserialization/testing)
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Set the counter to at least the given value (for registering ids read from data)
    pub fn ensure_counter_above(value: u64) {
        let mut current = NEXT_ASSET_ID.load(Ordering::Relaxed);
        while current <= value {
            match NEXT_ASSET_ID.compare_exchange_weak(
                current,
                value + 1,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(c) => current = c,
            }
        }
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", self.0)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle identifying one application instance in the process-wide registry
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct AppId(u64);

impl AppId {
    /// Allocate the next application id
    pub fn next() -> Self {
        Self(NEXT_APP_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "app#{}", self.0)
    }
}
