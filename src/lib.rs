//! # Transaction Registry
//!
//! An in-process, concurrency-safe registry of the highest transaction number
//! each device has processed, partitioned by group. Used for idempotent,
//! at-least-once processing: before applying a transaction, check whether the
//! device already went past it.
//!
//! ## Core Concepts
//!
//! - **Groups**: independent partitions, created on first save
//! - **Highest wins**: a save with a number at or below the stored one is ignored
//! - **Snapshots**: each group publishes an immutable view ordered by number,
//!   swapped atomically so readers never block writers
//!
//! ## Example
//!
//! ```
//! use transaction_registry::Registry;
//!
//! let registry = Registry::new();
//! registry.save("billing", "device-1", 2)?;
//! registry.save("billing", "device-1", 1)?;
//! registry.save("billing", "device-2", 7)?;
//!
//! let caught_up: Vec<_> = registry
//!     .find("billing", 5)?
//!     .iter()
//!     .map(|state| state.id().to_string())
//!     .collect();
//! assert_eq!(caught_up, vec!["device-2"]);
//! assert_eq!(registry.get("billing", "device-1")?, Some(2));
//! # Ok::<(), transaction_registry::RegistryError>(())
//! ```

pub mod error;
pub mod group;
pub mod registry;
pub mod types;

// Re-exports
pub use error::{RegistryError, Result};
pub use group::{GroupSnapshot, GroupStore, StateRange};
pub use registry::{Registry, RegistryConfig};
pub use types::*;
