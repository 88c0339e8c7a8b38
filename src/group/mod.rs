//! Per-group device tracking.
//!
//! Each group owns two pieces of shared state:
//! - `latest`: a concurrent map from device id to its highest known state,
//!   updated with an atomic highest-wins upsert
//! - `index`: an immutable, ordered snapshot of `latest` published through an
//!   atomic handle and replaced wholesale by compare-and-swap
//!
//! Readers load the handle and scan the snapshot without blocking writers.
//! Writers that win the upsert rebuild the snapshot from `latest` and retry
//! the swap until it lands or their value is superseded.

mod snapshot;
mod store;

pub use snapshot::{GroupSnapshot, StateRange};
pub use store::GroupStore;
