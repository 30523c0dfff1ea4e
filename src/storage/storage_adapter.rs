//! Storage adapters.
//!
//! An adapter wraps a store and exposes it through a different storage API.

#[cfg(feature = "async")]
pub mod sync_to_async;
