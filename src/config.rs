//! Global configuration options.

use std::sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Global configuration options for the `zarrs_overlay` crate.
///
/// Retrieve the global [`Config`] with [`global_config`] and modify it with [`global_config_mut`].
///
/// ## Metadata Pretty Print
/// > default: [`true`]
///
/// If enabled, metadata written by the edit log (`.zgroup`, `.zattrs`, `.zarray`) and the rewritten consolidated
/// metadata document (`.zmetadata`) are serialised with two space indentation, otherwise they are compact.
///
/// ## Max Slice Dimensions
/// > default: `3`
///
/// The maximum number of dimensions that a slice of a base dataset may restrict at a time.
/// Requests with more slice ranges are rejected.
#[derive(Debug)]
pub struct Config {
    metadata_pretty_print: bool,
    max_slice_dimensions: usize,
}

#[allow(clippy::derivable_impls)]
impl Default for Config {
    fn default() -> Self {
        Config {
            metadata_pretty_print: true,
            max_slice_dimensions: 3,
        }
    }
}

impl Config {
    /// Get the [metadata pretty print](#metadata-pretty-print) configuration.
    #[must_use]
    pub fn metadata_pretty_print(&self) -> bool {
        self.metadata_pretty_print
    }

    /// Set the [metadata pretty print](#metadata-pretty-print) configuration.
    pub fn set_metadata_pretty_print(&mut self, metadata_pretty_print: bool) {
        self.metadata_pretty_print = metadata_pretty_print;
    }

    /// Get the [max slice dimensions](#max-slice-dimensions) configuration.
    #[must_use]
    pub fn max_slice_dimensions(&self) -> usize {
        self.max_slice_dimensions
    }

    /// Set the [max slice dimensions](#max-slice-dimensions) configuration.
    pub fn set_max_slice_dimensions(&mut self, max_slice_dimensions: usize) {
        self.max_slice_dimensions = max_slice_dimensions;
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Returns a reference to the global configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global config is already held by the current thread.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .read()
        .unwrap()
}

/// Returns a mutable reference to the global configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global config is already held by the current thread.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .write()
        .unwrap()
}

/// Serialise metadata to JSON, respecting the [metadata pretty print](Config#metadata-pretty-print) configuration.
pub(crate) fn metadata_to_string<T: serde::Serialize + ?Sized>(
    value: &T,
) -> Result<String, serde_json::Error> {
    if global_config().metadata_pretty_print() {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
