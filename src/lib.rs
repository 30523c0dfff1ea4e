//! A local edit overlay for read-only [Zarr V2](https://zarr.dev) hierarchies.
//!
//! `zarrs_overlay` lets an editor modify a remote, immutable Zarr hierarchy without ever writing to it directly.
//! Edits (attribute changes, new or removed groups, new or removed datasets) are recorded in an [`EditSet`](edits::EditSet),
//! every read through an [`OverlayGroup`](overlay::OverlayGroup) transparently reflects those edits,
//! and [`consolidate_edits`](consolidate::consolidate_edits) reduces the edits to the minimal set of objects to upload,
//! rewriting the consolidated `.zmetadata` document once.
//!
//! ## Overview
//! - [`node`]: node paths and names, and the path algebra used to relate them.
//! - [`storage`]: the store API, including an in-memory store.
//! - [`metadata`]: Zarr V2 array/group metadata, data types, and the consolidated metadata document.
//! - [`hierarchy`]: the read-only base group interface and a store-backed implementation.
//! - [`edits`]: the edit log and its actions.
//! - [`overlay`]: the overlay view and the editing session that owns the edit log.
//! - [`consolidate`]: the diff exporter.
//!
//! ## Example
//! ```rust
//! # use std::sync::Arc;
//! use zarrs_overlay::{
//!     hierarchy::{DatasetData, DatasetDataOptions, StoreGroup},
//!     overlay::EditSession,
//!     storage::store::MemoryStore,
//! };
//! # let store = Arc::new(MemoryStore::new());
//! # zarrs_overlay::storage::WritableStorageTraits::set(
//! #     &*store,
//! #     &".zmetadata".try_into()?,
//! #     r#"{"zarr_consolidated_format":1,"metadata":{".zgroup":{"zarr_format":2}}}"#.into(),
//! # )?;
//! let root = StoreGroup::open(store.clone())?;
//! let session = EditSession::new(Arc::new(root));
//!
//! let mut attrs = serde_json::Map::new();
//! attrs.insert("k".to_string(), 1.into());
//! session.root().create_group("g", attrs)?;
//!
//! let g = session.root().get_group("g")?.unwrap();
//! g.create_dataset(
//!     "d",
//!     DatasetData::Float32(vec![1.0, 2.0, 3.0, 4.0]),
//!     vec![4],
//!     "float32",
//!     serde_json::Map::new(),
//! )?;
//!
//! let g = session.root().get_group("g")?.unwrap();
//! let data = g.get_dataset_data("d", &DatasetDataOptions::default())?;
//! assert_eq!(data, Some(DatasetData::Float32(vec![1.0, 2.0, 3.0, 4.0])));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Features
//! #### Default
//!  - `gzip`: read `gzip` and `zlib` compressed chunks of base datasets.
//!
//! #### Non-Default
//!  - `zstd`: read `zstd` compressed chunks of base datasets.
//!  - `async`: asynchronous store traits for fetching `.zmetadata` and storing an upload payload.
//!
//! ## Licence
//! `zarrs_overlay` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.

#![warn(unused_variables)]
#![warn(dead_code)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![deny(clippy::missing_panics_doc)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod byte_range;
pub mod config;
pub mod consolidate;
pub mod edits;
pub mod hierarchy;
pub mod metadata;
pub mod node;
pub mod overlay;
pub mod storage;
