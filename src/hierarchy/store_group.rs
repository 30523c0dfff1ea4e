use std::{
    collections::{BTreeMap, BTreeSet},
    ops::Range,
    sync::Arc,
};

use ndarray::{ArrayViewD, ArrayViewMutD, Dimension, IxDyn, Slice};
use serde::Deserialize;

use crate::{
    byte_range::ByteRange,
    config::global_config,
    metadata::{
        is_metadata_file_name, num_elements, ArrayMetadataV2, ArrayMetadataV2Order, Attributes,
        ConsolidatedMetadata, MetadataV2,
    },
    node::{join_path, NodePath},
    storage::{
        data_key, get_consolidated_metadata, meta_key_v2_array, meta_key_v2_attributes,
        meta_key_v2_group, Bytes, ReadableStorage, StorageError, StoreKey,
    },
};

use super::{
    BaseGroup, BaseGroupTraits, DatasetData, DatasetDataOptions, DatasetInfo, HierarchyError,
    SubgroupInfo,
};

/// The consolidated metadata of a store, with child node paths indexed by parent path.
#[derive(Debug)]
struct ConsolidatedIndex {
    metadata: ConsolidatedMetadata,
    children: BTreeMap<NodePath, BTreeSet<NodePath>>,
}

impl ConsolidatedIndex {
    fn new(metadata: ConsolidatedMetadata) -> Self {
        let mut children: BTreeMap<NodePath, BTreeSet<NodePath>> = BTreeMap::new();
        for key in metadata.metadata.keys() {
            let (prefix, file_name) = key.rsplit_once('/').unwrap_or(("", key.as_str()));
            if !is_metadata_file_name(file_name) || prefix.is_empty() {
                continue;
            }
            let Ok(path) = NodePath::new(&format!("/{prefix}")) else {
                tracing::warn!("skipping metadata with an invalid node path: {key}");
                continue;
            };
            if let Some(parent) = path.parent() {
                children.entry(parent).or_default().insert(path);
            }
        }
        Self { metadata, children }
    }

    fn get(&self, key: &StoreKey) -> Option<&serde_json::Value> {
        self.metadata.get(key.as_str())
    }

    fn is_group(&self, path: &NodePath) -> bool {
        self.get(&meta_key_v2_group(path)).is_some()
    }

    fn attrs(&self, path: &NodePath) -> Attributes {
        match self.get(&meta_key_v2_attributes(path)) {
            Some(serde_json::Value::Object(attrs)) => attrs.clone(),
            Some(_) => {
                tracing::warn!("ignoring non-object attributes of {path}");
                Attributes::new()
            }
            None => Attributes::new(),
        }
    }

    fn array_metadata(&self, path: &NodePath) -> Result<Option<ArrayMetadataV2>, HierarchyError> {
        let key = meta_key_v2_array(path);
        self.get(&key)
            .map(|metadata| {
                ArrayMetadataV2::deserialize(metadata).map_err(|err| {
                    HierarchyError::InvalidMetadata(key.to_string(), err.to_string())
                })
            })
            .transpose()
    }
}

/// A group of a Zarr V2 hierarchy in a store with consolidated metadata.
///
/// All metadata is read from the consolidated metadata document (`.zmetadata`) when the store is opened,
/// and nodes absent from that document do not exist.
/// Dataset chunks are read on demand, through the `refs` of the document if the chunk is packed into a larger file.
///
/// Supported chunk encodings:
///  - no compressor,
///  - `gzip` and `zlib` (`gzip` feature), and
///  - `zstd` (`zstd` feature).
///
/// Filters and `F` order are not supported.
#[derive(Clone)]
pub struct StoreGroup {
    storage: ReadableStorage,
    index: Arc<ConsolidatedIndex>,
    path: NodePath,
}

impl core::fmt::Debug for StoreGroup {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StoreGroup")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl StoreGroup {
    /// Open the root group of the hierarchy in `storage`.
    ///
    /// # Errors
    /// Returns [`HierarchyError::MissingConsolidatedMetadata`] if the store has no `.zmetadata`,
    /// or a [`HierarchyError::StorageError`] if it cannot be read.
    pub fn open(storage: ReadableStorage) -> Result<Self, HierarchyError> {
        let metadata = get_consolidated_metadata(&*storage)?
            .ok_or(HierarchyError::MissingConsolidatedMetadata)?;
        Ok(Self::new_with_metadata(storage, metadata))
    }

    /// Create the root group of the hierarchy in `storage` described by already retrieved consolidated `metadata`.
    #[must_use]
    pub fn new_with_metadata(storage: ReadableStorage, metadata: ConsolidatedMetadata) -> Self {
        Self {
            storage,
            index: Arc::new(ConsolidatedIndex::new(metadata)),
            path: NodePath::root(),
        }
    }

    /// The consolidated metadata of the hierarchy.
    #[must_use]
    pub fn consolidated_metadata(&self) -> &ConsolidatedMetadata {
        &self.index.metadata
    }

    fn child_path(&self, name: &str) -> Option<NodePath> {
        NodePath::new(&join_path(self.path.as_str(), name)).ok()
    }

    fn children(&self) -> impl Iterator<Item = &NodePath> {
        self.index.children.get(&self.path).into_iter().flatten()
    }

    fn retrieve_encoded_chunk(
        &self,
        path: &NodePath,
        chunk_key: &str,
    ) -> Result<Option<Bytes>, HierarchyError> {
        let key = data_key(path, chunk_key);
        if let Some(chunk_ref) = self.index.metadata.chunk_ref(key.as_str()) {
            tracing::trace!(
                "reading chunk {key} from {} at {}+{}",
                chunk_ref.file(),
                chunk_ref.offset(),
                chunk_ref.length()
            );
            let file_key = StoreKey::new(chunk_ref.file()).map_err(StorageError::from)?;
            Ok(self
                .storage
                .get_partial_values_key(&file_key, &[ByteRange::from(chunk_ref)])?
                .and_then(|mut values| values.pop()))
        } else {
            tracing::trace!("reading chunk {key}");
            Ok(self.storage.get(&key)?)
        }
    }

    fn read_array(
        &self,
        path: &NodePath,
        metadata: &ArrayMetadataV2,
        slice: Option<&[Range<u64>]>,
    ) -> Result<DatasetData, HierarchyError> {
        if metadata.order == ArrayMetadataV2Order::F {
            return Err(HierarchyError::Unsupported(format!(
                "F order of dataset {path}"
            )));
        }
        if metadata.filters.as_ref().is_some_and(|filters| !filters.is_empty()) {
            return Err(HierarchyError::Unsupported(format!("filters of dataset {path}")));
        }
        let dimensionality = metadata.shape.len();
        if metadata.chunks.len() != dimensionality || metadata.chunks.contains(&0) {
            return Err(HierarchyError::InvalidMetadata(
                meta_key_v2_array(path).to_string(),
                "chunk shape is incompatible with the array shape".to_string(),
            ));
        }

        let region = slice_region(&metadata.shape, slice)?;
        let (data_type, endianness) = metadata.data_type()?;
        let element_size = data_type.size();
        let fill_value = metadata
            .fill_value
            .to_element_bytes(data_type, endianness)?;

        let too_large = || {
            HierarchyError::InvalidMetadata(
                meta_key_v2_array(path).to_string(),
                "the number of bytes exceeds the address space".to_string(),
            )
        };
        let region_shape: Vec<u64> = region.iter().map(|range| range.end - range.start).collect();
        let region_size = byte_size(&region_shape, element_size).ok_or_else(too_large)?;
        let chunk_size = byte_size(&metadata.chunks, element_size).ok_or_else(too_large)?;
        if region_size == 0 {
            return Ok(DatasetData::from_bytes(data_type, endianness, &[]));
        }
        let chunk_elements = chunk_size / element_size;

        let mut output = vec![0u8; region_size];
        let mut output_view = ArrayViewMutD::from_shape(
            element_shape(&region_shape, element_size),
            output.as_mut_slice(),
        )?;

        // chunks intersecting the region, relative to the first
        let chunk_start: Vec<u64> = region
            .iter()
            .zip(&metadata.chunks)
            .map(|(range, chunk)| range.start / chunk)
            .collect();
        let chunk_counts: Vec<usize> = region
            .iter()
            .zip(&metadata.chunks)
            .zip(&chunk_start)
            .map(|((range, chunk), start)| to_usize(range.end.div_ceil(*chunk) - start))
            .collect();
        for offset in ndarray::indices(chunk_counts) {
            let chunk_indices: Vec<u64> = chunk_start
                .iter()
                .zip(offset.slice())
                .map(|(start, &offset)| start + offset as u64)
                .collect();
            let chunk = self
                .decode_chunk(path, metadata, &chunk_indices, chunk_size)?
                .unwrap_or_else(|| fill_value.repeat(chunk_elements));
            copy_chunk_region(
                &chunk,
                &chunk_indices,
                &metadata.chunks,
                &region,
                &mut output_view,
            )?;
        }

        Ok(DatasetData::from_bytes(data_type, endianness, &output))
    }

    fn decode_chunk(
        &self,
        path: &NodePath,
        metadata: &ArrayMetadataV2,
        chunk_indices: &[u64],
        expected: usize,
    ) -> Result<Option<Vec<u8>>, HierarchyError> {
        let chunk_key = metadata.chunk_key(chunk_indices);
        let Some(encoded) = self.retrieve_encoded_chunk(path, &chunk_key)? else {
            return Ok(None);
        };
        let decoded = decompress(metadata.compressor.as_ref(), &encoded)?;
        if decoded.len() == expected {
            Ok(Some(decoded))
        } else {
            Err(HierarchyError::InvalidChunkSize {
                key: data_key(path, &chunk_key).to_string(),
                expected,
                actual: decoded.len(),
            })
        }
    }
}

impl BaseGroupTraits for StoreGroup {
    fn path(&self) -> &NodePath {
        &self.path
    }

    fn attrs(&self) -> Attributes {
        self.index.attrs(&self.path)
    }

    fn subgroups(&self) -> Vec<SubgroupInfo> {
        self.children()
            .filter(|path| self.index.is_group(path))
            .map(|path| SubgroupInfo {
                name: path.name().as_str().to_string(),
                path: path.clone(),
                attrs: self.index.attrs(path),
            })
            .collect()
    }

    fn datasets(&self) -> Vec<DatasetInfo> {
        self.children()
            .filter_map(|path| match self.index.array_metadata(path) {
                Ok(Some(metadata)) => Some(DatasetInfo::new(
                    path.clone(),
                    &metadata,
                    self.index.attrs(path),
                )),
                Ok(None) => None,
                Err(err) => {
                    tracing::warn!("skipping dataset {path}: {err}");
                    None
                }
            })
            .collect()
    }

    fn get_group(&self, name: &str) -> Result<Option<BaseGroup>, HierarchyError> {
        Ok(self
            .child_path(name)
            .filter(|path| self.index.is_group(path))
            .map(|path| -> BaseGroup {
                Arc::new(Self {
                    storage: self.storage.clone(),
                    index: self.index.clone(),
                    path,
                })
            }))
    }

    fn get_dataset(&self, name: &str) -> Result<Option<DatasetInfo>, HierarchyError> {
        let Some(path) = self.child_path(name) else {
            return Ok(None);
        };
        Ok(self
            .index
            .array_metadata(&path)?
            .map(|metadata| DatasetInfo::new(path.clone(), &metadata, self.index.attrs(&path))))
    }

    fn get_dataset_data(
        &self,
        name: &str,
        options: &DatasetDataOptions,
    ) -> Result<Option<DatasetData>, HierarchyError> {
        let Some(path) = self.child_path(name) else {
            return Ok(None);
        };
        let Some(metadata) = self.index.array_metadata(&path)? else {
            return Ok(None);
        };
        let data = self.read_array(&path, &metadata, options.slice.as_deref())?;
        if options.allow_big_int {
            Ok(Some(data))
        } else {
            Ok(Some(data.big_int_to_float64()))
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn to_usize(value: u64) -> usize {
    value as usize
}

/// Resolve a slice against `shape`. Dimensions without a range are read whole.
fn slice_region(
    shape: &[u64],
    slice: Option<&[Range<u64>]>,
) -> Result<Vec<Range<u64>>, HierarchyError> {
    let slice = slice.unwrap_or_default();
    let invalid = || HierarchyError::InvalidSlice(slice.to_vec(), shape.to_vec());
    if slice.len() > shape.len() || slice.len() > global_config().max_slice_dimensions() {
        return Err(invalid());
    }
    if slice
        .iter()
        .zip(shape)
        .any(|(range, &size)| range.start > range.end || range.end > size)
    {
        return Err(invalid());
    }
    Ok(shape
        .iter()
        .enumerate()
        .map(|(dim, &size)| slice.get(dim).cloned().unwrap_or(0..size))
        .collect())
}

/// The number of bytes of an array of `shape` with elements of `element_size` bytes, if addressable.
fn byte_size(shape: &[u64], element_size: usize) -> Option<usize> {
    num_elements(shape)
        .and_then(|elements| usize::try_from(elements).ok())
        .and_then(|elements| elements.checked_mul(element_size))
}

/// The shape of the byte view of an array of `shape`, with a trailing axis over the bytes of an element.
fn element_shape(shape: &[u64], element_size: usize) -> IxDyn {
    let shape: Vec<usize> = shape
        .iter()
        .map(|&size| to_usize(size))
        .chain(std::iter::once(element_size))
        .collect();
    IxDyn(&shape)
}

/// Copy the intersection of a decoded chunk and `region` into `output`, the byte view of `region`.
fn copy_chunk_region(
    chunk: &[u8],
    chunk_indices: &[u64],
    chunk_shape: &[u64],
    region: &[Range<u64>],
    output: &mut ArrayViewMutD<u8>,
) -> Result<(), HierarchyError> {
    let element_size = output.shape().last().copied().unwrap_or(1);
    let chunk = ArrayViewD::from_shape(element_shape(chunk_shape, element_size), chunk)?;

    let mut chunk_ranges = Vec::with_capacity(region.len() + 1);
    let mut output_ranges = Vec::with_capacity(region.len() + 1);
    for ((index, size), range) in chunk_indices.iter().zip(chunk_shape).zip(region) {
        let origin = index * size;
        let start = range.start.max(origin);
        let end = range.end.min(origin + size);
        chunk_ranges.push(to_usize(start - origin)..to_usize(end - origin));
        output_ranges.push(to_usize(start - range.start)..to_usize(end - range.start));
    }
    chunk_ranges.push(0..element_size);
    output_ranges.push(0..element_size);

    let source =
        chunk.slice_each_axis(|axis| Slice::from(chunk_ranges[axis.axis.index()].clone()));
    output
        .slice_each_axis_mut(|axis| Slice::from(output_ranges[axis.axis.index()].clone()))
        .assign(&source);
    Ok(())
}

fn decompress(compressor: Option<&MetadataV2>, encoded: &[u8]) -> Result<Vec<u8>, HierarchyError> {
    let Some(compressor) = compressor else {
        return Ok(encoded.to_vec());
    };
    match compressor.id() {
        #[cfg(feature = "gzip")]
        "gzip" => {
            use std::io::Read;
            let mut decoded = Vec::new();
            flate2::read::GzDecoder::new(encoded).read_to_end(&mut decoded)?;
            Ok(decoded)
        }
        #[cfg(feature = "gzip")]
        "zlib" => {
            use std::io::Read;
            let mut decoded = Vec::new();
            flate2::read::ZlibDecoder::new(encoded).read_to_end(&mut decoded)?;
            Ok(decoded)
        }
        #[cfg(feature = "zstd")]
        "zstd" => Ok(zstd::decode_all(encoded)?),
        id => Err(HierarchyError::Unsupported(format!("compressor {id}"))),
    }
}
