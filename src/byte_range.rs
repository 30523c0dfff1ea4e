//! Byte ranges.
//!
//! A [`ByteRange`] selects part of a stored value, such as a chunk that the consolidated metadata document
//! maps into a larger packed file (see [`ChunkRef`]).

use std::ops::Range;

use bytes::Bytes;
use thiserror::Error;

use crate::metadata::ChunkRef;

/// A byte range from the start of a value.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ByteRange {
    offset: u64,
    length: Option<u64>,
}

impl ByteRange {
    /// The whole value.
    pub const ALL: Self = Self {
        offset: 0,
        length: None,
    };

    /// Create a byte range of `length` bytes at `offset`.
    ///
    /// If `length` is [`None`], the range extends to the end of the value.
    #[must_use]
    pub const fn new(offset: u64, length: Option<u64>) -> Self {
        Self { offset, length }
    }

    /// The range of bytes selected in a value of `size` bytes, or [`None`] if it lies beyond the end of the value.
    #[must_use]
    pub fn to_range(&self, size: u64) -> Option<Range<u64>> {
        let end = match self.length {
            Some(length) => self.offset.checked_add(length)?,
            None => size,
        };
        (self.offset <= end && end <= size).then_some(self.offset..end)
    }
}

impl From<&ChunkRef> for ByteRange {
    fn from(chunk_ref: &ChunkRef) -> Self {
        Self::new(chunk_ref.offset(), Some(chunk_ref.length()))
    }
}

/// An invalid byte range error.
#[derive(Copy, Clone, Debug, Error)]
#[error("byte range {range:?} is out of bounds for a value of length {size}")]
pub struct InvalidByteRangeError {
    range: ByteRange,
    size: u64,
}

/// Extract byte ranges from bytes.
///
/// The returned values share the allocation of `bytes`.
///
/// # Errors
/// Returns [`InvalidByteRangeError`] if any bytes are requested beyond the end of `bytes`.
pub fn extract_byte_ranges(
    bytes: &Bytes,
    byte_ranges: &[ByteRange],
) -> Result<Vec<Bytes>, InvalidByteRangeError> {
    let size = bytes.len() as u64;
    byte_ranges
        .iter()
        .map(|&range| {
            let Some(selected) = range.to_range(size) else {
                return Err(InvalidByteRangeError { range, size });
            };
            // in-bounds ranges of an in-memory value always fit in usize
            #[allow(clippy::cast_possible_truncation)]
            Ok(bytes.slice(selected.start as usize..selected.end as usize))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_range_bounds() {
        assert_eq!(ByteRange::ALL.to_range(10), Some(0..10));
        assert_eq!(ByteRange::new(1, None).to_range(10), Some(1..10));
        assert_eq!(ByteRange::new(1, Some(5)).to_range(6), Some(1..6));
        assert_eq!(ByteRange::new(1, Some(5)).to_range(2), None);
        assert_eq!(ByteRange::new(11, None).to_range(10), None);
        assert_eq!(ByteRange::new(1, Some(u64::MAX)).to_range(10), None);
    }

    #[test]
    fn byte_range_from_chunk_ref() {
        let chunk_ref = ChunkRef("_consolidated_0.dat".to_string(), 16, 8);
        assert_eq!(ByteRange::from(&chunk_ref).to_range(32), Some(16..24));
    }

    #[test]
    fn byte_range_extract() -> Result<(), Box<dyn std::error::Error>> {
        let bytes = Bytes::from_static(&[1, 2, 3]);
        assert_eq!(
            extract_byte_ranges(&bytes, &[ByteRange::new(1, Some(2)), ByteRange::ALL])?,
            vec![Bytes::from_static(&[2, 3]), Bytes::from_static(&[1, 2, 3])]
        );
        assert!(extract_byte_ranges(&bytes, &[ByteRange::new(1, Some(4))]).is_err());
        Ok(())
    }
}
