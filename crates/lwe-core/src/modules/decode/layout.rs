use crate::common::constants::F64_BYTES;
use crate::domain::{LweError, LweResult};

/// Column-major (first index fastest) mapping from a multi-dimensional index
/// to a flat element offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMajorLayout {
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl ColumnMajorLayout {
    pub fn new(shape: &[usize]) -> Self {
        let mut strides = Vec::with_capacity(shape.len());
        let mut stride = 1;
        for extent in shape {
            strides.push(stride);
            stride *= extent;
        }
        Self {
            shape: shape.to_vec(),
            strides,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn offset(&self, index: &[usize]) -> usize {
        debug_assert_eq!(index.len(), self.shape.len());
        index
            .iter()
            .zip(&self.strides)
            .map(|(position, stride)| position * stride)
            .sum()
    }
}

/// Decode the first `required` little-endian doubles of `bytes`.
///
/// Trailing bytes past the declared element count are never touched.
pub fn decode_f64_prefix(bytes: &[u8], required: usize, resource: &str) -> LweResult<Vec<f64>> {
    let available = bytes.len() / F64_BYTES;
    if available < required {
        return Err(LweError::truncated(resource, required, available));
    }

    Ok(bytes[..required * F64_BYTES]
        .chunks_exact(F64_BYTES)
        .map(|chunk| {
            let mut word = [0_u8; F64_BYTES];
            word.copy_from_slice(chunk);
            f64::from_le_bytes(word)
        })
        .collect())
}

/// Element count of a blob whose extents are `factors` followed by the two
/// batch multiplicities. Fails when the count, or its size in bytes, does not
/// fit in `usize`.
pub(super) fn checked_value_count(
    factors: &[usize],
    nsims: usize,
    nsims2: usize,
    blob: &str,
) -> LweResult<usize> {
    let count = factors
        .iter()
        .chain([nsims, nsims2].iter())
        .try_fold(1_usize, |count, extent| count.checked_mul(*extent));
    count
        .filter(|count| count.checked_mul(F64_BYTES).is_some())
        .ok_or_else(|| {
            LweError::invalid_grid(format!(
                "{blob} blob size overflows for extents {factors:?} with Nsims={nsims}, Nsims2={nsims2}"
            ))
        })
}

/// Extents of the batch axes that survive collapsing singleton dimensions.
pub(super) fn kept_batch_extents(nsims: usize, nsims2: usize) -> Vec<usize> {
    [nsims, nsims2]
        .into_iter()
        .filter(|extent| *extent > 1)
        .collect()
}

/// Expand a collapsed batch index back to `[sim, sim2]`.
pub(super) fn expand_batch_index(collapsed: &[usize], nsims: usize, nsims2: usize) -> [usize; 2] {
    let mut remaining = collapsed.iter().copied();
    let sim = if nsims > 1 {
        remaining.next().unwrap_or(0)
    } else {
        0
    };
    let sim2 = if nsims2 > 1 {
        remaining.next().unwrap_or(0)
    } else {
        0
    };
    [sim, sim2]
}
