//! Byte encoding of blobs and the serde summary of a loaded result.

use crate::common::constants::F64_BYTES;
use crate::modules::batch::BatchAxis;
use crate::modules::result::SimulationResult;
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

/// Little-endian bytes of `values`, the layout the blob decoders read.
pub fn encode_f64_le(values: &[f64]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * F64_BYTES);
    for value in values {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Flatten an array in column-major order and encode it.
pub fn encode_column_major(array: &ArrayD<f64>) -> Vec<u8> {
    let values: Vec<f64> = array.t().iter().copied().collect();
    encode_f64_le(&values)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSummary {
    pub ntime: usize,
    pub nfreq: usize,
    pub f_step: f64,
    pub nspace: usize,
    pub nspace2: usize,
    pub ngrid: usize,
    pub volumetric: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAxisSummary {
    pub batch_index: usize,
    pub start: f64,
    pub destination: f64,
    pub length: usize,
    pub values: Vec<f64>,
}

impl From<&BatchAxis> for BatchAxisSummary {
    fn from(axis: &BatchAxis) -> Self {
        Self {
            batch_index: axis.batch_index,
            start: axis.start,
            destination: axis.destination,
            length: axis.values.len(),
            values: axis.values.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub source_kind: String,
    pub grid: GridSummary,
    pub nsims: usize,
    pub nsims2: usize,
    pub symmetry_type: i64,
    pub batch_axis: BatchAxisSummary,
    pub batch_axis2: BatchAxisSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_shape: Option<Vec<usize>>,
    pub spectrum_shape: Vec<usize>,
}

impl ResultSummary {
    pub fn from_result(result: &SimulationResult) -> Self {
        let grid = &result.grid;
        Self {
            source_kind: result.source_kind.as_str().to_string(),
            grid: GridSummary {
                ntime: grid.ntime,
                nfreq: grid.nfreq,
                f_step: grid.f_step,
                nspace: grid.nspace,
                nspace2: grid.nspace2,
                ngrid: grid.ngrid,
                volumetric: grid.volumetric,
            },
            nsims: result.batch.nsims,
            nsims2: result.batch.nsims2,
            symmetry_type: result.parameters.symmetry_type(),
            batch_axis: BatchAxisSummary::from(&result.batch_axis),
            batch_axis2: BatchAxisSummary::from(&result.batch_axis2),
            ext_shape: result.ext_x.as_ref().map(|array| array.shape().to_vec()),
            spectrum_shape: result.spectrum_total.shape().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{encode_column_major, encode_f64_le};
    use crate::modules::decode::decode_f64_prefix;
    use ndarray::{ArrayD, IxDyn};

    #[test]
    fn encodes_little_endian_doubles() {
        let bytes = encode_f64_le(&[1.0, -2.5]);
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[..8], &1.0_f64.to_le_bytes());
        assert_eq!(
            decode_f64_prefix(&bytes, 2, "inline").expect("bytes should decode"),
            vec![1.0, -2.5]
        );
    }

    #[test]
    fn column_major_encoding_varies_first_axis_fastest() {
        let array = ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0])
            .expect("shape should match");
        let bytes = encode_column_major(&array);
        let values = decode_f64_prefix(&bytes, 6, "inline").expect("bytes should decode");
        assert_eq!(values, vec![0.0, 10.0, 1.0, 11.0, 2.0, 12.0]);
    }
}
