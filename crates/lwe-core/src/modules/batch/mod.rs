//! Scan axes of a batch run.
//!
//! The launcher stores the scanned quantity as an enumerated batch index and
//! the scan end point in launcher units. The start point is the current
//! value of the scanned parameter, already in SI units.

use crate::common::constants::{
    DEG_TO_RAD, FEMTO, FEMTO_CUBED, FEMTO_SQUARED, HALF_TURN, MICRO, NANO, TERA,
};
use crate::common::schema::{Parameter, ParameterSet};
use crate::domain::{LweError, LweResult};
use crate::numerics::linspace;

pub const BATCH_AXIS_COUNT: usize = 38;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchAxisSpec {
    pub source: Option<Parameter>,
    pub unit_scale: f64,
}

const fn axis(source: Parameter, unit_scale: f64) -> BatchAxisSpec {
    BatchAxisSpec {
        source: Some(source),
        unit_scale,
    }
}

const UNSOURCED: BatchAxisSpec = BatchAxisSpec {
    source: None,
    unit_scale: 1.0,
};

pub static BATCH_AXIS_TABLE: [BatchAxisSpec; BATCH_AXIS_COUNT] = [
    UNSOURCED,
    axis(Parameter::PulseEnergy1, 1.0),
    axis(Parameter::PulseEnergy2, 1.0),
    axis(Parameter::Frequency1, TERA),
    axis(Parameter::Frequency2, TERA),
    // Bandwidth scans start from the carrier frequency, as the launcher does.
    axis(Parameter::Frequency1, TERA),
    axis(Parameter::Frequency2, TERA),
    axis(Parameter::CePhase1, HALF_TURN),
    axis(Parameter::CePhase2, HALF_TURN),
    axis(Parameter::Delay1, FEMTO),
    axis(Parameter::Delay2, FEMTO),
    axis(Parameter::Gdd1, FEMTO_SQUARED),
    axis(Parameter::Gdd2, FEMTO_SQUARED),
    axis(Parameter::Tod1, FEMTO_CUBED),
    axis(Parameter::Tod2, FEMTO_CUBED),
    axis(Parameter::PhaseMaterialThickness1, MICRO),
    axis(Parameter::PhaseMaterialThickness2, MICRO),
    axis(Parameter::Beamwaist1, MICRO),
    axis(Parameter::Beamwaist2, MICRO),
    axis(Parameter::X01, MICRO),
    axis(Parameter::X02, MICRO),
    axis(Parameter::Z01, MICRO),
    axis(Parameter::Z02, MICRO),
    axis(Parameter::PropagationAngle1, DEG_TO_RAD),
    axis(Parameter::PropagationAngle2, DEG_TO_RAD),
    axis(Parameter::PolarizationAngle1, DEG_TO_RAD),
    axis(Parameter::PolarizationAngle2, DEG_TO_RAD),
    axis(Parameter::Circularity1, 1.0),
    axis(Parameter::Circularity2, 1.0),
    axis(Parameter::CrystalTheta, DEG_TO_RAD),
    axis(Parameter::CrystalPhi, DEG_TO_RAD),
    axis(Parameter::NonlinearAbsorptionStrength, 1.0),
    axis(Parameter::DrudeGamma, TERA),
    axis(Parameter::EffectiveMass, 1.0),
    axis(Parameter::CrystalThickness, MICRO),
    axis(Parameter::PropagationStep, NANO),
    UNSOURCED,
    UNSOURCED,
];

pub fn batch_axis_spec(batch_index: i64) -> LweResult<&'static BatchAxisSpec> {
    usize::try_from(batch_index)
        .ok()
        .and_then(|index| BATCH_AXIS_TABLE.get(index))
        .ok_or_else(|| LweError::unknown_batch_axis(batch_index))
}

/// The two independent scan slots of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchSlot {
    Primary,
    Secondary,
}

impl BatchSlot {
    const fn index_parameter(self) -> Parameter {
        match self {
            Self::Primary => Parameter::BatchIndex,
            Self::Secondary => Parameter::BatchIndex2,
        }
    }

    const fn destination_parameter(self) -> Parameter {
        match self {
            Self::Primary => Parameter::BatchDestination,
            Self::Secondary => Parameter::BatchDestination2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchAxis {
    pub batch_index: usize,
    pub start: f64,
    /// End point in SI units, after the unit scale was applied.
    pub destination: f64,
    /// End point as written in the manifest, in launcher units.
    pub manifest_destination: f64,
    pub values: Vec<f64>,
}

pub fn reconstruct_batch_axis(
    parameters: &ParameterSet,
    slot: BatchSlot,
    count: usize,
) -> LweResult<BatchAxis> {
    let batch_index = parameters.integral(slot.index_parameter());
    let spec = batch_axis_spec(batch_index)?;

    let start = spec
        .source
        .map_or(0.0, |parameter| parameters.get(parameter));
    let manifest_destination = parameters.get(slot.destination_parameter());
    let destination = manifest_destination * spec.unit_scale;

    Ok(BatchAxis {
        batch_index: batch_index as usize,
        start,
        destination,
        manifest_destination,
        values: linspace(start, destination, count),
    })
}

#[cfg(test)]
mod tests {
    use super::{
        BATCH_AXIS_COUNT, BATCH_AXIS_TABLE, BatchSlot, batch_axis_spec, reconstruct_batch_axis,
    };
    use crate::common::schema::{Parameter, ParameterSet};
    use crate::domain::LweErrorKind;

    fn scan(batch_index: f64, destination: f64) -> ParameterSet {
        let mut parameters = ParameterSet::default();
        for (offset, parameter) in Parameter::ALL.iter().enumerate() {
            parameters.set(*parameter, 1.0 + offset as f64);
        }
        parameters.set(Parameter::BatchIndex, batch_index);
        parameters.set(Parameter::BatchDestination, destination);
        parameters.set(Parameter::BatchIndex2, 0.0);
        parameters.set(Parameter::BatchDestination2, destination);
        parameters
    }

    #[test]
    fn delay_scan_converts_femtoseconds() {
        let mut parameters = scan(9.0, 10.0);
        parameters.set(Parameter::Delay1, 5.0);

        let axis = reconstruct_batch_axis(&parameters, BatchSlot::Primary, 3)
            .expect("axis should reconstruct");
        let destination = 10.0 * 1.0e-15;
        assert_eq!(axis.start, 5.0);
        assert!((axis.destination - destination).abs() <= 1.0e-30);
        assert_eq!(axis.values.len(), 3);
        assert_eq!(axis.values[0], 5.0);
        assert_eq!(axis.values[1], 5.0 + (destination - 5.0) / 2.0);
        assert_eq!(axis.values[2], axis.destination);
    }

    #[test]
    fn every_table_entry_produces_a_monotonic_axis() {
        for batch_index in 0..BATCH_AXIS_COUNT {
            let parameters = scan(batch_index as f64, 1.0e3);
            let spec = BATCH_AXIS_TABLE[batch_index];
            let axis = reconstruct_batch_axis(&parameters, BatchSlot::Primary, 5)
                .expect("axis should reconstruct");

            let expected_start = spec.source.map_or(0.0, |parameter| parameters.get(parameter));
            assert_eq!(axis.start, expected_start, "index {batch_index}");
            assert_eq!(axis.destination, 1.0e3 * spec.unit_scale, "index {batch_index}");
            assert_eq!(axis.values.len(), 5);
            assert_eq!(axis.values[0], axis.start);
            assert_eq!(axis.values[4], axis.destination);

            let rising = axis.destination >= axis.start;
            for pair in axis.values.windows(2) {
                if rising {
                    assert!(pair[1] >= pair[0], "index {batch_index}");
                } else {
                    assert!(pair[1] <= pair[0], "index {batch_index}");
                }
            }
        }
    }

    #[test]
    fn unsourced_entries_start_at_zero_without_scaling() {
        for batch_index in [0, 36, 37] {
            let spec = batch_axis_spec(batch_index).expect("entry should exist");
            assert!(spec.source.is_none());
            assert_eq!(spec.unit_scale, 1.0);
        }
    }

    #[test]
    fn single_point_axis_is_the_start_value() {
        let parameters = scan(23.0, 45.0);
        let axis = reconstruct_batch_axis(&parameters, BatchSlot::Primary, 1)
            .expect("axis should reconstruct");
        assert_eq!(axis.values, vec![parameters.get(Parameter::PropagationAngle1)]);
        assert!((axis.destination - 45.0_f64.to_radians()).abs() <= 1.0e-12);
    }

    #[test]
    fn secondary_slot_reads_its_own_index_and_destination() {
        let mut parameters = scan(0.0, 0.0);
        parameters.set(Parameter::BatchIndex2, 34.0);
        parameters.set(Parameter::BatchDestination2, 500.0);
        parameters.set(Parameter::CrystalThickness, 100.0e-6);

        let axis = reconstruct_batch_axis(&parameters, BatchSlot::Secondary, 2)
            .expect("axis should reconstruct");
        assert_eq!(axis.batch_index, 34);
        assert_eq!(axis.start, 100.0e-6);
        assert!((axis.destination - 500.0e-6).abs() <= 1.0e-18);
    }

    #[test]
    fn out_of_range_indices_are_fatal() {
        for batch_index in [-1.0, 38.0, 120.0] {
            let parameters = scan(batch_index, 1.0);
            let error = reconstruct_batch_axis(&parameters, BatchSlot::Primary, 2)
                .expect_err("index should be rejected");
            assert_eq!(error.kind(), LweErrorKind::UnknownBatchAxis);
        }
    }
}
