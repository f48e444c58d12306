//! Fixed line order of the run manifest.
//!
//! Every manifest line carries exactly one parameter; position, not a key,
//! identifies it. The enum order below is the line order.

use crate::domain::{LweError, LweResult};
use std::fmt::{Display, Formatter};

pub const PARAMETER_COUNT: usize = 59;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Parameter {
    PulseEnergy1,
    PulseEnergy2,
    Frequency1,
    Frequency2,
    Bandwidth1,
    Bandwidth2,
    SuperGaussianOrder1,
    SuperGaussianOrder2,
    CePhase1,
    CePhase2,
    Delay1,
    Delay2,
    Gdd1,
    Gdd2,
    Tod1,
    Tod2,
    PhaseMaterialIndex1,
    PhaseMaterialIndex2,
    PhaseMaterialThickness1,
    PhaseMaterialThickness2,
    BeamModeParameter,
    Beamwaist1,
    Beamwaist2,
    X01,
    X02,
    Y01,
    Y02,
    Z01,
    Z02,
    PropagationAngle1,
    PropagationAngle2,
    PropagationAnglePhi1,
    PropagationAnglePhi2,
    PolarizationAngle1,
    PolarizationAngle2,
    Circularity1,
    Circularity2,
    MaterialIndex,
    MaterialIndexAlternate,
    CrystalTheta,
    CrystalPhi,
    SpatialWidth,
    SpatialHeight,
    SpatialStep,
    TimeSpan,
    TimeStep,
    CrystalThickness,
    PropagationStep,
    NonlinearAbsorptionStrength,
    BandGapElectronVolts,
    EffectiveMass,
    DrudeGamma,
    SymmetryType,
    BatchIndex,
    BatchDestination,
    Nsims,
    BatchIndex2,
    BatchDestination2,
    Nsims2,
}

impl Parameter {
    pub const ALL: [Parameter; PARAMETER_COUNT] = [
        Self::PulseEnergy1,
        Self::PulseEnergy2,
        Self::Frequency1,
        Self::Frequency2,
        Self::Bandwidth1,
        Self::Bandwidth2,
        Self::SuperGaussianOrder1,
        Self::SuperGaussianOrder2,
        Self::CePhase1,
        Self::CePhase2,
        Self::Delay1,
        Self::Delay2,
        Self::Gdd1,
        Self::Gdd2,
        Self::Tod1,
        Self::Tod2,
        Self::PhaseMaterialIndex1,
        Self::PhaseMaterialIndex2,
        Self::PhaseMaterialThickness1,
        Self::PhaseMaterialThickness2,
        Self::BeamModeParameter,
        Self::Beamwaist1,
        Self::Beamwaist2,
        Self::X01,
        Self::X02,
        Self::Y01,
        Self::Y02,
        Self::Z01,
        Self::Z02,
        Self::PropagationAngle1,
        Self::PropagationAngle2,
        Self::PropagationAnglePhi1,
        Self::PropagationAnglePhi2,
        Self::PolarizationAngle1,
        Self::PolarizationAngle2,
        Self::Circularity1,
        Self::Circularity2,
        Self::MaterialIndex,
        Self::MaterialIndexAlternate,
        Self::CrystalTheta,
        Self::CrystalPhi,
        Self::SpatialWidth,
        Self::SpatialHeight,
        Self::SpatialStep,
        Self::TimeSpan,
        Self::TimeStep,
        Self::CrystalThickness,
        Self::PropagationStep,
        Self::NonlinearAbsorptionStrength,
        Self::BandGapElectronVolts,
        Self::EffectiveMass,
        Self::DrudeGamma,
        Self::SymmetryType,
        Self::BatchIndex,
        Self::BatchDestination,
        Self::Nsims,
        Self::BatchIndex2,
        Self::BatchDestination2,
        Self::Nsims2,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PulseEnergy1 => "pulseEnergy1",
            Self::PulseEnergy2 => "pulseEnergy2",
            Self::Frequency1 => "frequency1",
            Self::Frequency2 => "frequency2",
            Self::Bandwidth1 => "bandwidth1",
            Self::Bandwidth2 => "bandwidth2",
            Self::SuperGaussianOrder1 => "superGaussianOrder1",
            Self::SuperGaussianOrder2 => "superGaussianOrder2",
            Self::CePhase1 => "cePhase1",
            Self::CePhase2 => "cePhase2",
            Self::Delay1 => "delay1",
            Self::Delay2 => "delay2",
            Self::Gdd1 => "gdd1",
            Self::Gdd2 => "gdd2",
            Self::Tod1 => "tod1",
            Self::Tod2 => "tod2",
            Self::PhaseMaterialIndex1 => "phaseMaterialIndex1",
            Self::PhaseMaterialIndex2 => "phaseMaterialIndex2",
            Self::PhaseMaterialThickness1 => "phaseMaterialThickness1",
            Self::PhaseMaterialThickness2 => "phaseMaterialThickness2",
            Self::BeamModeParameter => "beamModeParameter",
            Self::Beamwaist1 => "beamwaist1",
            Self::Beamwaist2 => "beamwaist2",
            Self::X01 => "x01",
            Self::X02 => "x02",
            Self::Y01 => "y01",
            Self::Y02 => "y02",
            Self::Z01 => "z01",
            Self::Z02 => "z02",
            Self::PropagationAngle1 => "propagationAngle1",
            Self::PropagationAngle2 => "propagationAngle2",
            Self::PropagationAnglePhi1 => "propagationAnglePhi1",
            Self::PropagationAnglePhi2 => "propagationAnglePhi2",
            Self::PolarizationAngle1 => "polarizationAngle1",
            Self::PolarizationAngle2 => "polarizationAngle2",
            Self::Circularity1 => "circularity1",
            Self::Circularity2 => "circularity2",
            Self::MaterialIndex => "materialIndex",
            Self::MaterialIndexAlternate => "materialIndexAlternate",
            Self::CrystalTheta => "crystalTheta",
            Self::CrystalPhi => "crystalPhi",
            Self::SpatialWidth => "spatialWidth",
            Self::SpatialHeight => "spatialHeight",
            Self::SpatialStep => "spatialStep",
            Self::TimeSpan => "timeSpan",
            Self::TimeStep => "timeStep",
            Self::CrystalThickness => "crystalThickness",
            Self::PropagationStep => "propagationStep",
            Self::NonlinearAbsorptionStrength => "nonlinearAbsorptionStrength",
            Self::BandGapElectronVolts => "bandGapElectronVolts",
            Self::EffectiveMass => "effectiveMass",
            Self::DrudeGamma => "drudeGamma",
            Self::SymmetryType => "symmetryType",
            Self::BatchIndex => "batchIndex",
            Self::BatchDestination => "batchDestination",
            Self::Nsims => "Nsims",
            Self::BatchIndex2 => "batchIndex2",
            Self::BatchDestination2 => "batchDestination2",
            Self::Nsims2 => "Nsims2",
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Parameters the launcher writes as floats but which are integers by meaning.
    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            Self::Nsims | Self::Nsims2 | Self::SymmetryType | Self::BatchIndex | Self::BatchIndex2
        )
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "phaseMaterialthickness2" => return Some(Self::PhaseMaterialThickness2),
            "BeamModeParameter" => return Some(Self::BeamModeParameter),
            _ => {}
        }
        Self::ALL
            .iter()
            .copied()
            .find(|parameter| parameter.as_str() == name)
    }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Scalar parameters of one run, indexed by [`Parameter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSet {
    values: [f64; PARAMETER_COUNT],
}

impl ParameterSet {
    pub const fn from_values(values: [f64; PARAMETER_COUNT]) -> Self {
        Self { values }
    }

    pub const fn get(&self, parameter: Parameter) -> f64 {
        self.values[parameter.index()]
    }

    pub fn set(&mut self, parameter: Parameter, value: f64) {
        self.values[parameter.index()] = value;
    }

    /// Value truncated toward zero, the way integral parameters are read.
    pub fn integral(&self, parameter: Parameter) -> i64 {
        self.get(parameter).trunc() as i64
    }

    pub fn by_name(&self, name: &str) -> LweResult<f64> {
        Parameter::from_name(name)
            .map(|parameter| self.get(parameter))
            .ok_or_else(|| LweError::manifest_parse(format!("unknown parameter name '{name}'")))
    }

    pub fn nsims(&self) -> i64 {
        self.integral(Parameter::Nsims)
    }

    pub fn nsims2(&self) -> i64 {
        self.integral(Parameter::Nsims2)
    }

    pub fn symmetry_type(&self) -> i64 {
        self.integral(Parameter::SymmetryType)
    }

    pub fn batch_index(&self) -> i64 {
        self.integral(Parameter::BatchIndex)
    }

    pub fn batch_index2(&self) -> i64 {
        self.integral(Parameter::BatchIndex2)
    }

    pub fn values(&self) -> &[f64; PARAMETER_COUNT] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (Parameter, f64)> + '_ {
        Parameter::ALL
            .iter()
            .map(|parameter| (*parameter, self.get(*parameter)))
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::from_values([0.0; PARAMETER_COUNT])
    }
}
