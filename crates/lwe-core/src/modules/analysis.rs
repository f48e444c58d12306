//! Small post-processing helpers over decoded spectra and pulses.

use crate::domain::{LweError, LweResult};
use crate::numerics::{argmax, interp};
use ndarray::{Array2, Axis};

/// Full width of `y` at `height` times its maximum, measured on `x`.
///
/// `y` is rotated so the peak sits at the centre sample, then each side's
/// crossing is found by linear interpolation. Both slices must have the same
/// length and at least three samples.
pub fn fwhm(x: &[f64], y: &[f64], height: f64) -> LweResult<f64> {
    if x.len() != y.len() {
        return Err(LweError::input_validation(
            "INPUT.FWHM_LENGTH",
            format!("x has {} samples but y has {}", x.len(), y.len()),
        ));
    }
    if y.len() < 3 {
        return Err(LweError::input_validation(
            "INPUT.FWHM_LENGTH",
            format!("at least 3 samples are required, got {}", y.len()),
        ));
    }
    let peak = argmax(y).ok_or_else(|| {
        LweError::input_validation("INPUT.FWHM_VALUES", "y contains no comparable values")
    })?;

    let len = y.len();
    let center = len / 2;
    let shift = (center + len - peak) % len;
    let mut rotated = vec![0.0; len];
    for (index, value) in y.iter().enumerate() {
        rotated[(index + shift) % len] = *value;
    }
    let center = argmax(&rotated).unwrap_or(center);
    let level = height * rotated[center];

    // Left flank rises towards the peak; the right flank is read reversed so
    // both interpolations see increasing abscissae.
    let lower = interp(level, &rotated[..center], &x[..center]);
    let upper_y: Vec<f64> = rotated[center..].iter().rev().copied().collect();
    let upper_x: Vec<f64> = x[center..].iter().rev().copied().collect();
    let upper = interp(level, &upper_y, &upper_x);

    match (lower, upper) {
        (Some(lower), Some(upper)) => Ok(upper - lower),
        _ => Err(LweError::input_validation(
            "INPUT.FWHM_VALUES",
            "no half-maximum crossing was found",
        )),
    }
}

/// `values` divided by their maximum.
pub fn normalize(values: &[f64]) -> LweResult<Vec<f64>> {
    let peak = values
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    if !peak.is_finite() || peak == 0.0 {
        return Err(LweError::input_validation(
            "INPUT.NORMALIZE_PEAK",
            format!("cannot normalise by a maximum of {peak}"),
        ));
    }
    Ok(values.iter().map(|value| value / peak).collect())
}

/// Each row divided by its own maximum.
pub fn normalize_rows(matrix: &Array2<f64>) -> LweResult<Array2<f64>> {
    let mut normalized = matrix.clone();
    for (row_index, mut row) in normalized.axis_iter_mut(Axis(0)).enumerate() {
        let peak = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !peak.is_finite() || peak == 0.0 {
            return Err(LweError::input_validation(
                "INPUT.NORMALIZE_PEAK",
                format!("row {row_index} has maximum {peak}"),
            ));
        }
        row.mapv_inplace(|value| value / peak);
    }
    Ok(normalized)
}
