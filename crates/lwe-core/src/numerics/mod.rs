/// `count` evenly spaced samples from `start` to `stop`, both included.
///
/// A single sample is `start`; the final sample is pinned to `stop` so it does
/// not pick up rounding from the step.
pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            let mut values = (0..count)
                .map(|index| start + index as f64 * step)
                .collect::<Vec<_>>();
            values[count - 1] = stop;
            values
        }
    }
}

/// Discrete Fourier transform sample frequencies in FFT order: zero and the
/// positive frequencies first, then the negative ones.
pub fn fftfreq(count: usize, sample_spacing: f64) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }

    let scale = 1.0 / (count as f64 * sample_spacing);
    let positive = count.div_ceil(2);
    (0..count)
        .map(|index| {
            let signed = if index < positive {
                index as i64
            } else {
                index as i64 - count as i64
            };
            signed as f64 * scale
        })
        .collect()
}

/// Piecewise-linear interpolation of `(xp, fp)` at `x`, clamped to the end
/// values outside the sampled range. `xp` must be non-decreasing.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> Option<f64> {
    let len = xp.len().min(fp.len());
    if len == 0 {
        return None;
    }
    if x <= xp[0] {
        return Some(fp[0]);
    }
    if x >= xp[len - 1] {
        return Some(fp[len - 1]);
    }

    let upper = xp[..len].partition_point(|sample| *sample <= x);
    let lower = upper - 1;
    let span = xp[upper] - xp[lower];
    if span == 0.0 {
        return Some(fp[upper]);
    }
    let weight = (x - xp[lower]) / span;
    Some(fp[lower] + weight * (fp[upper] - fp[lower]))
}

pub fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (index, value)| match best {
            Some((_, current)) if *value <= current => best,
            _ => Some((index, *value)),
        })
        .map(|(index, _)| index)
}
