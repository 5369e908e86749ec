//! Delta (first-order) and acceleration (second-order) features.
//!
//! Local polynomial (Savitzky-Golay) derivative along the frame axis. The
//! fitted polynomial has the same degree as the derivative order, so the
//! derivative of each fit is a single number per window. Edge frames that
//! have no full window reuse the value of the nearest full window, which is
//! what evaluating the edge fit at those frames gives.

use ndarray::{Array2, Axis};

use crate::error::AudioError;

/// Filter taps for a `2·half + 1` window and derivative `order`.
fn taps(half: usize, order: usize) -> Result<Vec<f32>, AudioError> {
    let t: Vec<f64> = (0..=2 * half).map(|j| j as f64 - half as f64).collect();
    let taps = match order {
        1 => {
            let denom: f64 = t.iter().map(|x| x * x).sum();
            t.iter().map(|x| x / denom).collect::<Vec<_>>()
        }
        2 => {
            let mean_sq = t.iter().map(|x| x * x).sum::<f64>() / t.len() as f64;
            let centered: Vec<f64> = t.iter().map(|x| x * x - mean_sq).collect();
            let denom: f64 = centered.iter().map(|c| c * c).sum();
            centered.iter().map(|c| 2.0 * c / denom).collect()
        }
        other => return Err(AudioError::DeltaOrder(other)),
    };
    Ok(taps.into_iter().map(|x| x as f32).collect())
}

/// Derivative of `order` (1 or 2) of each column of a `(frames, coeffs)`
/// matrix, smoothed over `width` frames. An even `width` is treated as
/// `width + 1`.
///
/// # Errors
/// [`AudioError::DeltaWidth`] if the window is wider than the signal,
/// [`AudioError::DeltaOrder`] for any order other than 1 or 2.
///
/// # Example
/// ```
/// use ms_audio::delta::delta;
/// use ndarray::Array2;
/// let ramp = Array2::from_shape_fn((12, 2), |(t, c)| (t * (c + 1)) as f32);
/// let d = delta(&ramp, 9, 1).unwrap();
/// assert!((d[[0, 1]] - 2.0).abs() < 1e-5);
/// ```
pub fn delta(coeffs: &Array2<f32>, width: usize, order: usize) -> Result<Array2<f32>, AudioError> {
    let half = width / 2;
    let window = 2 * half + 1;
    let frames = coeffs.nrows();
    if window > frames {
        return Err(AudioError::DeltaWidth { width, frames });
    }
    let taps = taps(half, order)?;

    let mut out = Array2::<f32>::zeros(coeffs.dim());
    for (src, mut dst) in coeffs.axis_iter(Axis(1)).zip(out.axis_iter_mut(Axis(1))) {
        for t in half..frames - half {
            dst[t] = taps
                .iter()
                .zip(src.iter().skip(t - half))
                .map(|(k, x)| k * x)
                .sum();
        }
        let first = dst[half];
        let last = dst[frames - half - 1];
        for t in 0..half {
            dst[t] = first;
            dst[frames - 1 - t] = last;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linear_ramp_has_constant_slope() {
        let ramp = Array2::from_shape_fn((20, 1), |(t, _)| 0.5 * t as f32 + 3.0);
        let d = delta(&ramp, 5, 1).unwrap();
        for &v in &d {
            assert_relative_eq!(v, 0.5, epsilon = 1e-5);
        }
    }

    #[test]
    fn parabola_has_constant_acceleration() {
        let para = Array2::from_shape_fn((15, 1), |(t, _)| {
            let t = t as f32;
            t * t - 4.0 * t
        });
        let a = delta(&para, 7, 2).unwrap();
        for &v in &a {
            assert_relative_eq!(v, 2.0, epsilon = 1e-3);
        }
        // Ramp has no curvature.
        let ramp = Array2::from_shape_fn((15, 1), |(t, _)| t as f32);
        assert!(delta(&ramp, 7, 2).unwrap().iter().all(|v| v.abs() < 1e-4));
    }

    #[test]
    fn frame_count_is_preserved() {
        let x = Array2::<f32>::zeros((9, 13));
        assert_eq!(delta(&x, 9, 1).unwrap().dim(), (9, 13));
    }

    #[test]
    fn too_wide_window_fails() {
        let x = Array2::<f32>::zeros((4, 3));
        assert!(matches!(
            delta(&x, 9, 1),
            Err(AudioError::DeltaWidth { width: 9, frames: 4 })
        ));
    }

    #[test]
    fn unsupported_order_fails() {
        let x = Array2::<f32>::zeros((12, 3));
        assert!(matches!(delta(&x, 9, 3), Err(AudioError::DeltaOrder(3))));
    }
}
