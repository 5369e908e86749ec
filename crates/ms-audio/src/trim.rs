//! Leading/trailing silence detection on a per-window variance trace.

use ms_core::frame::{FrameGeometry, TrimBounds};

/// Energy ratio between neighbouring windows that marks an onset or offset.
const EDGE_RATIO: f64 = 3.0;
/// Narrowest region kept before the edge decisions are discarded.
const MIN_FRAMES: usize = 5;

/// Population variance of a window, as an absolute value.
fn abs_variance(x: &[f32]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let n = x.len() as f64;
    let mean = x.iter().map(|&s| f64::from(s)).sum::<f64>() / n;
    let var = x
        .iter()
        .map(|&s| {
            let d = f64::from(s) - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    var.abs()
}

/// One `|var|` per hop-aligned window; the last window may be partial.
///
/// # Example
/// ```
/// use ms_audio::trim::energy_trace;
/// use ms_core::frame::FrameGeometry;
/// let y = vec![0.0f32; 10];
/// let c = energy_trace(&y, FrameGeometry { window: 4, hop: 3 });
/// assert_eq!(c.len(), 4);
/// ```
#[must_use]
pub fn energy_trace(y: &[f32], geometry: FrameGeometry) -> Vec<f64> {
    geometry
        .window_starts(y.len())
        .map(|i| abs_variance(&y[i..(i + geometry.window).min(y.len())]))
        .collect()
}

/// Edge decisions on an energy trace.
///
/// The first window louder than three times its predecessor opens the region
/// one window early; the last window quieter than a third of its predecessor
/// closes it one window late. If fewer than five windows would survive, the
/// end is reset to `N - 1` and the start is kept.
#[must_use]
pub fn bounds_from_trace(c: &[f64]) -> TrimBounds {
    let n = c.len();
    let inner = 1..n.saturating_sub(1);

    let start = inner
        .clone()
        .find(|&i| c[i] > EDGE_RATIO * c[i - 1])
        .map_or(0, |i| i - 1);

    let end = inner
        .filter(|&i| EDGE_RATIO * c[i] < c[i - 1])
        .last()
        .map_or(n, |i| i + 1);

    if start + MIN_FRAMES > end {
        return TrimBounds {
            start,
            end: n.saturating_sub(1),
        };
    }
    TrimBounds { start, end }
}

/// Frame range of `y` to keep, in units of trace windows.
///
/// Never fails: a signal shorter than one window gives a trace of at most one
/// entry and a range covering it.
///
/// # Example
/// ```
/// use ms_audio::trim::trim_bounds;
/// use ms_core::frame::FrameGeometry;
/// let b = trim_bounds(&[0.0; 100], FrameGeometry { window: 10, hop: 5 });
/// assert!(b.start <= b.end);
/// ```
#[must_use]
pub fn trim_bounds(y: &[f32], geometry: FrameGeometry) -> TrimBounds {
    bounds_from_trace(&energy_trace(y, geometry))
}
