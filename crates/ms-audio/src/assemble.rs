use ms_core::error::CoreError;
use ms_core::frame::TrimBounds;
use ms_core::matrix::FeatureMatrix;
use ndarray::{Array2, Axis, Slice, concatenate};

use crate::features::CoefficientStreams;

/// Empile les quatre flux frame par frame sur la plage `[start, end)`.
///
/// Row `t` of the result is `mel[start + t] ++ mfcc[start + t] ++
/// delta[start + t] ++ accel[start + t]`. An empty range gives a zero-row
/// matrix that still carries every column.
///
/// # Errors
/// [`CoreError::StreamMismatch`] if the streams disagree on frame count,
/// [`CoreError::BoundsOutOfRange`] if `end` is past the last frame.
///
/// # Example
/// ```
/// use ms_audio::assemble::assemble;
/// use ms_audio::features::CoefficientStreams;
/// use ms_core::frame::TrimBounds;
/// use ndarray::Array2;
/// let streams = CoefficientStreams {
///     mel: Array2::zeros((4, 2)),
///     mfcc: Array2::zeros((4, 3)),
///     delta: Array2::zeros((4, 3)),
///     accel: Array2::zeros((4, 3)),
/// };
/// let m = assemble(&streams, TrimBounds { start: 1, end: 3 }).unwrap();
/// assert_eq!(m.shape(), (2, 11));
/// ```
pub fn assemble(
    streams: &CoefficientStreams,
    bounds: TrimBounds,
) -> Result<FeatureMatrix, CoreError> {
    let CoefficientStreams {
        mel,
        mfcc,
        delta,
        accel,
    } = streams;

    let frames = mel.nrows();
    if [mfcc, delta, accel].iter().any(|m| m.nrows() != frames) {
        return Err(CoreError::StreamMismatch {
            mel: frames,
            mfcc: mfcc.nrows(),
            delta: delta.nrows(),
            accel: accel.nrows(),
        });
    }
    if bounds.end > frames {
        return Err(CoreError::BoundsOutOfRange {
            start: bounds.start,
            end: bounds.end,
            frames,
        });
    }

    let width = mel.ncols() + mfcc.ncols() + delta.ncols() + accel.ncols();
    if bounds.is_empty() {
        return Ok(FeatureMatrix::new(Array2::zeros((0, width))));
    }

    let rows = Slice::from(bounds.start..bounds.end);
    let stacked = concatenate(
        Axis(1),
        &[
            mel.slice_axis(Axis(0), rows),
            mfcc.slice_axis(Axis(0), rows),
            delta.slice_axis(Axis(0), rows),
            accel.slice_axis(Axis(0), rows),
        ],
    )
    .map_err(|_| CoreError::StreamMismatch {
        mel: frames,
        mfcc: mfcc.nrows(),
        delta: delta.nrows(),
        accel: accel.nrows(),
    })?;

    Ok(FeatureMatrix::new(stacked))
}
