//! Whole-signal resampling with rubato.

use rubato::{FftFixedInOut, Resampler};

use crate::error::AudioError;

/// Input chunk size handed to the FFT resampler.
const CHUNK_SIZE: usize = 1024;

/// Resample a complete mono signal from `from_rate` to `to_rate`.
///
/// The resampler delay is removed and the output is cut to
/// `round(len × to_rate / from_rate)` samples, so the result lines up with the
/// input in time.
///
/// # Errors
/// Returns [`AudioError::ResampleError`] if either rate is 0 or rubato fails.
///
/// # Example
/// ```
/// use ms_audio::resample::resample;
/// let y = vec![0.0f32; 4410];
/// let out = resample(&y, 44100, 16000).unwrap();
/// assert_eq!(out.len(), 1600);
/// ```
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AudioError> {
    if from_rate == 0 || to_rate == 0 {
        return Err(AudioError::ResampleError(
            "Sample rate cannot be zero".into(),
        ));
    }
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler =
        FftFixedInOut::<f32>::new(from_rate as usize, to_rate as usize, CHUNK_SIZE, 1)
            .map_err(|e| AudioError::ResampleError(format!("Resampler init failed: {e}")))?;

    let expected_len =
        (samples.len() as f64 * f64::from(to_rate) / f64::from(from_rate)).round() as usize;
    let delay = resampler.output_delay();

    let mut output = Vec::with_capacity(expected_len + delay + CHUNK_SIZE);
    let mut chunk = Vec::with_capacity(resampler.input_frames_max());
    let mut pos = 0;

    // Zero-pad past the end until the delayed tail has been flushed.
    while output.len() < expected_len + delay {
        let needed = resampler.input_frames_next();
        let end = (pos + needed).min(samples.len());
        chunk.clear();
        chunk.extend_from_slice(&samples[pos..end]);
        chunk.resize(needed, 0.0);
        pos = end;

        let result = resampler
            .process(std::slice::from_ref(&chunk), None)
            .map_err(|e| AudioError::ResampleError(format!("Resampling failed: {e}")))?;
        output.extend_from_slice(&result[0]);
    }

    output.drain(..delay);
    output.truncate(expected_len);
    Ok(output)
}
