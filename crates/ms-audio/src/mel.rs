//! Mel filterbank construction and mel spectrograms.
//!
//! Two mel scales are supported: HTK (`2595 · log10(1 + f / 700)`) and Slaney
//! (linear below 1 kHz, logarithmic above). Filters are triangular and
//! area-normalized (Slaney normalization) in both cases.

use ndarray::Array2;

use crate::stft::EPS;

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Hz to mel.
#[must_use]
pub fn hz_to_mel(hz: f64, htk: bool) -> f64 {
    if htk {
        return 2595.0 * (1.0 + hz / 700.0).log10();
    }
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

/// Mel to Hz.
#[must_use]
pub fn mel_to_hz(mel: f64, htk: bool) -> f64 {
    if htk {
        return 700.0 * (10.0f64.powf(mel / 2595.0) - 1.0);
    }
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// Build an `(n_mels, n_fft / 2 + 1)` filterbank.
///
/// # Example
/// ```
/// use ms_audio::mel::mel_filterbank;
/// let fb = mel_filterbank(16000, 512, 40, 0.0, 8000.0, false);
/// assert_eq!(fb.dim(), (40, 257));
/// ```
#[must_use]
pub fn mel_filterbank(
    sample_rate: u32,
    n_fft: usize,
    n_mels: usize,
    fmin: f32,
    fmax: f32,
    htk: bool,
) -> Array2<f32> {
    let bins = n_fft / 2 + 1;
    let nyquist = f64::from(sample_rate) / 2.0;
    let fft_freqs: Vec<f64> = (0..bins)
        .map(|k| nyquist * k as f64 / (bins - 1).max(1) as f64)
        .collect();

    // n_mels + 2 edges, evenly spaced on the mel axis
    let mel_lo = hz_to_mel(f64::from(fmin), htk);
    let mel_hi = hz_to_mel(f64::from(fmax), htk);
    let edges: Vec<f64> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_lo + (mel_hi - mel_lo) * i as f64 / (n_mels + 1) as f64, htk))
        .collect();

    let mut weights = Array2::<f32>::zeros((n_mels, bins));
    for (m, mut row) in weights.rows_mut().into_iter().enumerate() {
        let (lo, center, hi) = (edges[m], edges[m + 1], edges[m + 2]);
        let enorm = 2.0 / (hi - lo);
        for (w, &f) in row.iter_mut().zip(&fft_freqs) {
            let lower = (f - lo) / (center - lo);
            let upper = (hi - f) / (hi - center);
            *w = (lower.min(upper).max(0.0) * enorm) as f32;
        }
    }
    weights
}

/// Project a `(frames, bins)` magnitude spectrogram onto `basis`, giving
/// `(frames, n_mels)`. With `log`, applies `ln(x + EPS)`.
#[must_use]
pub fn mel_spectrogram(spec: &Array2<f32>, basis: &Array2<f32>, log: bool) -> Array2<f32> {
    let mel = spec.dot(&basis.t());
    if log {
        mel.mapv(|x| (x + EPS).ln())
    } else {
        mel
    }
}
