//! Mel-Frequency Cepstral Coefficients (MFCC) extraction.
//!
//! dB compression of a mel spectrogram followed by an orthonormal DCT-II over
//! the mel axis.

use ndarray::Array2;

/// Floor applied before taking the log.
const AMIN: f32 = 1e-10;
/// Dynamic range kept below the loudest cell.
const TOP_DB: f32 = 80.0;

/// `10 · log10(max(S, 1e-10))`, floored at `max − 80 dB` over the whole matrix.
#[must_use]
pub fn power_to_db(s: &Array2<f32>) -> Array2<f32> {
    let db = s.mapv(|x| 10.0 * x.max(AMIN).log10());
    let Some(peak) = db.iter().copied().reduce(f32::max) else {
        return db;
    };
    let floor = peak - TOP_DB;
    db.mapv(|x| x.max(floor))
}

/// Orthonormal DCT-II basis, `(n_out, n_in)`.
fn dct_basis(n_out: usize, n_in: usize) -> Array2<f32> {
    let n = n_in as f64;
    Array2::from_shape_fn((n_out, n_in), |(k, i)| {
        let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
        (scale * (std::f64::consts::PI * k as f64 * (2.0 * i as f64 + 1.0) / (2.0 * n)).cos())
            as f32
    })
}

/// First `n_mfcc` cepstral coefficients of a `(frames, n_mels)` log-power mel
/// spectrogram, shaped `(frames, n_mfcc)`.
///
/// # Example
/// ```
/// use ms_audio::mfcc::mfcc;
/// use ndarray::Array2;
/// let log_mel = Array2::<f32>::from_elem((5, 40), -20.0);
/// let c = mfcc(&log_mel, 13);
/// assert_eq!(c.dim(), (5, 13));
/// ```
#[must_use]
pub fn mfcc(log_power_mel: &Array2<f32>, n_mfcc: usize) -> Array2<f32> {
    let basis = dct_basis(n_mfcc, log_power_mel.ncols());
    log_power_mel.dot(&basis.t())
}
