use ndarray::Array2;
use realfft::RealFftPlanner;
use realfft::num_complex::Complex;

/// Offset added to every sample before analysis so silent frames stay finite
/// under the log.
pub const EPS: f32 = f64::EPSILON as f32;

/// Periodic Hamming window of `len` samples.
///
/// # Example
/// ```
/// use ms_audio::stft::hamming;
/// let w = hamming(4);
/// assert!((w[0] - 0.08).abs() < 1e-6);
/// assert!((w[2] - 1.0).abs() < 1e-6);
/// ```
#[must_use]
pub fn hamming(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            0.54 - 0.46 * (2.0 * std::f64::consts::PI * i as f64 / len as f64).cos()
        })
        .map(|w| w as f32)
        .collect()
}

/// FFT pipeline: windowed real FFT using realfft.
///
/// Pre-allocates the FFT plan and scratch buffers; one instance per file.
///
/// # Example
/// ```
/// use ms_audio::stft::FftPipeline;
/// let mut fft = FftPipeline::new(512, 400);
/// let frame = vec![0.0f32; 512];
/// let mut out = vec![0.0f32; fft.num_bins()];
/// fft.process(&frame, &mut out);
/// assert_eq!(out.len(), 257); // N/2 + 1
/// ```
pub struct FftPipeline {
    fft_size: usize,
    input_buf: Vec<f32>,
    spectrum_buf: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    plan: std::sync::Arc<dyn realfft::RealToComplex<f32>>,
    /// Hamming window of `win_length` samples, zero-padded and centered in `fft_size`.
    window: Vec<f32>,
}

impl FftPipeline {
    /// Create a pipeline for `fft_size`-point frames analysed with a
    /// `win_length`-sample Hamming window.
    ///
    /// # Panics
    /// Panics if `fft_size` is 0 or `win_length > fft_size`.
    #[must_use]
    pub fn new(fft_size: usize, win_length: usize) -> Self {
        assert!(fft_size > 0, "FFT size must be > 0");
        assert!(win_length <= fft_size, "window must fit in the FFT frame");

        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_forward(fft_size);

        let input_buf = plan.make_input_vec();
        let spectrum_buf = plan.make_output_vec();
        let scratch = plan.make_scratch_vec();

        let mut window = vec![0.0f32; fft_size];
        let offset = (fft_size - win_length) / 2;
        window[offset..offset + win_length].copy_from_slice(&hamming(win_length));

        Self {
            fft_size,
            input_buf,
            spectrum_buf,
            scratch,
            plan,
            window,
        }
    }

    /// Window `frame` (exactly `fft_size` samples) and write its magnitude
    /// spectrum into `out` (`num_bins` values).
    pub fn process(&mut self, frame: &[f32], out: &mut [f32]) {
        debug_assert_eq!(frame.len(), self.fft_size);
        for ((slot, &s), &w) in self.input_buf.iter_mut().zip(frame).zip(&self.window) {
            *slot = s * w;
        }

        // Forward FFT
        if self
            .plan
            .process_with_scratch(
                &mut self.input_buf,
                &mut self.spectrum_buf,
                &mut self.scratch,
            )
            .is_err()
        {
            out.fill(0.0);
            return;
        }

        for (o, c) in out.iter_mut().zip(&self.spectrum_buf) {
            *o = c.norm();
        }
    }

    /// FFT frame size.
    #[must_use]
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Bins per spectrum, `fft_size / 2 + 1`.
    #[must_use]
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }
}

/// Index into a signal of length `n` under repeated mirror reflection
/// (the edge sample is not duplicated).
fn reflect_index(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n as isize - 1);
    let m = i.rem_euclid(period);
    if m >= n as isize {
        (period - m) as usize
    } else {
        m as usize
    }
}

/// Reflect-pad `y` by `pad` samples on both sides.
fn reflect_pad(y: &[f32], pad: usize) -> Vec<f32> {
    if y.is_empty() {
        return vec![0.0; 2 * pad];
    }
    let n = y.len();
    (-(pad as isize)..(n + pad) as isize)
        .map(|i| y[reflect_index(i, n)])
        .collect()
}

/// Magnitude STFT, shaped `(frames, n_fft / 2 + 1)`.
///
/// [`EPS`] is added to every sample first. With `center`, the signal is
/// reflect-padded by `n_fft / 2` on both sides so frame `t` is centered on
/// sample `t · hop`. Frames that would run past the end are dropped, so the
/// count is `1 + (padded_len - n_fft) / hop`, or 0 for a signal shorter than
/// one frame.
///
/// # Panics
/// Panics if `hop` is 0 or `win_length > n_fft`.
///
/// # Example
/// ```
/// use ms_audio::stft::magnitude_spectrogram;
/// let y = vec![0.0f32; 1600];
/// let s = magnitude_spectrogram(&y, 512, 400, 160, true);
/// assert_eq!(s.dim(), (11, 257));
/// ```
#[must_use]
pub fn magnitude_spectrogram(
    y: &[f32],
    n_fft: usize,
    win_length: usize,
    hop: usize,
    center: bool,
) -> Array2<f32> {
    assert!(hop > 0, "hop must be > 0");
    let shifted: Vec<f32> = y.iter().map(|s| s + EPS).collect();
    let signal = if center {
        reflect_pad(&shifted, n_fft / 2)
    } else {
        shifted
    };

    let mut fft = FftPipeline::new(n_fft, win_length);
    let bins = fft.num_bins();
    let frames = if signal.len() < n_fft {
        0
    } else {
        1 + (signal.len() - n_fft) / hop
    };

    let mut spec = Array2::<f32>::zeros((frames, bins));
    for (t, mut row) in spec.rows_mut().into_iter().enumerate() {
        let start = t * hop;
        let Some(out) = row.as_slice_mut() else {
            continue;
        };
        fft.process(&signal[start..start + n_fft], out);
    }
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn reflect_padding_matches_mirror() {
        let y = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(reflect_pad(&y, 2), vec![3.0, 2.0, 1.0, 2.0, 3.0, 4.0, 3.0, 2.0]);
    }

    #[test]
    fn reflect_padding_wider_than_signal() {
        let y = [1.0, 2.0];
        assert_eq!(reflect_pad(&y, 3), vec![2.0, 1.0, 2.0, 1.0, 2.0, 1.0, 2.0, 1.0]);
    }

    #[test]
    fn frame_counts() {
        let y = vec![0.1f32; 1000];
        assert_eq!(magnitude_spectrogram(&y, 256, 200, 100, true).nrows(), 11);
        assert_eq!(magnitude_spectrogram(&y, 256, 200, 100, false).nrows(), 8);
        assert_eq!(magnitude_spectrogram(&y[..100], 256, 200, 100, false).nrows(), 0);
    }

    #[test]
    fn sine_peaks_at_its_bin() {
        let n_fft = 512;
        let sr = 8000.0;
        // Bin 32 → 32 * 8000 / 512 = 500 Hz
        let y: Vec<f32> = (0..4000)
            .map(|i| (2.0 * std::f32::consts::PI * 500.0 * i as f32 / sr).sin())
            .collect();
        let spec = magnitude_spectrogram(&y, n_fft, n_fft, 256, false);
        let row = spec.row(3);
        let peak = row
            .iter()
            .enumerate()
            .fold((0, 0.0f32), |best, (i, &m)| if m > best.1 { (i, m) } else { best });
        assert_eq!(peak.0, 32);
        // Hamming coherent gain 0.54 → |X| ≈ 0.54 · N / 2
        assert_relative_eq!(peak.1, 0.54 * n_fft as f32 / 2.0, max_relative = 0.02);
    }
}
