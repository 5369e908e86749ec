use ms_core::config::FeatureConfig;
use ms_core::frame::FrameGeometry;
use ndarray::Array2;

use crate::delta::delta;
use crate::error::AudioError;
use crate::mel::{mel_filterbank, mel_spectrogram};
use crate::mfcc::{mfcc, power_to_db};
use crate::stft::magnitude_spectrogram;

/// Les quatre flux de coefficients d'un fichier, chacun `(frames, coeffs)`.
#[derive(Clone, Debug)]
pub struct CoefficientStreams {
    /// Mel spectrogram, `n_mels` columns.
    pub mel: Array2<f32>,
    /// Cepstral coefficients, `n_mfcc` columns.
    pub mfcc: Array2<f32>,
    /// First derivative of `mfcc` along frames.
    pub delta: Array2<f32>,
    /// Second derivative of `mfcc` along frames.
    pub accel: Array2<f32>,
}

impl CoefficientStreams {
    /// Frame count of the mel stream; all four agree when produced by
    /// [`FeatureExtractor::extract`].
    #[must_use]
    pub fn frames(&self) -> usize {
        self.mel.nrows()
    }
}

/// Extracteur de features partagé en lecture seule entre les workers.
///
/// Holds the frame geometry and both mel filterbanks, built once from the
/// configuration. `extract` takes `&self`, so one instance serves every
/// thread of the pool.
///
/// # Example
/// ```
/// use ms_audio::features::FeatureExtractor;
/// use ms_core::config::FeatureConfig;
/// # let json = r#"{"sample_rate": 16000, "win_length": 0.025, "hop_length": 0.01,
/// #   "n_fft": 512, "n_mels": 40, "n_mfcc": 13, "fmin": 0.0, "fmax": 8000.0,
/// #   "htk_mel": false, "htk_mfcc": true, "center": true, "log_mel": true, "width": 9}"#;
/// let config: FeatureConfig = serde_json::from_str(json).unwrap();
/// let extractor = FeatureExtractor::new(&config);
/// let streams = extractor.extract(&vec![0.0; 16000]).unwrap();
/// assert_eq!(streams.frames(), 101);
/// assert_eq!(streams.mfcc.ncols(), 13);
/// ```
pub struct FeatureExtractor {
    geometry: FrameGeometry,
    n_fft: usize,
    n_mfcc: usize,
    width: usize,
    center: bool,
    log_mel: bool,
    mel_basis: Array2<f32>,
    mfcc_basis: Array2<f32>,
}

impl FeatureExtractor {
    /// Precompute filterbanks for a validated configuration.
    #[must_use]
    pub fn new(config: &FeatureConfig) -> Self {
        let bank = |htk| {
            mel_filterbank(
                config.sample_rate,
                config.n_fft,
                config.n_mels,
                config.fmin,
                config.fmax,
                htk,
            )
        };
        let mel_basis = bank(config.htk_mel);
        let mfcc_basis = if config.htk_mfcc == config.htk_mel {
            mel_basis.clone()
        } else {
            bank(config.htk_mfcc)
        };

        Self {
            geometry: config.frame_geometry(),
            n_fft: config.n_fft,
            n_mfcc: config.n_mfcc,
            width: config.width,
            center: config.center,
            log_mel: config.log_mel,
            mel_basis,
            mfcc_basis,
        }
    }

    /// Window/hop geometry shared with the silence trimmer.
    #[must_use]
    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// Compute the four coefficient streams of `y` over the full signal.
    ///
    /// # Errors
    /// Fails when the signal has fewer frames than the delta window.
    pub fn extract(&self, y: &[f32]) -> Result<CoefficientStreams, AudioError> {
        let spec = magnitude_spectrogram(
            y,
            self.n_fft,
            self.geometry.window,
            self.geometry.hop,
            self.center,
        );

        let mel = mel_spectrogram(&spec, &self.mel_basis, self.log_mel);
        let log_power = power_to_db(&mel_spectrogram(&spec, &self.mfcc_basis, false));
        let mfcc = mfcc(&log_power, self.n_mfcc);
        let delta_1 = delta(&mfcc, self.width, 1)?;
        let delta_2 = delta(&mfcc, self.width, 2)?;

        Ok(CoefficientStreams {
            mel,
            mfcc,
            delta: delta_1,
            accel: delta_2,
        })
    }
}
