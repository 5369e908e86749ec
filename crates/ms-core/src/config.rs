use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::frame::FrameGeometry;

/// Extensions de document de configuration reconnues.
pub const CONFIG_EXTENSIONS: &[&str] = &["json", "toml"];

#[must_use]
pub fn default_input_dir() -> PathBuf {
    PathBuf::from("../test/audio")
}

#[must_use]
pub fn default_output_dir() -> PathBuf {
    PathBuf::from("./feature/test")
}

/// Paramètres d'extraction, chargés une fois au démarrage puis partagés en lecture seule.
///
/// Every spectral field is required: a document missing one of them fails to
/// parse. Only the two directories carry defaults.
///
/// # Example
/// ```
/// use ms_core::config::FeatureConfig;
/// let json = r#"{
///     "sample_rate": 16000, "win_length": 0.025, "hop_length": 0.01,
///     "n_fft": 512, "n_mels": 40, "n_mfcc": 13, "fmin": 0.0, "fmax": 8000.0,
///     "htk_mel": false, "htk_mfcc": true, "center": true, "log_mel": true,
///     "width": 9
/// }"#;
/// let config: FeatureConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.frame_geometry().window, 400);
/// assert_eq!(config.frame_geometry().hop, 160);
/// ```
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FeatureConfig {
    // === Signal ===
    /// Target sample rate in Hz; every input is resampled to it on load.
    pub sample_rate: u32,
    /// Analysis window duration in seconds.
    pub win_length: f64,
    /// Hop between consecutive windows in seconds.
    pub hop_length: f64,

    // === Spectre ===
    /// FFT size in samples. Must be at least the window size.
    pub n_fft: usize,
    /// Nombre de bandes mel.
    pub n_mels: usize,
    /// Nombre de coefficients cepstraux conservés.
    pub n_mfcc: usize,
    /// Lowest filterbank frequency (Hz).
    pub fmin: f32,
    /// Highest filterbank frequency (Hz).
    pub fmax: f32,
    /// HTK mel scale for the mel stream (Slaney otherwise).
    pub htk_mel: bool,
    /// HTK mel scale for the filterbank feeding the MFCC stream.
    pub htk_mfcc: bool,
    /// Reflect-pad the signal so frames are centered on hop positions.
    pub center: bool,
    /// Natural-log compress the mel stream.
    pub log_mel: bool,

    // === Dynamique ===
    /// Delta window width in frames (odd, >= 3).
    pub width: usize,

    // === Chemins ===
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl FeatureConfig {
    /// Window and hop sizes in samples, `round(seconds × sample_rate)`.
    ///
    /// The trimmer and every coefficient stream read their geometry from here
    /// so that frame counts line up.
    #[must_use]
    pub fn frame_geometry(&self) -> FrameGeometry {
        let sr = f64::from(self.sample_rate);
        FrameGeometry {
            window: (self.win_length * sr).round() as usize,
            hop: (self.hop_length * sr).round() as usize,
        }
    }

    /// Number of columns in every feature row: mel ++ mfcc ++ delta ++ accel.
    #[must_use]
    pub fn feature_width(&self) -> usize {
        self.n_mels + 3 * self.n_mfcc
    }

    /// Rejette les combinaisons de paramètres inexploitables.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |msg: String| Err(CoreError::Config(msg));

        if self.sample_rate == 0 {
            return invalid("sample_rate doit être > 0".into());
        }
        let geometry = self.frame_geometry();
        if geometry.window == 0 {
            return invalid(format!(
                "win_length={} s donne une fenêtre de 0 échantillon",
                self.win_length
            ));
        }
        if geometry.hop == 0 {
            return invalid(format!(
                "hop_length={} s donne un pas de 0 échantillon",
                self.hop_length
            ));
        }
        if self.n_fft < geometry.window {
            return invalid(format!(
                "n_fft={} est plus petit que la fenêtre ({} échantillons)",
                self.n_fft, geometry.window
            ));
        }
        if self.n_mels == 0 || self.n_mfcc == 0 {
            return invalid("n_mels et n_mfcc doivent être > 0".into());
        }
        if self.n_mfcc > self.n_mels {
            return invalid(format!(
                "n_mfcc={} dépasse n_mels={}",
                self.n_mfcc, self.n_mels
            ));
        }
        let nyquist = self.sample_rate as f32 / 2.0;
        if self.fmin < 0.0 || self.fmax <= self.fmin || self.fmax > nyquist {
            return invalid(format!(
                "bornes fréquentielles invalides : fmin={} fmax={} (nyquist {nyquist})",
                self.fmin, self.fmax
            ));
        }
        if self.width < 3 || self.width.is_multiple_of(2) {
            return invalid(format!("width={} doit être impair et >= 3", self.width));
        }
        Ok(())
    }
}

/// Vérifie que le chemin porte une extension de document reconnue.
///
/// # Errors
/// Returns [`CoreError::UnsupportedFormat`] for any other extension.
pub fn check_extension(path: &Path) -> Result<&'static str, CoreError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    CONFIG_EXTENSIONS
        .iter()
        .find(|known| **known == ext)
        .copied()
        .ok_or(CoreError::UnsupportedFormat {
            format: path.display().to_string(),
        })
}

/// Parse a configuration document already read into memory.
///
/// # Errors
/// Returns an error if a required field is missing or mistyped, or if the
/// values fail [`FeatureConfig::validate`].
pub fn parse_config(content: &str, format: &str) -> Result<FeatureConfig> {
    let config: FeatureConfig = match format {
        "toml" => toml::from_str(content).context("Erreur de parsing TOML")?,
        _ => serde_json::from_str(content).context("Erreur de parsing JSON")?,
    };
    config.validate()?;
    Ok(config)
}

/// Charge et valide le document de configuration.
///
/// # Errors
/// Returns an error if the extension is not `json`/`toml`, the file cannot be
/// read, or the document is incomplete or invalid.
///
/// # Example
/// ```no_run
/// use ms_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("meta.json")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<FeatureConfig> {
    let format = check_extension(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    let config = parse_config(&content, format)
        .with_context(|| format!("Configuration {}", path.display()))?;
    log::info!("Configuration chargée depuis {}", path.display());
    Ok(config)
}
