use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::matrix::FeatureMatrix;

/// Charge un fichier audio en forme d'onde mono au taux demandé.
///
/// Implémenté par : `SymphoniaLoader`.
///
/// # Example
/// ```
/// use ms_core::traits::WaveformLoader;
/// use std::path::Path;
///
/// struct Silence;
/// impl WaveformLoader for Silence {
///     fn load(&self, _path: &Path, sample_rate: u32) -> anyhow::Result<Vec<f32>> {
///         Ok(vec![0.0; sample_rate as usize])
///     }
/// }
/// assert_eq!(Silence.load(Path::new("x.wav"), 8000).unwrap().len(), 8000);
/// ```
pub trait WaveformLoader: Send + Sync {
    /// Decode `path`, downmix to mono and resample to `sample_rate`.
    ///
    /// # Errors
    /// Any I/O, probe, decode or resampling failure.
    fn load(&self, path: &Path, sample_rate: u32) -> Result<Vec<f32>>;
}

/// Persiste les matrices de features, une par fichier d'entrée.
///
/// Implémenté par : `NpzStore`.
pub trait ArtifactStore: Send + Sync {
    /// Destination of the artifact for `input`, or `None` if the input has
    /// no usable file stem.
    fn artifact_path(&self, input: &Path) -> Option<PathBuf>;

    /// Whether a finished artifact already sits at `artifact`.
    fn contains(&self, artifact: &Path) -> bool {
        artifact.is_file()
    }

    /// Write `matrix` at `artifact`. Must not leave a partial file at
    /// `artifact` on failure.
    ///
    /// # Errors
    /// Any filesystem or encoding failure.
    fn save(&self, artifact: &Path, matrix: &FeatureMatrix) -> Result<()>;
}
