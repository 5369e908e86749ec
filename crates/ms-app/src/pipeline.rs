use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ms_audio::{FeatureExtractor, assemble, trim_bounds};
use ms_core::config::FeatureConfig;
use ms_core::traits::{ArtifactStore, WaveformLoader};

/// Échec d'un fichier : identifiant de l'entrée et description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorRecord {
    /// Input file name as listed in the input directory.
    pub file: String,
    /// Full error chain.
    pub reason: String,
}

impl ErrorRecord {
    fn new(input: &Path, reason: impl Into<String>) -> Self {
        let file = input.file_name().map_or_else(
            || input.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        );
        Self {
            file,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.reason)
    }
}

/// Résultat du traitement d'un fichier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileOutcome {
    /// Artifact written at this path.
    Ok(PathBuf),
    /// Artifact already present at this path; input not read.
    Skip(PathBuf),
    /// Nothing written.
    Err(ErrorRecord),
}

/// Chaîne load → trim → extract → assemble → persist pour un fichier.
///
/// Shared by reference across the worker pool: the configuration and the
/// extractor's filterbanks are read-only, and each call owns its waveform.
pub struct FilePipeline<'a, L, S> {
    config: &'a FeatureConfig,
    extractor: FeatureExtractor,
    loader: L,
    store: S,
}

impl<'a, L: WaveformLoader, S: ArtifactStore> FilePipeline<'a, L, S> {
    #[must_use]
    pub fn new(config: &'a FeatureConfig, loader: L, store: S) -> Self {
        Self {
            config,
            extractor: FeatureExtractor::new(config),
            loader,
            store,
        }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Traite un fichier sans jamais propager d'erreur ni de panic.
    pub fn process(&self, input: &Path) -> FileOutcome {
        let Some(artifact) = self.store.artifact_path(input) else {
            return FileOutcome::Err(ErrorRecord::new(input, "nom de fichier inexploitable"));
        };
        if self.store.contains(&artifact) {
            log::debug!("Déjà extrait, ignoré : {}", input.display());
            return FileOutcome::Skip(artifact);
        }

        match catch_unwind(AssertUnwindSafe(|| self.compute(input, &artifact))) {
            Ok(Ok((frames, coeffs))) => {
                log::info!("{} → {} ({frames}×{coeffs})", input.display(), artifact.display());
                FileOutcome::Ok(artifact)
            }
            Ok(Err(e)) => {
                log::warn!("Échec {}: {e:#}", input.display());
                FileOutcome::Err(ErrorRecord::new(input, format!("{e:#}")))
            }
            Err(payload) => {
                let msg = payload
                    .downcast_ref::<&str>()
                    .map(ToString::to_string)
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "panic sans message".into());
                log::warn!("Panic pendant {}: {msg}", input.display());
                FileOutcome::Err(ErrorRecord::new(input, format!("panic: {msg}")))
            }
        }
    }

    fn compute(&self, input: &Path, artifact: &Path) -> Result<(usize, usize)> {
        let y = self
            .loader
            .load(input, self.config.sample_rate)
            .context("Chargement audio")?;

        let bounds = trim_bounds(&y, self.extractor.geometry());
        let streams = self
            .extractor
            .extract(&y)
            .context("Extraction des coefficients")?;

        // The energy trace and the STFT may differ by a frame at the tail.
        let retained = bounds.clamp_to(streams.frames());
        log::debug!(
            "{}: {} samples, trim [{}, {}) sur {} frames",
            input.display(),
            y.len(),
            retained.start,
            retained.end,
            streams.frames()
        );

        let matrix = assemble(&streams, retained).context("Assemblage des features")?;
        self.store
            .save(artifact, &matrix)
            .context("Écriture de l'artefact")?;
        Ok(matrix.shape())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use ms_core::config::parse_config;
    use ms_export::{NpzStore, read_artifact};

    pub(crate) fn test_config() -> FeatureConfig {
        parse_config(
            r#"{"sample_rate": 8000, "win_length": 0.032, "hop_length": 0.016,
                "n_fft": 256, "n_mels": 20, "n_mfcc": 10, "fmin": 0.0, "fmax": 4000.0,
                "htk_mel": false, "htk_mfcc": false, "center": true, "log_mel": true,
                "width": 5}"#,
            "json",
        )
        .unwrap()
    }

    /// Silence, a one-second 440 Hz burst, silence.
    pub(crate) fn burst(sample_rate: u32) -> Vec<f32> {
        let sr = sample_rate as usize;
        (0..2 * sr)
            .map(|i| {
                if (sr / 2..3 * sr / 2).contains(&i) {
                    (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sample_rate as f32).sin()
                        * 0.5
                } else {
                    0.0
                }
            })
            .collect()
    }

    struct FnLoader<F>(F);

    impl<F> WaveformLoader for FnLoader<F>
    where
        F: Fn(&Path) -> Result<Vec<f32>> + Send + Sync,
    {
        fn load(&self, path: &Path, _sample_rate: u32) -> Result<Vec<f32>> {
            (self.0)(path)
        }
    }

    #[test]
    fn burst_is_trimmed_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config();
        let pipeline = FilePipeline::new(
            &config,
            FnLoader(|_: &Path| -> Result<Vec<f32>> { Ok(burst(8000)) }),
            NpzStore::new(dir.path()),
        );

        let artifact = match pipeline.process(Path::new("burst.wav")) {
            FileOutcome::Ok(artifact) => artifact,
            other => panic!("unexpected outcome {other:?}"),
        };
        let data = read_artifact(&artifact).unwrap();
        assert_eq!(data.ncols(), config.feature_width());
        // 2 s at hop 128 → 126 frames; roughly the middle second survives.
        assert!(data.nrows() > 55 && data.nrows() < 75, "{} frames", data.nrows());
    }

    #[test]
    fn existing_artifact_skips_without_loading() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("done.npz"), b"x").unwrap();
        let calls = AtomicUsize::new(0);
        let config = test_config();
        let pipeline = FilePipeline::new(
            &config,
            FnLoader(|_: &Path| -> Result<Vec<f32>> {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(burst(8000))
            }),
            NpzStore::new(dir.path()),
        );

        assert_eq!(
            pipeline.process(Path::new("in/done.flac")),
            FileOutcome::Skip(dir.path().join("done.npz"))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn loader_error_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config();
        let pipeline = FilePipeline::new(
            &config,
            FnLoader(|_: &Path| -> Result<Vec<f32>> { anyhow::bail!("format inconnu") }),
            NpzStore::new(dir.path()),
        );

        let record = match pipeline.process(Path::new("bad.xyz")) {
            FileOutcome::Err(record) => record,
            other => panic!("unexpected outcome {other:?}"),
        };
        assert_eq!(record.file, "bad.xyz");
        assert!(record.reason.contains("format inconnu"), "{}", record.reason);
        assert!(!dir.path().join("bad.npz").exists());
    }

    #[test]
    fn panic_is_captured() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config();
        let pipeline = FilePipeline::new(
            &config,
            FnLoader(|_: &Path| -> Result<Vec<f32>> { panic!("decoder exploded") }),
            NpzStore::new(dir.path()),
        );

        let FileOutcome::Err(record) = pipeline.process(Path::new("boom.wav")) else {
            panic!("panic should become an error record");
        };
        assert!(record.reason.contains("decoder exploded"));
    }

    #[test]
    fn too_short_signal_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config();
        let pipeline = FilePipeline::new(
            &config,
            FnLoader(|_: &Path| -> Result<Vec<f32>> { Ok(vec![0.1; 64]) }),
            NpzStore::new(dir.path()),
        );

        assert!(matches!(
            pipeline.process(Path::new("tiny.wav")),
            FileOutcome::Err(_)
        ));
        assert!(!dir.path().join("tiny.npz").exists());
    }
}
