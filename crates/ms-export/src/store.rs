use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ms_core::matrix::{FEATURE_KEY, FeatureMatrix};
use ms_core::traits::ArtifactStore;
use ndarray::Array2;
use ndarray_npy::{NpzReader, NpzWriter};

/// Extension fixe des artefacts.
pub const ARTIFACT_EXT: &str = "npz";

/// Artifact name for `input`: its file stem plus [`ARTIFACT_EXT`].
///
/// Only the last extension is stripped, so `take.01.wav` becomes
/// `take.01.npz`. Returns `None` for paths without a file name.
///
/// # Example
/// ```
/// use ms_export::store::artifact_name;
/// use std::path::Path;
/// assert_eq!(artifact_name(Path::new("in/voice.wav")).as_deref(), Some("voice.npz"));
/// assert_eq!(artifact_name(Path::new("..")), None);
/// ```
#[must_use]
pub fn artifact_name(input: &Path) -> Option<String> {
    let stem = input.file_stem()?.to_str()?;
    Some(format!("{stem}.{ARTIFACT_EXT}"))
}

/// Stockage `.npz` : un fichier par entrée, un seul tableau `feature`.
///
/// Writes go to a hidden `.partial` sibling first and are renamed into place,
/// so an existing `<stem>.npz` is always a complete archive.
#[derive(Clone, Debug)]
pub struct NpzStore {
    output_dir: PathBuf,
}

impl NpzStore {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Directory the artifacts are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn partial_path(artifact: &Path) -> PathBuf {
        let name = artifact
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        artifact.with_file_name(format!(".{name}.partial"))
    }

    fn write_npz(path: &Path, matrix: &FeatureMatrix) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Impossible de créer {}", path.display()))?;
        let mut npz = NpzWriter::new(BufWriter::new(file));
        npz.add_array(FEATURE_KEY, matrix.data())
            .context("Écriture du tableau npz")?;
        let mut writer = npz.finish().context("Finalisation de l'archive npz")?;
        writer.flush()?;
        Ok(())
    }
}

impl ArtifactStore for NpzStore {
    fn artifact_path(&self, input: &Path) -> Option<PathBuf> {
        artifact_name(input).map(|name| self.output_dir.join(name))
    }

    fn save(&self, artifact: &Path, matrix: &FeatureMatrix) -> Result<()> {
        let partial = Self::partial_path(artifact);
        if let Err(e) = Self::write_npz(&partial, matrix) {
            let _ = std::fs::remove_file(&partial);
            return Err(e);
        }
        if let Err(e) = std::fs::rename(&partial, artifact) {
            let _ = std::fs::remove_file(&partial);
            return Err(e).with_context(|| format!("Impossible de finaliser {}", artifact.display()));
        }
        log::debug!(
            "{} écrit ({}×{})",
            artifact.display(),
            matrix.shape().0,
            matrix.shape().1
        );
        Ok(())
    }
}

/// Relit le tableau `feature` d'un artefact.
///
/// # Errors
/// Returns an error if the file is missing, not an npz archive, or has no
/// `feature` array of 2-D `f32`.
pub fn read_artifact(path: &Path) -> Result<Array2<f32>> {
    let file =
        File::open(path).with_context(|| format!("Impossible d'ouvrir {}", path.display()))?;
    let mut npz = NpzReader::new(BufReader::new(file))
        .with_context(|| format!("Archive npz invalide : {}", path.display()))?;
    let name = npz
        .names()?
        .into_iter()
        .find(|n| n.trim_end_matches(".npy") == FEATURE_KEY)
        .with_context(|| format!("Pas de tableau '{FEATURE_KEY}' dans {}", path.display()))?;
    let array: Array2<f32> = npz.by_name(&name)?;
    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_stems_give_distinct_artifacts() {
        let store = NpzStore::new("out");
        let a = store.artifact_path(Path::new("in/speaker_a.wav")).unwrap();
        let b = store.artifact_path(Path::new("in/speaker_b.wav")).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, Path::new("out/speaker_a.npz"));
    }

    #[test]
    fn only_last_extension_is_stripped() {
        assert_eq!(artifact_name(Path::new("take.01.flac")).as_deref(), Some("take.01.npz"));
        assert_eq!(artifact_name(Path::new("noext")).as_deref(), Some("noext.npz"));
    }

    #[test]
    fn save_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = NpzStore::new(dir.path());
        let data = Array2::from_shape_fn((3, 5), |(i, j)| i as f32 * 0.5 - j as f32);
        let artifact = store.artifact_path(Path::new("clip.wav")).unwrap();

        store.save(&artifact, &FeatureMatrix::new(data.clone())).unwrap();

        assert!(store.contains(&artifact));
        assert_eq!(read_artifact(&artifact).unwrap(), data);
        assert!(!NpzStore::partial_path(&artifact).exists());
    }

    #[test]
    fn empty_matrix_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = NpzStore::new(dir.path());
        let artifact = store.artifact_path(Path::new("silence.wav")).unwrap();

        store
            .save(&artifact, &FeatureMatrix::new(Array2::zeros((0, 11))))
            .unwrap();

        assert_eq!(read_artifact(&artifact).unwrap().dim(), (0, 11));
    }

    #[test]
    fn failed_save_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = NpzStore::new(dir.path().join("missing"));
        let artifact = store.artifact_path(Path::new("clip.wav")).unwrap();

        assert!(
            store
                .save(&artifact, &FeatureMatrix::new(Array2::zeros((1, 1))))
                .is_err()
        );
        assert!(!store.contains(&artifact));
    }
}
