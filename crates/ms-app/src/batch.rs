use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ms_core::traits::{ArtifactStore, WaveformLoader};
use rayon::prelude::*;

use crate::pipeline::{ErrorRecord, FileOutcome, FilePipeline};

/// Bilan d'un lot : compte des succès, des fichiers ignorés et des échecs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Artifacts written during this run.
    pub ok: usize,
    /// Inputs whose artifact already existed.
    pub skipped: usize,
    /// One record per failed input.
    pub errors: Vec<ErrorRecord>,
}

impl BatchSummary {
    fn from_outcomes(outcomes: impl IntoIterator<Item = FileOutcome>) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Ok(_) => summary.ok += 1,
                FileOutcome::Skip(_) => summary.skipped += 1,
                FileOutcome::Err(record) => summary.errors.push(record),
            }
        }
        summary
    }

    /// Inputs dispatched.
    #[must_use]
    pub fn total(&self) -> usize {
        self.ok + self.skipped + self.errors.len()
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} fichier(s) : {} extrait(s), {} ignoré(s), {} échec(s)",
            self.total(),
            self.ok,
            self.skipped,
            self.errors.len()
        )?;
        for record in &self.errors {
            writeln!(f, "  échec {record}")?;
        }
        Ok(())
    }
}

/// Nombre de workers par défaut : unités d'exécution disponibles.
#[must_use]
pub fn default_jobs() -> usize {
    std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

/// Liste toutes les entrées de `dir`, triées, sans aucun filtre.
///
/// Entries that cannot be decoded (sub-directories included) are dispatched
/// anyway and end up as error records. Inputs that share a file stem would
/// write the same artifact; they are reported at `warn` and all kept.
///
/// # Errors
/// Returns an error if `dir` cannot be read.
pub fn list_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Impossible de lire le dossier {}", dir.display()))?
    {
        files.push(entry?.path());
    }
    files.sort();

    let mut by_stem: HashMap<&std::ffi::OsStr, usize> = HashMap::new();
    for stem in files.iter().filter_map(|p| p.file_stem()) {
        *by_stem.entry(stem).or_default() += 1;
    }
    for (stem, count) in by_stem.iter().filter(|(_, c)| **c > 1) {
        log::warn!(
            "{count} entrées partagent le nom de base '{}' : un seul artefact sera produit",
            stem.to_string_lossy()
        );
    }

    Ok(files)
}

/// Lance le pipeline sur chaque fichier de `input_dir` avec `jobs` workers.
///
/// Returns once every file has been handled. Per-file failures are collected
/// in the summary; only an unreadable `input_dir` or a pool that cannot be
/// built fails the batch.
///
/// # Errors
/// Returns an error if the directory cannot be listed or the thread pool
/// cannot be created.
pub fn run_batch<L, S>(
    pipeline: &FilePipeline<'_, L, S>,
    input_dir: &Path,
    jobs: usize,
) -> Result<BatchSummary>
where
    L: WaveformLoader,
    S: ArtifactStore,
{
    let files = list_inputs(input_dir)?;
    log::info!(
        "{} fichier(s) dans {}, {} worker(s)",
        files.len(),
        input_dir.display(),
        jobs
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .thread_name(|i| format!("melstack-worker-{i}"))
        .build()
        .context("Création du pool de workers")?;

    let outcomes: Vec<FileOutcome> =
        pool.install(|| files.par_iter().map(|f| pipeline.process(f)).collect());

    Ok(BatchSummary::from_outcomes(outcomes))
}
