use anyhow::{Context, Result};
use clap::Parser;
use ms_audio::SymphoniaLoader;
use ms_export::NpzStore;

pub mod batch;
pub mod cli;
pub mod pipeline;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3-7. Config, dossier de sortie, lot
    let summary = run(&cli)?;

    // 8. Bilan ; les échecs par fichier ne changent pas le code de sortie
    print!("{summary}");
    println!("Extraction terminée.");
    Ok(())
}

/// Charge la configuration et traite le dossier d'entrée.
///
/// Per-file failures are part of the returned summary, not an `Err`.
///
/// # Errors
/// Returns an error for an unsupported or invalid configuration document, an
/// output directory that cannot be created, or an unreadable input directory.
fn run(cli: &cli::Cli) -> Result<batch::BatchSummary> {
    // 3. Valider le document avant toute création de dossier
    cli.validate_config_path()?;

    // 4. Charger la config et appliquer les overrides CLI
    let mut config = ms_core::config::load_config(&cli.config)?;
    cli.apply_overrides(&mut config);

    // 5. Préparer le dossier de sortie
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Impossible de créer le dossier de sortie {}",
            config.output_dir.display()
        )
    })?;

    // 6. Construire le pipeline partagé
    let pipeline = pipeline::FilePipeline::new(
        &config,
        SymphoniaLoader,
        NpzStore::new(&config.output_dir),
    );
    log::info!(
        "Extraction {} → {}",
        config.input_dir.display(),
        pipeline.store().output_dir().display()
    );

    // 7. Lancer le lot
    let jobs = cli.jobs.unwrap_or_else(batch::default_jobs);
    batch::run_batch(&pipeline, &config.input_dir, jobs)
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use super::*;
    use crate::batch::tests::write_wav;
    use crate::pipeline::tests::burst;

    const CONFIG: &str = r#"{"sample_rate": 8000, "win_length": 0.032, "hop_length": 0.016,
        "n_fft": 256, "n_mels": 20, "n_mfcc": 10, "fmin": 0.0, "fmax": 4000.0,
        "htk_mel": false, "htk_mfcc": false, "center": true, "log_mel": true,
        "width": 5}"#;

    fn cli_for(root: &std::path::Path, config_name: &str) -> cli::Cli {
        let config = root.join(config_name);
        let input = root.join("audio");
        let output = root.join("out/feature");
        cli::Cli::try_parse_from([
            OsStr::new("melstack"),
            config.as_os_str(),
            OsStr::new("--input"),
            input.as_os_str(),
            OsStr::new("--output"),
            output.as_os_str(),
            OsStr::new("-j"),
            OsStr::new("2"),
        ])
        .unwrap()
    }

    #[test]
    fn failed_files_still_end_successfully() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("meta.json"), CONFIG).unwrap();
        std::fs::create_dir(root.path().join("audio")).unwrap();
        write_wav(&root.path().join("audio/good.wav"), &burst(8000));
        std::fs::write(root.path().join("audio/broken.wav"), b"").unwrap();

        let summary = run(&cli_for(root.path(), "meta.json")).unwrap();

        assert_eq!(summary.ok, 1);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].file, "broken.wav");
        assert!(root.path().join("out/feature/good.npz").is_file());
    }

    #[test]
    fn bad_extension_fails_before_creating_output() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("meta.yaml"), CONFIG).unwrap();
        std::fs::create_dir(root.path().join("audio")).unwrap();

        assert!(run(&cli_for(root.path(), "meta.yaml")).is_err());
        assert!(!root.path().join("out").exists());
    }

    #[test]
    fn missing_input_dir_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("meta.json"), CONFIG).unwrap();

        assert!(run(&cli_for(root.path(), "meta.json")).is_err());
    }
}
