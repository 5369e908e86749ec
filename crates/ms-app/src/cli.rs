use std::path::PathBuf;

use clap::Parser;
use ms_core::config::{FeatureConfig, check_extension};

/// melstack : extraction par lots de matrices mel/MFCC/delta.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Document de configuration (.json ou .toml).
    pub config: PathBuf,

    /// Dossier d'entrée (remplace `input_dir` du document).
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Dossier de sortie des artefacts .npz (remplace `output_dir`).
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Nombre de workers. Défaut : parallélisme disponible.
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Reject a configuration path whose extension is not `json` or `toml`.
    ///
    /// # Errors
    /// Returns an error naming the offending path.
    pub fn validate_config_path(&self) -> anyhow::Result<()> {
        check_extension(&self.config)?;
        Ok(())
    }

    /// Apply `--input`/`--output` on top of the loaded document.
    pub fn apply_overrides(&self, config: &mut FeatureConfig) {
        if let Some(dir) = &self.input {
            config.input_dir.clone_from(dir);
        }
        if let Some(dir) = &self.output {
            config.output_dir.clone_from(dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_core::config::parse_config;

    #[test]
    fn positional_config_and_overrides() {
        let cli = Cli::try_parse_from([
            "melstack", "meta.toml", "--input", "wavs", "--output", "feats", "-j", "3",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("meta.toml"));
        assert_eq!(cli.jobs, Some(3));
        assert_eq!(cli.log_level, "warn");
        cli.validate_config_path().unwrap();

        let mut config = parse_config(
            r#"{"sample_rate": 8000, "win_length": 0.032, "hop_length": 0.016,
                "n_fft": 256, "n_mels": 20, "n_mfcc": 10, "fmin": 0.0, "fmax": 4000.0,
                "htk_mel": false, "htk_mfcc": false, "center": true, "log_mel": true,
                "width": 5, "input_dir": "a", "output_dir": "b"}"#,
            "json",
        )
        .unwrap();
        cli.apply_overrides(&mut config);
        assert_eq!(config.input_dir, PathBuf::from("wavs"));
        assert_eq!(config.output_dir, PathBuf::from("feats"));
    }

    #[test]
    fn config_is_required() {
        assert!(Cli::try_parse_from(["melstack"]).is_err());
    }

    #[test]
    fn bad_extension_rejected() {
        let cli = Cli::try_parse_from(["melstack", "meta.yaml"]).unwrap();
        assert!(cli.validate_config_path().is_err());
    }
}
