use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// Configuration document with an unrecognized extension.
    #[error("Format non supporté : {format} (attendu .json ou .toml)")]
    UnsupportedFormat {
        /// The offending path.
        format: String,
    },

    /// Coefficient streams of one file disagree on their frame count.
    #[error("Flux désalignés : mel={mel} mfcc={mfcc} delta={delta} accel={accel} frames")]
    StreamMismatch {
        /// Frames in the mel stream.
        mel: usize,
        /// Frames in the MFCC stream.
        mfcc: usize,
        /// Frames in the delta stream.
        delta: usize,
        /// Frames in the acceleration stream.
        accel: usize,
    },

    /// Trim bounds reach past the end of the streams.
    #[error("Bornes hors limites : [{start}, {end}) pour {frames} frames")]
    BoundsOutOfRange {
        /// First retained frame.
        start: usize,
        /// One past the last retained frame.
        end: usize,
        /// Frames available.
        frames: usize,
    },
}
