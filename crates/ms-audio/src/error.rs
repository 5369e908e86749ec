use thiserror::Error;

/// Errors originating from the audio module.
#[derive(Error, Debug)]
pub enum AudioError {
    /// Unsupported audio format.
    #[error("Format audio non supporté : {0}")]
    UnsupportedFormat(String),

    /// Audio decode error.
    #[error("Erreur de décodage : {0}")]
    DecodeError(String),

    /// Resampler construction or processing failure.
    #[error("Erreur de rééchantillonnage : {0}")]
    ResampleError(String),

    /// Delta window wider than the signal.
    #[error("Largeur delta {width} supérieure au nombre de frames ({frames})")]
    DeltaWidth {
        /// Requested window width.
        width: usize,
        /// Frames available.
        frames: usize,
    },

    /// Delta order other than 1 or 2.
    #[error("Ordre delta non supporté : {0}")]
    DeltaOrder(usize),
}
