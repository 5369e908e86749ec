// Audio loading, spectral transforms, silence trimming and feature stacking for melstack.

pub mod assemble;
pub mod decode;
pub mod delta;
pub mod error;
pub mod features;
pub mod mel;
pub mod mfcc;
pub mod resample;
pub mod stft;
pub mod trim;

pub use assemble::assemble;
pub use decode::SymphoniaLoader;
pub use error::AudioError;
pub use features::{CoefficientStreams, FeatureExtractor};
pub use trim::trim_bounds;
