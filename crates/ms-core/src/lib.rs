/// Configuration, types, and shared structures for melstack.
///
/// This crate holds the parameter set, error types, frame geometry, the
/// feature matrix, and the loader/store traits used across the workspace.

pub mod config;
pub mod error;
pub mod frame;
pub mod matrix;
pub mod traits;

pub use config::FeatureConfig;
pub use error::CoreError;
pub use frame::{FrameGeometry, TrimBounds};
pub use matrix::{FEATURE_KEY, FeatureMatrix};
