// Artifact naming and persistence for melstack.

pub mod store;

pub use store::{ARTIFACT_EXT, NpzStore, artifact_name, read_artifact};
