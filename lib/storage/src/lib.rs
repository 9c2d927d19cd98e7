pub mod artifact;

pub use artifact::{ArtifactDescription, ArtifactStore};
