//! Data models.

pub mod artifact;
pub mod release;

pub use artifact::Artifact;
pub use release::Release;
