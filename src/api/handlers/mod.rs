//! HTTP handlers.

pub mod assets;
pub mod downloads;
pub mod health;
pub mod releases;
