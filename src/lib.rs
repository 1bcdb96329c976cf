//! Release Server - Backend Library
//!
//! Resolves, publishes and deletes downloadable release artifacts.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod store;
pub mod telemetry;
pub mod version;

pub use config::Config;
pub use error::{AppError, Result};
