//! Business logic services.

pub mod asset_service;
pub mod hash_service;
pub mod platform_service;
pub mod resolution_service;
