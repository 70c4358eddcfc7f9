//! Business logic services.

pub mod access;
pub mod auth;
pub mod dashboard;
pub mod export;
pub mod profile;
pub mod stats;
