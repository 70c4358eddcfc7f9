//! Request extractors and layers: authentication, role checks, mock-backend simulation.

pub mod auth;
pub mod rbac;
pub mod simulation;
