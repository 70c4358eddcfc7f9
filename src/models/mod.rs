//! Domain models and DTOs for the dataset and the API.

pub mod dashboard;
pub mod navigation;
pub mod user;
