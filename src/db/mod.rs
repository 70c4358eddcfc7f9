//! File-backed dataset store.
//!
//! The whole dataset lives in memory as an immutable [`Dataset`] behind an
//! [`Arc`]. Readers take a snapshot and never hold the lock while computing.
//! Writers (profile updates only) clone, modify, swap and persist.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::dashboard::{Orders, Revenue, Stats, Traffic, UserDistribution};
use crate::models::user::Profile;
use crate::services::auth as auth_service;

/// All collections served by the API, as laid out in the seed file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    #[serde(default)]
    pub stats: Vec<Stats>,
    #[serde(default)]
    pub revenue: Vec<Revenue>,
    #[serde(default)]
    pub orders: Vec<Orders>,
    #[serde(default)]
    pub users: Vec<UserDistribution>,
    #[serde(default)]
    pub traffic: Vec<Traffic>,
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl Dataset {
    /// Parse a dataset from seed JSON.
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Replace plaintext profile passwords with argon2 hashes.
    ///
    /// Returns how many passwords were hashed.
    pub fn hash_plaintext_passwords(&mut self) -> Result<usize, AppError> {
        let mut hashed = 0;
        for profile in self.profiles.iter_mut() {
            if !auth_service::is_password_hash(&profile.password) {
                profile.password = auth_service::hash_password(&profile.password)?;
                hashed += 1;
            }
        }
        Ok(hashed)
    }

    pub fn find_profile(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }
}

/// Shared handle to the in-memory dataset and its backing file.
#[derive(Debug)]
pub struct Store {
    path: Option<PathBuf>,
    data: RwLock<Arc<Dataset>>,
}

impl Store {
    /// Load the dataset from `path`, hashing any plaintext passwords in memory.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();
        let raw = tokio::fs::read_to_string(&path).await?;
        let mut dataset = Dataset::from_json(&raw)?;

        let hashed = dataset.hash_plaintext_passwords()?;
        if hashed > 0 {
            tracing::warn!(
                count = hashed,
                path = %path.display(),
                "Seed file contains plaintext passwords; run the seed binary to persist hashes"
            );
        }

        tracing::info!(
            path = %path.display(),
            stats = dataset.stats.len(),
            revenue = dataset.revenue.len(),
            orders = dataset.orders.len(),
            users = dataset.users.len(),
            traffic = dataset.traffic.len(),
            profiles = dataset.profiles.len(),
            "Dataset loaded"
        );

        Ok(Self {
            path: Some(path),
            data: RwLock::new(Arc::new(dataset)),
        })
    }

    /// Wrap an already-built dataset with no backing file.
    pub fn in_memory(dataset: Dataset) -> Self {
        Self {
            path: None,
            data: RwLock::new(Arc::new(dataset)),
        }
    }

    /// Current read-only view of the dataset.
    pub async fn snapshot(&self) -> Arc<Dataset> {
        self.data.read().await.clone()
    }

    /// Apply `update` to the profile with `id`, swap in the new dataset and persist it.
    ///
    /// Persist failures are logged; the in-memory update still stands.
    pub async fn update_profile<F>(&self, id: &str, update: F) -> Result<Profile, AppError>
    where
        F: FnOnce(&mut Profile),
    {
        let mut guard = self.data.write().await;
        let mut next = (**guard).clone();

        let profile = next
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        update(profile);
        let updated = profile.clone();

        // Persist while still holding the write lock so files land in update order.
        if let Err(e) = self.persist(&next).await {
            tracing::warn!(error = %e, "Could not persist dataset to disk");
        }
        *guard = Arc::new(next);

        Ok(updated)
    }

    async fn persist(&self, dataset: &Dataset) -> Result<(), AppError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(dataset)?;
        tokio::fs::write(path, json).await?;
        tracing::debug!(path = %path.display(), "Dataset persisted");
        Ok(())
    }
}
