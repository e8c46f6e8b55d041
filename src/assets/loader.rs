//! In-memory asset catalog used by the demo binary and tests.

use super::{AssetLoader, AvatarAsset};
use crate::world::{WorldError, WorldResult};
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;

/// Serves avatars from a fixed catalog, optionally simulating transfer
/// latency. Entries marked corrupt fail with `AssetCorrupt`, which lets
/// callers exercise the recoverable-peer path.
#[derive(Debug, Default)]
pub struct MemoryAssetLoader {
    catalog: HashSet<String>,
    corrupt: HashSet<String>,
    latency: Option<Duration>,
}

impl MemoryAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_models<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            catalog: models.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Simulate transfer latency on every load.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.catalog.insert(name.into());
    }

    /// Register a model that will fail to decode.
    pub fn insert_corrupt(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.catalog.insert(name.clone());
        self.corrupt.insert(name);
    }
}

#[async_trait]
impl AssetLoader for MemoryAssetLoader {
    async fn load_avatar(&self, name: &str) -> WorldResult<AvatarAsset> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if !self.catalog.contains(name) {
            return Err(WorldError::AssetNotFound {
                name: name.to_string(),
            });
        }
        if self.corrupt.contains(name) {
            return Err(WorldError::AssetCorrupt {
                name: name.to_string(),
                reason: "truncated clip data".to_string(),
            });
        }
        Ok(AvatarAsset::with_default_clips(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::avatar::ActionName;

    #[tokio::test]
    async fn serves_catalog_entries_with_all_clips() {
        let loader = MemoryAssetLoader::with_models(["bluebot"]);
        let asset = loader.load_avatar("bluebot").await.unwrap();
        assert_eq!(asset.name, "bluebot");
        for action in ActionName::ALL {
            assert!(asset.clip(action).is_some());
        }
    }

    #[tokio::test]
    async fn missing_model_is_not_found() {
        let loader = MemoryAssetLoader::new();
        let err = loader.load_avatar("ghostbot").await.unwrap_err();
        assert!(matches!(err, WorldError::AssetNotFound { .. }));
    }

    #[tokio::test]
    async fn corrupt_model_fails_to_decode() {
        let mut loader = MemoryAssetLoader::new();
        loader.insert_corrupt("bustedbot");
        let err = loader.load_avatar("bustedbot").await.unwrap_err();
        assert!(matches!(err, WorldError::AssetCorrupt { .. }));
    }
}
