//! Avatar asset contract.
//!
//! Decoding and IO live behind `AssetLoader`; the session only ever sees
//! opaque handles and named animation clips.

pub mod loader;

// Re-export main types for convenience
pub use loader::MemoryAssetLoader;

use crate::world::avatar::ActionName;
use crate::world::WorldResult;
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

/// Opaque handle to loaded visual data owned by the render layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetHandle(pub Uuid);

impl AssetHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AssetHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// One named animation clip.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub action: ActionName,
    pub duration_secs: f32,
}

/// A loaded avatar: visual handle plus one clip per known action.
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarAsset {
    pub name: String,
    pub handle: AssetHandle,
    pub clips: HashMap<ActionName, AnimationClip>,
}

impl AvatarAsset {
    /// Build an asset carrying a one-second clip for every known action.
    /// Enough for playback selection; real durations come from the loader.
    pub fn with_default_clips(name: impl Into<String>) -> Self {
        let clips = ActionName::ALL
            .iter()
            .map(|&action| {
                (
                    action,
                    AnimationClip {
                        action,
                        duration_secs: 1.0,
                    },
                )
            })
            .collect();
        Self {
            name: name.into(),
            handle: AssetHandle::new(),
            clips,
        }
    }

    pub fn clip(&self, action: ActionName) -> Option<&AnimationClip> {
        self.clips.get(&action)
    }
}

/// Boundary to the asset pipeline.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    /// Resolve a named avatar asset. Fails with `AssetNotFound` or
    /// `AssetCorrupt`; whether to retry is the caller's choice.
    async fn load_avatar(&self, name: &str) -> WorldResult<AvatarAsset>;
}
