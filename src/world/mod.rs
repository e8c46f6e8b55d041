//! World-state model
//!
//! This module owns everything the frame loop mutates: the local player's
//! avatar, the registry of remote avatars driven by network events, the
//! keyboard state table, and the event types exchanged with the bridge.

pub mod avatar;
pub mod events;
pub mod input;
pub mod physics;
pub mod registry;
pub mod remote;

// Re-export main types for convenience
pub use avatar::{ActionName, AnimationState, CameraRig, LocalAvatar, MovementTuning, Transform};
pub use events::{ConnectionStatus, PeerId, PeerProfile, PoseUpdate, StateReport, WorldEvent};
pub use input::InputTracker;
pub use registry::{LoadTicket, RemoteAvatarRegistry};
pub use remote::{RemoteAvatar, RemoteLifecycle};

// Error types
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum WorldError {
    #[error("Asset not found: {name}")]
    AssetNotFound { name: String },

    #[error("Asset corrupt: {name}: {reason}")]
    AssetCorrupt { name: String, reason: String },

    #[error("Unknown action name: {name}")]
    UnknownAction { name: String },

    #[error("Payload decode failed for '{kind}': {reason}")]
    PayloadDecode { kind: String, reason: String },

    #[error("Unknown event kind: {kind}")]
    UnknownEventKind { kind: String },

    #[error("Config error: {reason}")]
    Config { reason: String },
}

pub type WorldResult<T> = Result<T, WorldError>;

impl From<std::io::Error> for WorldError {
    fn from(err: std::io::Error) -> Self {
        WorldError::Config { reason: err.to_string() }
    }
}
