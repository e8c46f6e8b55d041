//! Events exchanged between the network bridge and the world session.
//!
//! These are clean, application-friendly data structures; the wire-level
//! payload structs use camelCase field names as emitted by the server.

use crate::assets::AvatarAsset;
use crate::world::avatar::ActionName;
use crate::world::WorldError;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::utils::math;

/// Server-assigned connection identifier, unique per connection.
/// Opaque: nothing beyond equality and hashing may be assumed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(pub String);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(value: &str) -> Self {
        PeerId(value.to_string())
    }
}

/// Connection status enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
    Error(String),
}

/// Identity block delivered with join-snapshot and peer-joined.
/// All three fields are required; a payload missing any of them fails
/// decoding and is dropped at the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerProfile {
    pub id: PeerId,
    pub display_name: String,
    pub asset_name: String,
}

/// One peer's replicated pose. Applied last-write-wins: each update fully
/// replaces the previous transform and animation selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseUpdate {
    /// Quaternion as (x, y, z, w)
    pub orientation: [f32; 4],
    pub walk_direction: [f32; 3],
    pub action_name: ActionName,
    pub position: [f32; 3],
}

impl PoseUpdate {
    pub fn orientation_quat(&self) -> Quat {
        math::normalize_or_identity(Quat::from_array(self.orientation))
    }

    pub fn walk_dir_vec(&self) -> Vec3 {
        Vec3::from_array(self.walk_direction)
    }

    pub fn position_vec(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// Outbound per-tick pose broadcast for the local avatar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateReport {
    /// Quaternion as (x, y, z, w)
    pub orientation: [f32; 4],
    pub walk_direction: [f32; 3],
    pub action_name: ActionName,
    pub position: [f32; 3],
}

/// Inbound events consumed by the world session on its single timeline.
#[derive(Debug)]
pub enum WorldEvent {
    /// Full set of already-connected peers, delivered once after connect.
    JoinSnapshot(Vec<PeerProfile>),
    /// A new peer joined the world.
    PeerJoined(PeerProfile),
    /// A peer left the world.
    PeerLeft(PeerId),
    /// Batched pose replication for moved peers.
    PeersMoved(HashMap<PeerId, PoseUpdate>),
    /// Transport connection state changed.
    ConnectionChanged(ConnectionStatus),
    /// Completion of a spawned avatar-asset load, routed back onto the
    /// session timeline. The registry discards stale generations.
    AssetLoaded {
        peer: PeerId,
        generation: u64,
        result: Result<AvatarAsset, WorldError>,
    },
}
