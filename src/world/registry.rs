//! Registry of remote avatars keyed by peer id.
//!
//! The registry is the sole owner and sole mutator of its entries, and all
//! of its methods run on the session timeline; network event ordering
//! relative to asset-load completion is not guaranteed, so stale events
//! (moves for unknown ids, duplicate joins, leaves for unknown ids) are
//! no-ops rather than errors.

use crate::assets::AvatarAsset;
use crate::world::events::{PeerId, PeerProfile, PoseUpdate};
use crate::world::remote::RemoteAvatar;
use crate::world::WorldError;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Instruction to start an avatar-asset load for a newly inserted peer.
/// The session spawns the load and routes its result back through
/// `complete_load` carrying the same generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub peer: PeerId,
    pub generation: u64,
    pub asset_name: String,
}

#[derive(Default)]
pub struct RemoteAvatarRegistry {
    entries: HashMap<PeerId, RemoteAvatar>,
    /// Expected generation for each in-flight load. A missing or mismatched
    /// generation means the result belongs to a peer that already left.
    pending: HashMap<PeerId, u64>,
    next_generation: u64,
}

impl RemoteAvatarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &PeerId) -> Option<&RemoteAvatar> {
        self.entries.get(id)
    }

    /// Iterate Active entries mutably for per-frame playback updates.
    pub fn active_mut(&mut self) -> impl Iterator<Item = &mut RemoteAvatar> + '_ {
        self.entries.values_mut().filter(|a| a.is_active())
    }

    /// Initial full peer set, delivered once after connect.
    pub fn on_join_snapshot(&mut self, peers: Vec<PeerProfile>) -> Vec<LoadTicket> {
        peers.into_iter().filter_map(|p| self.insert_peer(p)).collect()
    }

    /// A single peer joined. Idempotent: a duplicate join never creates a
    /// second entity or leaks the first.
    pub fn on_peer_joined(&mut self, peer: PeerProfile) -> Option<LoadTicket> {
        self.insert_peer(peer)
    }

    fn insert_peer(&mut self, peer: PeerProfile) -> Option<LoadTicket> {
        if self.entries.contains_key(&peer.id) {
            debug!(peer = %peer.id, "duplicate join ignored");
            return None;
        }
        self.next_generation += 1;
        let generation = self.next_generation;
        self.pending.insert(peer.id.clone(), generation);
        self.entries
            .insert(peer.id.clone(), RemoteAvatar::new(peer.display_name));
        debug!(peer = %peer.id, asset = %peer.asset_name, "remote avatar loading");
        Some(LoadTicket {
            peer: peer.id,
            generation,
            asset_name: peer.asset_name,
        })
    }

    /// A peer left: dispose and remove in one step. Unknown ids are stale
    /// events. A leave during load invalidates the pending generation so
    /// the eventual result is discarded instead of resurrecting the entry.
    pub fn on_peer_left(&mut self, id: &PeerId) -> bool {
        self.pending.remove(id);
        match self.entries.remove(id) {
            Some(mut avatar) => {
                avatar.dispose();
                true
            }
            None => {
                debug!(peer = %id, "leave for unknown peer ignored");
                false
            }
        }
    }

    /// Batched pose replication. Ids absent from the registry (not yet
    /// joined, or already gone) are dropped; Loading entries keep their
    /// defaults until activation.
    pub fn on_peers_moved(&mut self, states: HashMap<PeerId, PoseUpdate>) {
        for (id, pose) in states {
            if let Some(avatar) = self.entries.get_mut(&id) {
                if avatar.is_active() {
                    avatar.set_state(
                        pose.orientation_quat(),
                        pose.walk_dir_vec(),
                        pose.action_name,
                        pose.position_vec(),
                    );
                }
            }
        }
    }

    /// Route a finished asset load back in. Results whose generation no
    /// longer matches belong to a peer that left mid-load and are dropped
    /// without touching the registry.
    pub fn complete_load(
        &mut self,
        peer: &PeerId,
        generation: u64,
        result: Result<AvatarAsset, WorldError>,
    ) {
        match self.pending.get(peer) {
            Some(&expected) if expected == generation => {}
            _ => {
                debug!(peer = %peer, "stale asset load discarded");
                return;
            }
        }
        self.pending.remove(peer);
        match result {
            Ok(asset) => {
                if let Some(avatar) = self.entries.get_mut(peer) {
                    avatar.activate(asset);
                    debug!(peer = %peer, "remote avatar active");
                }
            }
            Err(err) => {
                // Recoverable: this one peer never appears; everyone else
                // continues unaffected.
                warn!(peer = %peer, error = %err, "remote avatar asset failed, dropping peer");
                if let Some(mut avatar) = self.entries.remove(peer) {
                    avatar.dispose();
                }
            }
        }
    }

    /// Advance clip playback for every Active entry.
    pub fn update_active(&mut self, dt: f32) {
        for avatar in self.active_mut() {
            avatar.update(dt);
        }
    }
}
