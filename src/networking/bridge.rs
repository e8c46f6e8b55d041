//! Channel endpoints and wire decoding for the network boundary.

use crate::world::events::{
    ConnectionStatus, PeerId, PeerProfile, PoseUpdate, StateReport, WorldEvent,
};
use crate::world::{WorldError, WorldResult};
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Session-side endpoint: inbound world events plus the fire-and-forget
/// outbound report channel.
pub struct NetworkBridge {
    inbound_rx: mpsc::UnboundedReceiver<WorldEvent>,
    outbound_tx: mpsc::UnboundedSender<StateReport>,
}

/// Transport-side endpoint, held by the socket layer.
pub struct BridgeTransport {
    inbound_tx: mpsc::UnboundedSender<WorldEvent>,
    outbound_rx: mpsc::UnboundedReceiver<StateReport>,
}

/// Create a connected bridge/transport pair.
pub fn bridge_channel() -> (NetworkBridge, BridgeTransport) {
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    (
        NetworkBridge {
            inbound_rx,
            outbound_tx,
        },
        BridgeTransport {
            inbound_tx,
            outbound_rx,
        },
    )
}

impl NetworkBridge {
    /// Next inbound event; `None` once the transport endpoint is gone.
    pub async fn recv(&mut self) -> Option<WorldEvent> {
        self.inbound_rx.recv().await
    }

    /// Fire-and-forget state broadcast. Never blocks; a closed transport
    /// just swallows the report.
    pub fn report(&self, report: StateReport) {
        if self.outbound_tx.send(report).is_err() {
            debug!("state report dropped, transport closed");
        }
    }
}

impl BridgeTransport {
    /// Inject an already-decoded event (loopback transports, tests).
    pub fn deliver(&self, event: WorldEvent) {
        let _ = self.inbound_tx.send(event);
    }

    /// Decode one wire message and forward it. Payloads that fail
    /// validation (missing id/displayName, unknown action names) are
    /// dropped here with a warning, never surfaced to the session.
    pub fn deliver_wire(&self, kind: &str, payload: &str) {
        match parse_event(kind, payload) {
            Ok(event) => self.deliver(event),
            Err(err) => warn!(%kind, error = %err, "dropping malformed wire event"),
        }
    }

    pub fn connection_changed(&self, status: ConnectionStatus) {
        self.deliver(WorldEvent::ConnectionChanged(status));
    }

    /// Next outbound state report; `None` once the session is gone.
    pub async fn next_report(&mut self) -> Option<StateReport> {
        self.outbound_rx.recv().await
    }

    pub fn try_next_report(&mut self) -> Option<StateReport> {
        self.outbound_rx.try_recv().ok()
    }
}

pub const EVENT_JOIN_SNAPSHOT: &str = "join-snapshot";
pub const EVENT_PEER_JOINED: &str = "peer-joined";
pub const EVENT_PEER_LEFT: &str = "peer-left";
pub const EVENT_PEERS_MOVED: &str = "peers-moved";

#[derive(Debug, Deserialize)]
struct SnapshotPayload {
    peers: Vec<PeerProfile>,
}

#[derive(Debug, Deserialize)]
struct LeftPayload {
    id: PeerId,
}

fn decode_err(kind: &str, err: serde_json::Error) -> WorldError {
    WorldError::PayloadDecode {
        kind: kind.to_string(),
        reason: err.to_string(),
    }
}

/// Decode one of the four wire event kinds into a world event.
pub fn parse_event(kind: &str, payload: &str) -> WorldResult<WorldEvent> {
    match kind {
        EVENT_JOIN_SNAPSHOT => {
            let body: SnapshotPayload =
                serde_json::from_str(payload).map_err(|e| decode_err(kind, e))?;
            Ok(WorldEvent::JoinSnapshot(body.peers))
        }
        EVENT_PEER_JOINED => {
            let body: PeerProfile =
                serde_json::from_str(payload).map_err(|e| decode_err(kind, e))?;
            Ok(WorldEvent::PeerJoined(body))
        }
        EVENT_PEER_LEFT => {
            let body: LeftPayload =
                serde_json::from_str(payload).map_err(|e| decode_err(kind, e))?;
            Ok(WorldEvent::PeerLeft(body.id))
        }
        EVENT_PEERS_MOVED => {
            let body: HashMap<PeerId, PoseUpdate> =
                serde_json::from_str(payload).map_err(|e| decode_err(kind, e))?;
            Ok(WorldEvent::PeersMoved(body))
        }
        other => Err(WorldError::UnknownEventKind {
            kind: other.to_string(),
        }),
    }
}
