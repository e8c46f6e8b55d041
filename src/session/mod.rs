//! World session: the single-timeline frame loop that owns all mutable
//! world state.
//!
//! One tokio task owns the local avatar, the remote registry, and the
//! input table. Inbound network events, asset-load completions, and key
//! transitions are drained between ticks on that same task, so entity
//! state needs no locking. Each tick runs local update, outbound
//! broadcast, remote playback, the physics stub, then the render handoff,
//! in that order; the renderer always observes the current tick's updates,
//! never a mix.

pub mod frame;

pub use frame::FrameClock;

use crate::assets::AssetLoader;
use crate::config::SessionSettings;
use crate::networking::NetworkBridge;
use crate::world::avatar::{CameraRig, LocalAvatar, MovementTuning};
use crate::world::events::{ConnectionStatus, PeerId, WorldEvent};
use crate::world::input::InputTracker;
use crate::world::physics::PhysicsWorld;
use crate::world::registry::{LoadTicket, RemoteAvatarRegistry};
use crate::world::WorldResult;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Opaque scene-graph handle passed through to the renderer each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneHandle(pub Uuid);

impl SceneHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SceneHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque camera handle passed through to the renderer each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraHandle(pub Uuid);

impl CameraHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CameraHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// External render boundary. Synchronous and assumed to fit the frame
/// budget; GPU resources are entirely its problem.
pub trait Renderer: Send {
    fn render(&mut self, scene: &SceneHandle, camera: &CameraHandle);
}

/// Control endpoint for a running session: key-state feed, camera yaw,
/// and shutdown. Dropping the last handle also ends the session.
#[derive(Clone)]
pub struct SessionHandle {
    keys_tx: mpsc::UnboundedSender<(String, bool)>,
    camera_tx: watch::Sender<f32>,
    shutdown_tx: watch::Sender<bool>,
}

impl SessionHandle {
    /// Forward a key transition from the window layer.
    pub fn set_key(&self, name: &str, pressed: bool) {
        let _ = self.keys_tx.send((name.to_string(), pressed));
    }

    /// Forward the orbit camera's current yaw.
    pub fn set_camera_yaw(&self, yaw: f32) {
        let _ = self.camera_tx.send(yaw);
    }

    /// Request session teardown.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// A live world session. Owns every mutable piece of world state; nothing
/// outside this struct may hold a reference into the registry across ticks.
pub struct WorldSession<R: Renderer> {
    settings: SessionSettings,
    local: LocalAvatar,
    registry: RemoteAvatarRegistry,
    input: InputTracker,
    physics: PhysicsWorld,
    scene: SceneHandle,
    camera: CameraHandle,
    renderer: R,
    bridge: NetworkBridge,
    loader: Arc<dyn AssetLoader>,
    /// In-flight remote asset loads, aborted on peer-left and teardown.
    loads: HashMap<PeerId, JoinHandle<()>>,
    internal_tx: mpsc::UnboundedSender<WorldEvent>,
    internal_rx: mpsc::UnboundedReceiver<WorldEvent>,
    keys_rx: mpsc::UnboundedReceiver<(String, bool)>,
    camera_rx: watch::Receiver<f32>,
    shutdown_rx: watch::Receiver<bool>,
    clock: FrameClock,
    online: bool,
    bridge_closed: bool,
    input_closed: bool,
    frames: u64,
}

impl<R: Renderer> WorldSession<R> {
    /// Load the local avatar and assemble the session.
    ///
    /// The frame loop does not exist until this resolves, so nothing can
    /// update or broadcast a not-yet-loaded player. A load failure here is
    /// fatal: the world never starts and the caller returns the user to
    /// the previous screen.
    pub async fn start(
        settings: SessionSettings,
        loader: Arc<dyn AssetLoader>,
        renderer: R,
        bridge: NetworkBridge,
        scene: SceneHandle,
        camera: CameraHandle,
    ) -> WorldResult<(Self, SessionHandle)> {
        let tuning = MovementTuning {
            walk_speed: settings.movement.walk_speed,
            run_speed: settings.movement.run_speed,
        };
        let local = LocalAvatar::load(
            loader.as_ref(),
            &settings.identity.asset_name,
            &settings.identity.display_name,
            tuning,
        )
        .await
        .map_err(|err| {
            error!(error = %err, "local avatar load failed, session aborted");
            err
        })?;
        info!(player = %settings.identity.display_name, "local avatar loaded, entering world");

        let (keys_tx, keys_rx) = mpsc::unbounded_channel();
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let (camera_tx, camera_rx) = watch::channel(0.0f32);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = SessionHandle {
            keys_tx,
            camera_tx,
            shutdown_tx,
        };
        let session = Self {
            settings,
            local,
            registry: RemoteAvatarRegistry::new(),
            input: InputTracker::new(),
            physics: PhysicsWorld::new(),
            scene,
            camera,
            renderer,
            bridge,
            loader,
            loads: HashMap::new(),
            internal_tx,
            internal_rx,
            keys_rx,
            camera_rx,
            shutdown_rx,
            clock: FrameClock::new(),
            online: true,
            bridge_closed: false,
            input_closed: false,
            frames: 0,
        };
        Ok((session, handle))
    }

    pub fn local(&self) -> &LocalAvatar {
        &self.local
    }

    pub fn registry(&self) -> &RemoteAvatarRegistry {
        &self.registry
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run the frame loop until shutdown. Returns the final session state
    /// so callers can inspect or hand off the world after teardown.
    pub async fn run(mut self) -> Self {
        let tick = Duration::from_secs_f64(1.0 / f64::from(self.settings.frame.tick_hz.max(1)));
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(tick_hz = self.settings.frame.tick_hz, "frame loop started");

        loop {
            tokio::select! {
                biased;
                changed = self.shutdown_rx.changed() => {
                    match changed {
                        Ok(()) if !*self.shutdown_rx.borrow() => {}
                        // Requested, or every handle is gone
                        _ => break,
                    }
                }
                maybe_key = self.keys_rx.recv(), if !self.input_closed => {
                    match maybe_key {
                        Some((key, pressed)) => self.input.set_key(&key, pressed),
                        None => self.input_closed = true,
                    }
                }
                maybe_event = self.bridge.recv(), if !self.bridge_closed => {
                    match maybe_event {
                        Some(event) => self.handle_event(event),
                        None => {
                            self.bridge_closed = true;
                            self.handle_event(WorldEvent::ConnectionChanged(
                                ConnectionStatus::Disconnected,
                            ));
                        }
                    }
                }
                Some(event) = self.internal_rx.recv() => self.handle_event(event),
                _ = interval.tick() => self.step(),
            }
        }

        self.teardown();
        self
    }

    /// One frame: local update, broadcast, remote playback, physics stub,
    /// render. The order is fixed.
    fn step(&mut self) {
        let dt = self.clock.delta();
        let camera = CameraRig {
            yaw: *self.camera_rx.borrow(),
        };

        self.local.update(dt, &self.input, &camera);

        if self.online {
            // Unthrottled by contract: one report per tick, fire and forget
            self.bridge.report(self.local.state_report());
            self.registry.update_active(dt);
        }

        self.physics.step(dt);
        self.renderer.render(&self.scene, &self.camera);
        self.frames += 1;
    }

    fn handle_event(&mut self, event: WorldEvent) {
        match event {
            WorldEvent::JoinSnapshot(peers) => {
                debug!(count = peers.len(), "join snapshot received");
                for ticket in self.registry.on_join_snapshot(peers) {
                    self.spawn_load(ticket);
                }
            }
            WorldEvent::PeerJoined(profile) => {
                if let Some(ticket) = self.registry.on_peer_joined(profile) {
                    self.spawn_load(ticket);
                }
            }
            WorldEvent::PeerLeft(id) => {
                if let Some(load) = self.loads.remove(&id) {
                    load.abort();
                }
                self.registry.on_peer_left(&id);
            }
            WorldEvent::PeersMoved(states) => self.registry.on_peers_moved(states),
            WorldEvent::ConnectionChanged(status) => {
                let online = status == ConnectionStatus::Connected;
                if online != self.online {
                    info!(?status, "connection changed");
                }
                // Offline freezes remote playback and outbound reports;
                // registry contents stay put so reconnect resumes from the
                // last known poses.
                self.online = online;
            }
            WorldEvent::AssetLoaded {
                peer,
                generation,
                result,
            } => {
                self.loads.remove(&peer);
                self.registry.complete_load(&peer, generation, result);
            }
        }
    }

    fn spawn_load(&mut self, ticket: LoadTicket) {
        let LoadTicket {
            peer,
            generation,
            asset_name,
        } = ticket;
        let loader = Arc::clone(&self.loader);
        let events = self.internal_tx.clone();
        let task_peer = peer.clone();
        let handle = tokio::spawn(async move {
            let result = loader.load_avatar(&asset_name).await;
            // Send fails only during teardown, and teardown wants the
            // result dropped anyway
            let _ = events.send(WorldEvent::AssetLoaded {
                peer: task_peer,
                generation,
                result,
            });
        });
        self.loads.insert(peer, handle);
    }

    fn teardown(&mut self) {
        for (_, load) in self.loads.drain() {
            load.abort();
        }
        info!(frames = self.frames, "session torn down");
    }
}
