use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use worldlink::assets::MemoryAssetLoader;
use worldlink::config::SessionSettings;
use worldlink::networking::{bridge_channel, BridgeTransport};
use worldlink::session::{CameraHandle, Renderer, SceneHandle, SessionHandle, WorldSession};
use worldlink::world::events::{ConnectionStatus, PeerProfile, StateReport, WorldEvent};
use worldlink::world::ActionName;
use worldlink::WorldError;

#[derive(Clone, Default)]
struct CountingRenderer {
    frames: Arc<AtomicU64>,
}

impl Renderer for CountingRenderer {
    fn render(&mut self, _scene: &SceneHandle, _camera: &CameraHandle) {
        self.frames.fetch_add(1, Ordering::SeqCst);
    }
}

type SessionTask = tokio::task::JoinHandle<WorldSession<CountingRenderer>>;

async fn start_session(
    loader: MemoryAssetLoader,
) -> (SessionTask, SessionHandle, BridgeTransport, Arc<AtomicU64>) {
    let (bridge, transport) = bridge_channel();
    let renderer = CountingRenderer::default();
    let frames = renderer.frames.clone();
    let (session, handle) = WorldSession::start(
        SessionSettings::default(),
        Arc::new(loader),
        renderer,
        bridge,
        SceneHandle::new(),
        CameraHandle::new(),
    )
    .await
    .expect("session start");
    let task = tokio::spawn(session.run());
    (task, handle, transport, frames)
}

fn drain(transport: &mut BridgeTransport) -> Vec<StateReport> {
    let mut reports = Vec::new();
    while let Some(report) = transport.try_next_report() {
        reports.push(report);
    }
    reports
}

#[tokio::test(start_paused = true)]
async fn nothing_runs_before_the_local_avatar_loads() {
    let loader =
        MemoryAssetLoader::with_models(["bluebot"]).with_latency(Duration::from_millis(300));
    let (bridge, mut transport) = bridge_channel();

    let starting = tokio::spawn(WorldSession::start(
        SessionSettings::default(),
        Arc::new(loader),
        CountingRenderer::default(),
        bridge,
        SceneHandle::new(),
        CameraHandle::new(),
    ));

    // Load still pending: no loop, no reports
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!starting.is_finished());
    assert!(transport.try_next_report().is_none());

    let (session, handle) = starting.await.unwrap().expect("session start");
    // Loaded but loop not yet running: still no reports
    assert!(transport.try_next_report().is_none());

    let task = tokio::spawn(session.run());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(transport.try_next_report().is_some());

    handle.shutdown();
    let session = task.await.unwrap();

    // One report per tick while online: the one consumed above plus the
    // rest of the queue accounts for every frame
    let remaining = drain(&mut transport).len() as u64;
    assert_eq!(remaining + 1, session.frames());
}

#[tokio::test]
async fn missing_local_asset_is_fatal_to_session_start() {
    let (bridge, _transport) = bridge_channel();
    let result = WorldSession::start(
        SessionSettings::default(),
        Arc::new(MemoryAssetLoader::new()),
        CountingRenderer::default(),
        bridge,
        SceneHandle::new(),
        CameraHandle::new(),
    )
    .await;

    match result {
        Err(WorldError::AssetNotFound { name }) => assert_eq!(name, "bluebot"),
        other => panic!("expected fatal asset error, got {:?}", other.is_ok()),
    }
}

#[tokio::test(start_paused = true)]
async fn held_forward_key_moves_the_avatar_and_broadcasts_walk() {
    let loader = MemoryAssetLoader::with_models(["bluebot"]);
    let (task, handle, mut transport, _frames) = start_session(loader).await;

    handle.set_key("w", true);
    tokio::time::sleep(Duration::from_secs(1)).await;

    handle.shutdown();
    let session = task.await.unwrap();

    // Default walk speed 2.0 for about a second of held key, along -Z
    let position = session.local().transform.position;
    assert!(position.z < -1.0, "avatar did not move: {position:?}");
    assert_eq!(session.local().animation.action, ActionName::Walk);

    let reports = drain(&mut transport);
    let last = reports.last().expect("at least one report");
    assert_eq!(last.action_name, ActionName::Walk);
    assert!(last.position[2] < -1.0);
}

#[tokio::test(start_paused = true)]
async fn disconnect_freezes_broadcast_and_keeps_remote_state() {
    let loader = MemoryAssetLoader::with_models(["bluebot", "redbot"]);
    let (task, handle, mut transport, _frames) = start_session(loader).await;

    transport.deliver(WorldEvent::JoinSnapshot(vec![PeerProfile {
        id: "a".into(),
        display_name: "Bob".to_string(),
        asset_name: "redbot".to_string(),
    }]));
    tokio::time::sleep(Duration::from_millis(100)).await;
    transport.deliver_wire(
        "peers-moved",
        r#"{"a":{"orientation":[0,0,0,1],"walkDirection":[0,0,-1],"actionName":"walk","position":[1,2,3]}}"#,
    );
    tokio::time::sleep(Duration::from_millis(100)).await;

    transport.connection_changed(ConnectionStatus::Disconnected);
    tokio::time::sleep(Duration::from_millis(50)).await;
    drain(&mut transport);

    // Offline: no outbound reports at all
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(transport.try_next_report().is_none());

    // Reconnect: broadcasting resumes
    transport.connection_changed(ConnectionStatus::Connected);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(transport.try_next_report().is_some());

    handle.shutdown();
    let session = task.await.unwrap();

    // The remote avatar was frozen, not discarded
    let avatar = session.registry().get(&"a".into()).expect("peer retained");
    assert_eq!(avatar.transform.position, glam::Vec3::new(1.0, 2.0, 3.0));
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_frame_loop() {
    let loader = MemoryAssetLoader::with_models(["bluebot"]);
    let (task, handle, _transport, frames) = start_session(loader).await;

    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.shutdown();
    let session = task.await.unwrap();

    let stopped_at = frames.load(Ordering::SeqCst);
    assert_eq!(stopped_at, session.frames());

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(frames.load(Ordering::SeqCst), stopped_at);
}
