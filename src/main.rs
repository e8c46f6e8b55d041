use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use worldlink::assets::MemoryAssetLoader;
use worldlink::config::load_settings;
use worldlink::networking::bridge_channel;
use worldlink::session::{CameraHandle, Renderer, SceneHandle, WorldSession};
use worldlink::utils::logging::init_logging;
use worldlink::world::events::{PeerProfile, WorldEvent};

/// Headless renderer for the demo; the real GPU pipeline lives outside
/// this crate.
struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _scene: &SceneHandle, _camera: &CameraHandle) {}
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let settings = load_settings("worldlink.toml")?;
    info!(
        player = %settings.identity.display_name,
        version = worldlink::VERSION,
        "starting demo session"
    );

    let loader = Arc::new(
        MemoryAssetLoader::with_models(["bluebot", "redbot"])
            .with_latency(Duration::from_millis(50)),
    );
    let (bridge, mut transport) = bridge_channel();

    let (session, handle) = WorldSession::start(
        settings,
        loader,
        NullRenderer,
        bridge,
        SceneHandle::new(),
        CameraHandle::new(),
    )
    .await?;
    let session_task = tokio::spawn(session.run());

    // Loopback transport: one peer is already in the world, wanders a bit,
    // then leaves.
    transport.deliver(WorldEvent::JoinSnapshot(vec![PeerProfile {
        id: "peer-1".into(),
        display_name: "Bob".to_string(),
        asset_name: "redbot".to_string(),
    }]));
    transport.deliver_wire(
        "peers-moved",
        r#"{"peer-1":{"orientation":[0,0,0,1],"walkDirection":[0,0,-1],"actionName":"walk","position":[1,0,3]}}"#,
    );

    handle.set_camera_yaw(std::f32::consts::FRAC_PI_4);
    handle.set_key("w", true);
    tokio::time::sleep(Duration::from_millis(500)).await;
    handle.set_key("w", false);

    let mut reports = 0usize;
    while transport.try_next_report().is_some() {
        reports += 1;
    }
    info!(reports, "outbound state reports observed");

    transport.deliver_wire("peer-left", r#"{"id":"peer-1"}"#);
    tokio::time::sleep(Duration::from_millis(50)).await;

    handle.shutdown();
    let session = session_task.await?;
    info!(
        frames = session.frames(),
        peers = session.registry().len(),
        position = ?session.local().transform.position,
        "demo session finished"
    );
    Ok(())
}
