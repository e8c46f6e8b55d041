//! Local player avatar: transform, animation selection, and per-frame
//! movement integration from keyboard state.

use crate::assets::{AssetLoader, AvatarAsset};
use crate::utils::math;
use crate::world::events::StateReport;
use crate::world::input::InputTracker;
use crate::world::{WorldError, WorldResult};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Position and orientation of an avatar in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    /// Replace the orientation, keeping the unit-quaternion invariant.
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = math::normalize_or_identity(rotation);
    }
}

/// Animation clip selector. The set is closed: unknown names are rejected
/// at the decoding boundary, never applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionName {
    Idle,
    Walk,
    Run,
}

impl ActionName {
    pub const ALL: [ActionName; 3] = [ActionName::Idle, ActionName::Walk, ActionName::Run];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionName::Idle => "idle",
            ActionName::Walk => "walk",
            ActionName::Run => "run",
        }
    }
}

impl FromStr for ActionName {
    type Err = WorldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(ActionName::Idle),
            "walk" => Ok(ActionName::Walk),
            "run" => Ok(ActionName::Run),
            other => Err(WorldError::UnknownAction {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Active clip plus the direction used to select and blend it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    pub action: ActionName,
    pub walk_direction: Vec3,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            action: ActionName::Idle,
            walk_direction: Vec3::ZERO,
        }
    }
}

/// View basis the local avatar moves relative to. Orbit control itself is
/// the window layer's business; only the yaw matters for movement.
#[derive(Debug, Clone, Copy, Default)]
pub struct CameraRig {
    /// Horizontal view angle in radians. Zero looks down negative Z.
    pub yaw: f32,
}

impl CameraRig {
    pub fn forward(&self) -> Vec3 {
        math::yaw_forward(self.yaw)
    }

    pub fn right(&self) -> Vec3 {
        math::yaw_right(self.yaw)
    }
}

/// Movement speeds, sourced from session settings.
#[derive(Debug, Clone, Copy)]
pub struct MovementTuning {
    pub walk_speed: f32,
    pub run_speed: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            walk_speed: 2.0,
            run_speed: 5.0,
        }
    }
}

/// The local player's avatar. Mutated once per frame by `update`; its pose
/// is broadcast every tick via `state_report`.
pub struct LocalAvatar {
    pub display_name: String,
    pub transform: Transform,
    pub animation: AnimationState,
    asset: AvatarAsset,
    tuning: MovementTuning,
}

impl LocalAvatar {
    /// Resolve the avatar's visual asset and construct the avatar.
    ///
    /// Awaited exactly once at session start; the frame loop is only built
    /// after this resolves, so `update` can never run against an unloaded
    /// player. A failure here is fatal to the session.
    pub async fn load(
        loader: &dyn AssetLoader,
        asset_name: &str,
        display_name: &str,
        tuning: MovementTuning,
    ) -> WorldResult<Self> {
        let asset = loader.load_avatar(asset_name).await?;
        debug!(%display_name, %asset_name, "local avatar asset resolved");
        Ok(Self::from_parts(asset, display_name, tuning))
    }

    pub(crate) fn from_parts(
        asset: AvatarAsset,
        display_name: impl Into<String>,
        tuning: MovementTuning,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            transform: Transform::default(),
            animation: AnimationState::default(),
            asset,
            tuning,
        }
    }

    pub fn asset(&self) -> &AvatarAsset {
        &self.asset
    }

    /// Advance the avatar by one frame: derive a camera-relative movement
    /// direction from the pressed movement keys, integrate the position,
    /// and pick the matching clip.
    pub fn update(&mut self, dt: f32, input: &InputTracker, camera: &CameraRig) {
        let mut fwd = 0.0;
        let mut strafe = 0.0;
        if input.is_pressed("w") {
            fwd += 1.0;
        }
        if input.is_pressed("s") {
            fwd -= 1.0;
        }
        if input.is_pressed("d") {
            strafe += 1.0;
        }
        if input.is_pressed("a") {
            strafe -= 1.0;
        }

        let raw = camera.forward() * fwd + camera.right() * strafe;
        if raw.length_squared() < f32::EPSILON {
            self.animation = AnimationState::default();
            return;
        }

        let dir = raw.normalize();
        let running = input.is_pressed("shift");
        let speed = if running {
            self.tuning.run_speed
        } else {
            self.tuning.walk_speed
        };

        self.transform.position += dir * speed * dt;
        // Face the direction of travel
        self.transform
            .set_rotation(Quat::from_rotation_y(dir.x.atan2(dir.z)));
        self.animation = AnimationState {
            action: if running {
                ActionName::Run
            } else {
                ActionName::Walk
            },
            walk_direction: dir,
        };
    }

    /// Snapshot for the per-tick outbound broadcast.
    pub fn state_report(&self) -> StateReport {
        StateReport {
            orientation: self.transform.rotation.to_array(),
            walk_direction: self.animation.walk_direction.to_array(),
            action_name: self.animation.action,
            position: self.transform.position.to_array(),
        }
    }
}
