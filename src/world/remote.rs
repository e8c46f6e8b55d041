//! Remote player avatars, driven entirely by network-reported state.

use crate::assets::AvatarAsset;
use crate::world::avatar::{ActionName, AnimationState, Transform};
use glam::{Quat, Vec3};
use tracing::trace;

/// Lifecycle of a replicated avatar: Loading -> Active -> Disposed.
///
/// Loading entries are skipped by the frame loop; Disposed is terminal and
/// never stored in the registry (removal is synchronous with disposal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteLifecycle {
    Loading,
    Active,
    Disposed,
}

/// Clip blend advance rate, in blend units per second.
const BLEND_RATE: f32 = 4.0;

/// Another connected user's avatar. Its transform is mutated only through
/// `set_state`; per-frame `update` advances clip playback alone.
pub struct RemoteAvatar {
    pub display_name: String,
    pub transform: Transform,
    pub animation: AnimationState,
    lifecycle: RemoteLifecycle,
    asset: Option<AvatarAsset>,
    /// Blend progress toward the current clip, 0..=1. Purely local playback
    /// state, never replicated.
    blend: f32,
}

impl RemoteAvatar {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            transform: Transform::default(),
            animation: AnimationState::default(),
            lifecycle: RemoteLifecycle::Loading,
            asset: None,
            blend: 1.0,
        }
    }

    pub fn lifecycle(&self) -> RemoteLifecycle {
        self.lifecycle
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == RemoteLifecycle::Active
    }

    pub fn asset(&self) -> Option<&AvatarAsset> {
        self.asset.as_ref()
    }

    /// Attach the resolved asset and make the avatar visible to the frame
    /// loop.
    pub(crate) fn activate(&mut self, asset: AvatarAsset) {
        debug_assert_eq!(
            self.lifecycle,
            RemoteLifecycle::Loading,
            "activate on a non-loading avatar"
        );
        if self.lifecycle != RemoteLifecycle::Loading {
            return;
        }
        self.asset = Some(asset);
        self.lifecycle = RemoteLifecycle::Active;
    }

    /// Sole mutator for replicated state, applied verbatim: each inbound
    /// update fully replaces the transform and animation selection
    /// (last-write-wins, no interpolation).
    pub fn set_state(
        &mut self,
        orientation: Quat,
        walk_direction: Vec3,
        action: ActionName,
        position: Vec3,
    ) {
        debug_assert!(
            self.lifecycle != RemoteLifecycle::Disposed,
            "set_state on a disposed avatar"
        );
        if self.lifecycle == RemoteLifecycle::Disposed {
            return;
        }
        self.transform.position = position;
        self.transform.set_rotation(orientation);
        if action != self.animation.action {
            self.blend = 0.0;
        }
        self.animation = AnimationState {
            action,
            walk_direction,
        };
    }

    /// Advance local clip playback only. Replicated transform fields are
    /// owned by `set_state` and never touched here.
    pub fn update(&mut self, dt: f32) {
        debug_assert!(
            self.lifecycle != RemoteLifecycle::Disposed,
            "update on a disposed avatar"
        );
        if self.lifecycle != RemoteLifecycle::Active {
            return;
        }
        self.blend = (self.blend + dt * BLEND_RATE).min(1.0);
    }

    /// Release the visual asset and enter the terminal state.
    pub fn dispose(&mut self) {
        if self.lifecycle == RemoteLifecycle::Disposed {
            return;
        }
        trace!(name = %self.display_name, "disposing remote avatar");
        self.asset = None;
        self.lifecycle = RemoteLifecycle::Disposed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_avatar() -> RemoteAvatar {
        let mut avatar = RemoteAvatar::new("Bob");
        avatar.activate(AvatarAsset::with_default_clips("redbot"));
        avatar
    }

    #[test]
    fn starts_loading_and_activates() {
        let mut avatar = RemoteAvatar::new("Bob");
        assert_eq!(avatar.lifecycle(), RemoteLifecycle::Loading);
        assert!(avatar.asset().is_none());

        avatar.activate(AvatarAsset::with_default_clips("redbot"));
        assert_eq!(avatar.lifecycle(), RemoteLifecycle::Active);
        assert!(avatar.asset().is_some());
    }

    #[test]
    fn set_state_replaces_pose_verbatim() {
        let mut avatar = active_avatar();
        avatar.set_state(
            Quat::IDENTITY,
            Vec3::NEG_Z,
            ActionName::Walk,
            Vec3::new(1.0, 2.0, 3.0),
        );

        assert_eq!(avatar.transform.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(avatar.animation.action, ActionName::Walk);
        assert_eq!(avatar.animation.walk_direction, Vec3::NEG_Z);
    }

    #[test]
    fn set_state_is_idempotent() {
        let mut avatar = active_avatar();
        let q = Quat::from_rotation_y(1.0);
        let pos = Vec3::new(4.0, 0.0, -2.0);

        avatar.set_state(q, Vec3::X, ActionName::Run, pos);
        let once = avatar.transform;
        avatar.set_state(q, Vec3::X, ActionName::Run, pos);

        assert_eq!(avatar.transform, once);
    }

    #[test]
    fn set_state_normalizes_orientation() {
        let mut avatar = active_avatar();
        avatar.set_state(
            Quat::from_xyzw(0.0, 0.0, 0.0, 2.0),
            Vec3::ZERO,
            ActionName::Idle,
            Vec3::ZERO,
        );
        assert!((avatar.transform.rotation.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn update_never_touches_transform() {
        let mut avatar = active_avatar();
        avatar.set_state(Quat::IDENTITY, Vec3::X, ActionName::Walk, Vec3::new(5.0, 0.0, 0.0));
        let before = avatar.transform;

        avatar.update(0.5);
        avatar.update(0.5);

        assert_eq!(avatar.transform, before);
    }

    #[test]
    fn update_skips_loading_entries() {
        let mut avatar = RemoteAvatar::new("Bob");
        avatar.update(0.5);
        assert_eq!(avatar.lifecycle(), RemoteLifecycle::Loading);
    }

    #[test]
    fn dispose_releases_asset_and_is_terminal() {
        let mut avatar = active_avatar();
        avatar.dispose();
        assert_eq!(avatar.lifecycle(), RemoteLifecycle::Disposed);
        assert!(avatar.asset().is_none());

        // Second dispose stays a no-op
        avatar.dispose();
        assert_eq!(avatar.lifecycle(), RemoteLifecycle::Disposed);
    }

    #[test]
    #[should_panic(expected = "set_state on a disposed avatar")]
    fn set_state_after_dispose_fails_loudly_in_debug() {
        let mut avatar = active_avatar();
        avatar.dispose();
        avatar.set_state(Quat::IDENTITY, Vec3::ZERO, ActionName::Idle, Vec3::ZERO);
    }
}
