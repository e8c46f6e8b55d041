//! Small math helpers shared by avatar movement and pose ingest.

use glam::{Quat, Vec3};

/// Horizontal forward vector for a camera yaw in radians. Yaw zero looks
/// down negative Z.
pub fn yaw_forward(yaw: f32) -> Vec3 {
    Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
}

/// Horizontal right vector for a camera yaw.
pub fn yaw_right(yaw: f32) -> Vec3 {
    Vec3::new(yaw.cos(), 0.0, -yaw.sin())
}

/// Normalize a quaternion, falling back to identity for degenerate input
/// rather than propagating NaNs.
pub fn normalize_or_identity(q: Quat) -> Quat {
    if q.length_squared() > f32::EPSILON {
        q.normalize()
    } else {
        Quat::IDENTITY
    }
}
