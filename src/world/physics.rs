//! Physics placeholder. Avatars are integrated kinematically by their own
//! update paths; nothing here affects replicated state yet.
// TODO: integrate rapier3d once the server replicates collision volumes

#[derive(Debug, Default)]
pub struct PhysicsWorld;

impl PhysicsWorld {
    pub fn new() -> Self {
        Self
    }

    /// Stepped once per frame by the session, after avatar updates.
    pub fn step(&mut self, _dt: f32) {}
}
