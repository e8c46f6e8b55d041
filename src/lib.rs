// worldlink: real-time world synchronization engine for a multiplayer 3D client

pub mod assets;
pub mod config;
pub mod networking;
pub mod session;
pub mod utils;
pub mod world;

// Re-export commonly used types for convenience
pub use world::{WorldError, WorldResult};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
