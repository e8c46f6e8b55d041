//! Session settings: player identity, movement tuning, frame pacing.
//!
//! Stored as TOML; a missing file yields defaults so a fresh checkout can
//! enter the world without any setup.

use crate::world::{WorldError, WorldResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub identity: IdentitySettings,
    pub movement: MovementSettings,
    pub frame: FrameSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySettings {
    /// Name shown above the avatar.
    pub display_name: String,
    /// Catalog name of the avatar model.
    pub asset_name: String,
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            display_name: "mike".to_string(),
            asset_name: "bluebot".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementSettings {
    /// Meters per second while walking.
    pub walk_speed: f32,
    /// Meters per second while running (shift held).
    pub run_speed: f32,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            walk_speed: 2.0,
            run_speed: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSettings {
    /// Frame loop rate. The outbound broadcast runs at this same rate.
    pub tick_hz: u32,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self { tick_hz: 60 }
    }
}

/// Load settings from a TOML file; a missing file yields defaults.
pub fn load_settings(path: impl AsRef<Path>) -> WorldResult<SessionSettings> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(SessionSettings::default());
    }
    let raw = std::fs::read_to_string(path)?;
    toml::from_str(&raw).map_err(|e| WorldError::Config {
        reason: e.to_string(),
    })
}

/// Persist settings as pretty TOML.
pub fn save_settings(path: impl AsRef<Path>, settings: &SessionSettings) -> WorldResult<()> {
    let raw = toml::to_string_pretty(settings).map_err(|e| WorldError::Config {
        reason: e.to_string(),
    })?;
    std::fs::write(path, raw)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let settings = load_settings("/nonexistent/worldlink.toml").unwrap();
        assert_eq!(settings, SessionSettings::default());
        assert_eq!(settings.identity.display_name, "mike");
        assert_eq!(settings.identity.asset_name, "bluebot");
        assert_eq!(settings.frame.tick_hz, 60);
    }

    #[test]
    fn settings_roundtrip_through_toml() {
        let mut settings = SessionSettings::default();
        settings.identity.display_name = "ada".to_string();
        settings.movement.run_speed = 7.5;

        let path = std::env::temp_dir().join(format!(
            "worldlink-settings-{}.toml",
            uuid::Uuid::new_v4()
        ));
        save_settings(&path, &settings).unwrap();
        let loaded = load_settings(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, settings);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let partial: SessionSettings =
            toml::from_str("[identity]\ndisplay_name = \"ada\"\n").unwrap();
        assert_eq!(partial.identity.display_name, "ada");
        assert_eq!(partial.identity.asset_name, "bluebot");
        assert_eq!(partial.movement.walk_speed, 2.0);
    }
}
