//! Preview configuration: user settings and tuning constants loaded from
//! ~/.mapview/config.yaml.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::ColorPalette;

/// Errors raised while loading or saving configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed.
    Io(io::Error),
    /// The file is not a valid config document.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config io error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

/// User-facing toggles, looked up by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub simple_notes: bool,
    pub simple_bombs: bool,
    pub move_animations: bool,
    pub rotate_animations: bool,
    pub flip_animations: bool,
    pub chroma_object_colors: bool,
    pub light_glow_brightness: f32,
}

impl Settings {
    /// Look up a boolean setting by its key. Unknown keys read as `false`.
    pub fn get_bool(&self, name: &str) -> bool {
        match name {
            "simplenotes" => self.simple_notes,
            "simplebombs" => self.simple_bombs,
            "moveanimations" => self.move_animations,
            "rotateanimations" => self.rotate_animations,
            "flipanimations" => self.flip_animations,
            "chromaobjectcolors" => self.chroma_object_colors,
            _ => false,
        }
    }

    /// Look up a float setting by its key. Unknown keys read as `0.0`.
    pub fn get_float(&self, name: &str) -> f32 {
        match name {
            "lightglowbrightness" => self.light_glow_brightness,
            _ => 0.0,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            simple_notes: false,
            simple_bombs: false,
            move_animations: true,
            rotate_animations: true,
            flip_animations: true,
            chroma_object_colors: true,
            light_glow_brightness: 1.0,
        }
    }
}

/// Notification that one setting (or every setting) changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsChange {
    All,
    Key(String),
}

impl SettingsChange {
    pub fn key(name: &str) -> Self {
        if name == "all" {
            SettingsChange::All
        } else {
            SettingsChange::Key(name.to_string())
        }
    }

    /// Whether a consumer watching `keys` has to re-derive its outputs.
    pub fn affects(&self, keys: &[&str]) -> bool {
        match self {
            SettingsChange::All => true,
            SettingsChange::Key(k) => keys.contains(&k.as_str()),
        }
    }
}

/// How map objects travel towards the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectAnimation {
    /// Distance covered while flying in before the jump.
    pub move_z: f32,
    /// Seconds spent flying in before the jump.
    pub move_time: f32,
    /// Seconds a note takes to turn to its cut direction after the jump.
    pub rotation_animation_time: f32,
    /// How far behind the camera objects keep rendering.
    pub behind_camera_z: f32,
    pub object_floor_offset: f32,
    pub player_height_offset: f32,
}

impl Default for ObjectAnimation {
    fn default() -> Self {
        Self {
            move_z: 100.0,
            move_time: 0.25,
            rotation_animation_time: 0.2,
            behind_camera_z: -3.0,
            object_floor_offset: 0.0,
            player_height_offset: 0.0,
        }
    }
}

/// Saturation and emission tuning for light materials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightTuning {
    pub light_saturation: f32,
    pub light_emission_saturation: f32,
    pub light_emission: f32,
}

impl Default for LightTuning {
    fn default() -> Self {
        Self {
            light_saturation: 0.6,
            light_emission_saturation: 0.8,
            light_emission: 1.5,
        }
    }
}

/// The whole preview configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub settings: Settings,
    pub objects: ObjectAnimation,
    pub lights: LightTuning,
    pub palette: ColorPalette,
}

impl PreviewConfig {
    /// Default path for the config file.
    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".mapview");
        path.push("config.yaml");
        path
    }

    /// Load a config from YAML. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save as YAML, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}
