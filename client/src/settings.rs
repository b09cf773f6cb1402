use bevy::prelude::*;

/// Asset path of the equirectangular HDR environment map, relative to `assets/`.
pub const DEFAULT_ENV_MAP: &str = "bg.hdr";

pub const ENV_MAP_VAR: &str = "SCENE_ENV_MAP";
pub const TICK_MODE_VAR: &str = "SCENE_TICK_MODE";
pub const HELPERS_VAR: &str = "SCENE_HELPERS";

/// How the per-frame tick drives the physics world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TickMode {
    /// Exactly one fixed step per rendered frame.
    #[default]
    SingleStep,
    /// Feed frame time into the world's accumulator; 0..=max_substeps steps per frame.
    Accumulated,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{var}={value:?} is not a valid value (expected {expected})")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Resource, Clone, Debug, PartialEq)]
pub struct SceneSettings {
    pub env_map: String,
    pub tick_mode: TickMode,
    /// Draw the grid and axes helpers.
    pub helpers: bool,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            env_map: DEFAULT_ENV_MAP.to_owned(),
            tick_mode: TickMode::default(),
            helpers: true,
        }
    }
}

impl SceneSettings {
    /// Read overrides from the process environment, falling back to defaults on bad input.
    pub fn from_env() -> Self {
        match Self::from_vars(|key| std::env::var(key).ok()) {
            Ok(settings) => settings,
            Err(err) => {
                warn!("{err}; using default scene settings");
                Self::default()
            }
        }
    }

    /// Build settings from a variable lookup. Unset variables keep their defaults.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let mut settings = Self::default();

        if let Some(path) = lookup(ENV_MAP_VAR).filter(|p| !p.trim().is_empty()) {
            settings.env_map = path.trim().to_owned();
        }

        if let Some(value) = lookup(TICK_MODE_VAR) {
            settings.tick_mode = match value.trim().to_ascii_lowercase().as_str() {
                "single" => TickMode::SingleStep,
                "accumulated" => TickMode::Accumulated,
                _ => {
                    return Err(SettingsError::InvalidValue {
                        var: TICK_MODE_VAR,
                        value,
                        expected: "`single` or `accumulated`",
                    });
                }
            };
        }

        if let Some(value) = lookup(HELPERS_VAR) {
            settings.helpers = match value.trim() {
                "1" | "true" | "on" => true,
                "0" | "false" | "off" => false,
                _ => {
                    return Err(SettingsError::InvalidValue {
                        var: HELPERS_VAR,
                        value,
                        expected: "0 or 1",
                    });
                }
            };
        }

        Ok(settings)
    }
}
