use std::path::{Path, PathBuf};

use mosaic_core::command::DEFAULT_CAPACITY;
use serde::Deserialize;
use thiserror::Error;

/// Editor settings loaded from `settings.toml`.
///
/// Every field is optional in the file; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Maximum number of undo steps kept per document.
    pub command_capacity: usize,
    pub default_tile_width: u32,
    pub default_tile_height: u32,
    pub default_rows: usize,
    pub default_columns: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            command_capacity: DEFAULT_CAPACITY,
            default_tile_width: 32,
            default_tile_height: 32,
            default_rows: 5,
            default_columns: 5,
        }
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }
}

/// Load settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Settings::from_toml_str(&content)
}

/// Load settings, falling back to the defaults if the file is missing or
/// malformed.
pub fn load_or_default(path: &Path) -> Settings {
    match load_settings(path) {
        Ok(settings) => {
            log::info!(
                "Loaded settings from {} (undo capacity {})",
                path.display(),
                settings.command_capacity
            );
            settings
        }
        Err(e) => {
            log::warn!("No settings file ({e}), using defaults");
            Settings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings = Settings::from_toml_str("command_capacity = 25\n").unwrap();
        assert_eq!(settings.command_capacity, 25);
        assert_eq!(settings.default_tile_width, 32);
        assert_eq!(settings.default_rows, 5);

        assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(matches!(
            Settings::from_toml_str("command_capacity = \"lots\""),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_falls_back() {
        let path = Path::new("definitely/not/here/settings.toml");
        assert!(matches!(load_settings(path), Err(SettingsError::Io { .. })));
        assert_eq!(load_or_default(path), Settings::default());
    }
}
