use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::env;
use crate::error::{LauncherError, Result};

pub const MOD_HOSTING_BASE_URL: &str = "https://github.com/brbrainerd/rebirth-mods/releases/download";
pub const MANIFEST_URL: &str =
    "https://github.com/brbrainerd/rebirth-mods/releases/latest/download/manifest.json";
pub const DEFAULT_VERSION: &str = "0.0.0";

/// Mods shipped with the base game that every cleanup must leave alone.
pub const ALLOWED_MODS: &[&str] = &["0_TFP_Harmony"];

pub fn allowed_mods() -> HashSet<String> {
    ALLOWED_MODS.iter().map(|name| (*name).to_owned()).collect()
}

/// Path of the game executable inside a game directory.
pub fn game_executable(game_dir: &Path) -> PathBuf {
    if cfg!(target_os = "windows") {
        game_dir.join("7DaysToDie.exe")
    } else if cfg!(target_os = "linux") {
        game_dir.join("7DaysToDie.x86_64")
    } else {
        game_dir.join("7DaysToDie")
    }
}

pub fn is_valid_game_path(game_dir: &Path) -> bool {
    game_executable(game_dir).is_file()
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LauncherConfig {
    pub steam_path: PathBuf,
    pub game_path: PathBuf,
    pub mods_path: PathBuf,
    pub secondary_mods_path: Option<PathBuf>,
    pub temp_path: Option<PathBuf>,
    pub version: String,
    pub check_updates_on_launch: bool,
    pub auto_update: bool,
    pub disable_eac: bool,
    pub custom_game_path: Option<PathBuf>,
    pub mod_hosting_url: String,
    pub manifest_url: String,
    pub seven_zip_path: Option<PathBuf>,
    pub archive_password: Option<String>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        let game_path = env::default_game_dir();
        Self {
            steam_path: env::default_steam_dir(),
            mods_path: game_path.join("Mods"),
            game_path,
            secondary_mods_path: env::default_user_mods_dir(),
            temp_path: None,
            version: DEFAULT_VERSION.into(),
            check_updates_on_launch: true,
            auto_update: false,
            disable_eac: true,
            custom_game_path: None,
            mod_hosting_url: MOD_HOSTING_BASE_URL.into(),
            manifest_url: MANIFEST_URL.into(),
            seven_zip_path: None,
            archive_password: None,
        }
    }
}

impl LauncherConfig {
    /// Scratch directory for downloaded chunks.
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_path
            .clone()
            .unwrap_or_else(|| self.game_path.join("Temp"))
    }

    /// Every mods directory an update must clear before extracting.
    pub fn mod_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.mods_path.clone()];
        if let Some(secondary) = &self.secondary_mods_path
            && secondary != &self.mods_path
        {
            dirs.push(secondary.clone());
        }
        dirs
    }

    /// Point the launcher at a different game installation for this run.
    pub fn override_game_path(&mut self, game_path: PathBuf) {
        info!("config: game path overridden to {}", game_path.display());
        self.custom_game_path = Some(game_path);
    }

    /// Resolve the game directory and make sure the mods directory exists.
    pub fn validate_paths(&mut self) -> Result<()> {
        if let Some(custom) = self.custom_game_path.clone()
            && is_valid_game_path(&custom)
        {
            debug!("config: using custom game path {}", custom.display());
            self.mods_path = custom.join("Mods");
            self.game_path = custom;
        } else if !is_valid_game_path(&self.game_path) {
            return Err(LauncherError::game_path("Game not found at configured path")
                .with_detail(format!("Path: {}", self.game_path.display())));
        }

        fs::create_dir_all(&self.mods_path).map_err(|e| {
            LauncherError::config("Failed to validate paths")
                .with_detail(format!("{}: {e}", self.mods_path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_game(root: &Path) -> PathBuf {
        let game = root.join("7 Days To Die");
        fs::create_dir_all(&game).unwrap();
        fs::write(game_executable(&game), b"").unwrap();
        game
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: LauncherConfig =
            serde_json::from_str(r#"{"version": "1.0.0", "auto_update": true}"#).unwrap();
        assert_eq!(config.version, "1.0.0");
        assert!(config.auto_update);
        assert!(config.disable_eac);
        assert_eq!(config.mod_hosting_url, MOD_HOSTING_BASE_URL);
    }

    #[test]
    fn temp_dir_defaults_under_game_path() {
        let mut config = LauncherConfig {
            game_path: PathBuf::from("/games/7dtd"),
            ..LauncherConfig::default()
        };
        assert_eq!(config.temp_dir(), PathBuf::from("/games/7dtd").join("Temp"));
        config.temp_path = Some(PathBuf::from("/scratch"));
        assert_eq!(config.temp_dir(), PathBuf::from("/scratch"));
    }

    #[test]
    fn secondary_mods_dir_is_not_listed_twice() {
        let config = LauncherConfig {
            mods_path: PathBuf::from("/m"),
            secondary_mods_path: Some(PathBuf::from("/m")),
            ..LauncherConfig::default()
        };
        assert_eq!(config.mod_dirs(), vec![PathBuf::from("/m")]);
    }

    #[test]
    fn valid_custom_path_replaces_game_and_mods_paths() {
        let dir = tempfile::tempdir().unwrap();
        let game = fake_game(dir.path());
        let mut config = LauncherConfig {
            game_path: dir.path().join("missing"),
            ..LauncherConfig::default()
        };
        config.override_game_path(game.clone());

        config.validate_paths().unwrap();

        assert_eq!(config.game_path, game);
        assert_eq!(config.mods_path, game.join("Mods"));
        assert!(config.mods_path.is_dir());
    }

    #[test]
    fn invalid_game_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LauncherConfig {
            game_path: dir.path().join("missing"),
            custom_game_path: None,
            ..LauncherConfig::default()
        };
        let err = config.validate_paths().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::GamePath);
    }

    #[test]
    fn allow_list_contains_harmony() {
        assert!(allowed_mods().contains("0_TFP_Harmony"));
    }
}
