use std::path::{Path, PathBuf};

use log::{debug, error, info};

use crate::config::game_executable;
use crate::env::GAME_FOLDER;

pub const STEAM_APP_ID: &str = "251570";

/// Answers whether the game is installed through, and owned on, Steam.
#[derive(Clone, Debug)]
pub struct SteamLibrary {
    steam_path: PathBuf,
}

impl SteamLibrary {
    pub fn new(steam_path: impl Into<PathBuf>) -> Self {
        Self {
            steam_path: steam_path.into(),
        }
    }

    pub fn verify_ownership(&self) -> bool {
        let steam_path = self.resolve_steam_path();
        debug!("steam: using library at {}", steam_path.display());

        let game_exe = game_executable(&steam_path.join("steamapps").join("common").join(GAME_FOLDER));
        if game_exe.is_file() {
            info!("steam: game executable found at {}", game_exe.display());
            return true;
        }

        let app_manifest = app_manifest_path(&steam_path);
        if app_manifest.is_file() {
            info!("steam: app manifest found at {}", app_manifest.display());
            return true;
        }

        if registry::game_installed() {
            info!("steam: registry reports app {} installed", STEAM_APP_ID);
            return true;
        }

        error!("steam: game not found in Steam registry or filesystem");
        false
    }

    fn resolve_steam_path(&self) -> PathBuf {
        if self.steam_path.is_dir() {
            return self.steam_path.clone();
        }
        registry::steam_install_path().unwrap_or_else(|| self.steam_path.clone())
    }
}

fn app_manifest_path(steam_path: &Path) -> PathBuf {
    steam_path
        .join("steamapps")
        .join(format!("appmanifest_{STEAM_APP_ID}.acf"))
}

#[cfg(windows)]
mod registry {
    use std::path::PathBuf;

    use log::debug;
    use winreg::RegKey;
    use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};

    use super::STEAM_APP_ID;

    const STEAM_KEYS: [&str; 2] = [
        r"SOFTWARE\WOW6432Node\Valve\Steam",
        r"SOFTWARE\Valve\Steam",
    ];

    pub fn steam_install_path() -> Option<PathBuf> {
        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
        STEAM_KEYS.iter().find_map(|path| {
            let key = hklm.open_subkey(path).ok()?;
            let install: String = key.get_value("InstallPath").ok()?;
            Some(PathBuf::from(install))
        })
    }

    pub fn game_installed() -> bool {
        let app_keys = [
            (HKEY_LOCAL_MACHINE, format!(r"SOFTWARE\WOW6432Node\Valve\Steam\Apps\{STEAM_APP_ID}")),
            (HKEY_LOCAL_MACHINE, format!(r"SOFTWARE\Valve\Steam\Apps\{STEAM_APP_ID}")),
            (HKEY_CURRENT_USER, format!(r"SOFTWARE\Valve\Steam\Apps\{STEAM_APP_ID}")),
        ];
        app_keys.iter().any(|(root, path)| {
            let Ok(key) = RegKey::predef(*root).open_subkey(path) else {
                debug!("steam: registry key {} not present", path);
                return false;
            };
            key.get_value::<u32, _>("Installed").is_ok_and(|flag| flag != 0)
        })
    }
}

#[cfg(not(windows))]
mod registry {
    use std::path::PathBuf;

    pub fn steam_install_path() -> Option<PathBuf> {
        None
    }

    pub fn game_installed() -> bool {
        false
    }
}
