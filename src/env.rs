use std::env;
use std::fs;
use std::path::PathBuf;

pub const CONFIG_FILENAME: &str = "launcher_config.json";
pub const LOG_FILENAME: &str = "rebirth_launcher.log";
pub const GAME_FOLDER: &str = "7 Days To Die";

/// Returns the root directory used by the launcher for config and logs.
pub fn default_app_dir() -> PathBuf {
    let base = match env::consts::OS {
        "windows" => env::var_os("LOCALAPPDATA")
            .or_else(|| env::var_os("APPDATA"))
            .map(PathBuf::from),
        "macos" => env::var_os("HOME")
            .map(PathBuf::from)
            .map(|home| home.join("Library").join("Application Support")),
        _ => env::var_os("HOME")
            .map(PathBuf::from)
            .map(|home| home.join(".local").join("share")),
    }
    .unwrap_or_else(|| PathBuf::from("."));

    base.join("rebirth-launcher")
}

pub fn config_path() -> PathBuf {
    default_app_dir().join(CONFIG_FILENAME)
}

pub fn logs_dir() -> PathBuf {
    default_app_dir().join("logs")
}

pub fn log_path() -> PathBuf {
    logs_dir().join(LOG_FILENAME)
}

pub fn default_steam_dir() -> PathBuf {
    match env::consts::OS {
        "windows" => PathBuf::from(r"C:\Program Files (x86)\Steam"),
        "macos" => env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Library")
            .join("Application Support")
            .join("Steam"),
        _ => env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".local")
            .join("share")
            .join("Steam"),
    }
}

pub fn default_game_dir() -> PathBuf {
    default_steam_dir()
        .join("steamapps")
        .join("common")
        .join(GAME_FOLDER)
}

/// Per-user mod folder the game also scans, when the platform has one.
pub fn default_user_mods_dir() -> Option<PathBuf> {
    env::var_os("APPDATA")
        .map(PathBuf::from)
        .map(|appdata| appdata.join("7DaysToDie").join("Mods"))
}

/// Create the on-disk folder layout expected by the launcher.
pub fn ensure_base_dirs() -> std::io::Result<()> {
    for dir in [default_app_dir(), logs_dir()] {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}
