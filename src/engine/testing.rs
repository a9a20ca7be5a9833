//! Fakes for the network, extraction and manifest seams used by engine tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use crate::archive::Extractor;
use crate::config::{LauncherConfig, game_executable};
use crate::engine::models::ReleaseInfo;
use crate::error::{LauncherError, Result};
use crate::networking::AssetFetcher;
use crate::steam::STEAM_APP_ID;
use crate::storage::ConfigStore;
use crate::updater::{ReleaseManifest, ReleaseSource};

pub const HOSTING_URL: &str = "https://mods.example/releases/download";

/// Writes the requested URL as the chunk body.
#[derive(Clone, Default)]
pub struct FakeFetcher {
    fail_on: Option<String>,
    write_nothing: bool,
    requested: Arc<Mutex<Vec<String>>>,
}

impl FakeFetcher {
    pub fn failing_on(chunk: &str) -> Self {
        Self {
            fail_on: Some(chunk.to_owned()),
            ..Self::default()
        }
    }

    pub fn writing_nothing() -> Self {
        Self {
            write_nothing: true,
            ..Self::default()
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl AssetFetcher for FakeFetcher {
    async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        on_progress: &mut (dyn FnMut(f32) + Send),
    ) -> Result<u64> {
        self.requested.lock().unwrap().push(url.to_owned());
        if self.write_nothing {
            return Ok(0);
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        if self.fail_on.as_deref().is_some_and(|chunk| url.ends_with(chunk)) {
            fs::write(dest, b"partial").unwrap();
            return Err(LauncherError::download("Failed to download file")
                .with_detail(format!("URL: {url}, Error: connection reset")));
        }
        fs::write(dest, url.as_bytes()).unwrap();
        on_progress(0.5);
        on_progress(1.0);
        Ok(url.len() as u64)
    }
}

/// Drops a `Rebirth_Core` mod into the output directory.
#[derive(Clone, Default)]
pub struct FakeExtractor {
    fail: bool,
    calls: Arc<Mutex<Vec<(PathBuf, PathBuf)>>>,
}

impl FakeExtractor {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Extractor for FakeExtractor {
    fn extract(&self, first_part: &Path, output_dir: &Path, _password: Option<&str>) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((first_part.to_path_buf(), output_dir.to_path_buf()));
        if self.fail {
            return Err(LauncherError::extraction("Failed to extract mod archive")
                .with_detail("Data error in encrypted file"));
        }
        let target = output_dir.join("Rebirth_Core");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("ModInfo.xml"), "rebirth").unwrap();
        Ok(())
    }
}

pub struct StaticSource {
    manifest: std::result::Result<ReleaseManifest, String>,
    calls: Arc<AtomicUsize>,
}

impl StaticSource {
    pub fn new(json: &str) -> Self {
        Self {
            manifest: Ok(serde_json::from_str(json).unwrap()),
            calls: Arc::default(),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            manifest: Err("connection refused".into()),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl ReleaseSource for StaticSource {
    async fn latest_manifest(&self) -> std::result::Result<ReleaseManifest, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.manifest.clone()
    }
}

/// A Steam library with the game installed, an existing mods folder and a saved config.
pub struct Fixture {
    dir: TempDir,
    pub config: LauncherConfig,
    pub store: ConfigStore,
}

impl Fixture {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let steam = dir.path().join("Steam");
        fs::create_dir_all(steam.join("steamapps")).unwrap();
        fs::write(
            steam
                .join("steamapps")
                .join(format!("appmanifest_{STEAM_APP_ID}.acf")),
            "\"AppState\" {}",
        )
        .unwrap();

        let game = dir.path().join("Games").join("7 Days To Die");
        fs::create_dir_all(&game).unwrap();
        fs::write(game_executable(&game), b"").unwrap();

        let mods = game.join("Mods");
        fs::create_dir_all(mods.join("0_TFP_Harmony")).unwrap();
        fs::write(mods.join("0_TFP_Harmony").join("ModInfo.xml"), "harmony").unwrap();
        fs::create_dir_all(mods.join("Rebirth_Old").join("Config")).unwrap();
        fs::write(
            mods.join("Rebirth_Old").join("Config").join("blocks.xml"),
            "<configs/>",
        )
        .unwrap();

        let secondary = dir.path().join("AppData").join("Mods");
        fs::create_dir_all(secondary.join("UserTweaks")).unwrap();

        let config = LauncherConfig {
            steam_path: steam,
            mods_path: mods,
            secondary_mods_path: Some(secondary),
            temp_path: Some(game.join("Temp")),
            game_path: game,
            version: "1.0.0".into(),
            auto_update: false,
            mod_hosting_url: HOSTING_URL.into(),
            manifest_url: "https://mods.example/manifest.json".into(),
            ..LauncherConfig::default()
        };
        let store = ConfigStore::new(dir.path().join("launcher_config.json"));
        store.save(&config).await.unwrap();

        Self { dir, config, store }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.config.temp_dir()
    }

    pub fn secondary_mods(&self) -> PathBuf {
        self.root().join("AppData").join("Mods")
    }
}

pub fn listing(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn release(chunks: &[&str]) -> ReleaseInfo {
    ReleaseInfo {
        version: "2.0.0".into(),
        chunks: chunks.iter().map(|c| (*c).to_owned()).collect(),
        checksum: "abc123".into(),
        changelog: Some("Rebirth 2.0".into()),
    }
}
