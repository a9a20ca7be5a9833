use std::path::PathBuf;

use log::{error, info, warn};

use crate::archive::{Extractor, SevenZip};
use crate::config::{LauncherConfig, allowed_mods};
use crate::engine::installer::Installer;
use crate::engine::models::{ModInfo, ReleaseInfo};
use crate::engine::state::ProgressCallback;
use crate::error::{LauncherError, Result};
use crate::networking::{AssetFetcher, NetworkClient};
use crate::process::ProcessLauncher;
use crate::steam::SteamLibrary;
use crate::storage::ConfigStore;
use crate::updater::{HttpReleaseSource, ReleaseResolver, ReleaseSource};

pub mod installer;
pub mod models;
pub mod state;

#[cfg(test)]
mod testing;

/// What happened to the mod pack before the game was started.
#[derive(Clone, Debug)]
pub enum LaunchOutcome {
    UpToDate,
    Skipped,
    Installed(String),
    /// A newer release exists but `auto_update` is off.
    UpdateAvailable(ReleaseInfo),
    /// The manifest could not be read; the game was launched anyway.
    CheckFailed(LauncherError),
}

pub struct LauncherEngine<S = HttpReleaseSource, F = NetworkClient, X = SevenZip> {
    config: LauncherConfig,
    store: ConfigStore,
    resolver: ReleaseResolver<S>,
    installer: Installer<F, X>,
    steam: SteamLibrary,
    process: ProcessLauncher,
}

impl LauncherEngine {
    /// Engine backed by HTTP and the system 7-Zip.
    pub fn from_config(config: LauncherConfig, store: ConfigStore) -> Self {
        let network = NetworkClient::new();
        let source = HttpReleaseSource::new(network.clone(), config.manifest_url.clone());
        let extractor = SevenZip::with_override(config.seven_zip_path.clone());
        let installer = Installer::new(network, extractor, allowed_mods());
        Self::new(config, store, ReleaseResolver::new(source), installer)
    }
}

impl<S: ReleaseSource, F: AssetFetcher, X: Extractor> LauncherEngine<S, F, X> {
    pub fn new(
        config: LauncherConfig,
        store: ConfigStore,
        resolver: ReleaseResolver<S>,
        installer: Installer<F, X>,
    ) -> Self {
        let steam = SteamLibrary::new(config.steam_path.clone());
        Self {
            config,
            store,
            resolver,
            installer,
            steam,
            process: ProcessLauncher::new(),
        }
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    /// Point this session at a non-default game install. Not persisted.
    pub fn override_game_path(&mut self, game_path: PathBuf) {
        self.config.override_game_path(game_path);
    }

    pub async fn check_for_update(&self) -> Result<Option<ReleaseInfo>> {
        self.resolver.check_for_update(&self.config.version).await
    }

    pub async fn install_update(
        &mut self,
        release: &ReleaseInfo,
        progress: ProgressCallback<'_>,
    ) -> Result<()> {
        self.installer
            .install(release, &mut self.config, &self.store, progress)
            .await
    }

    /// Check and, when the published version differs, install it.
    /// Returns the installed version, or `None` when already current.
    pub async fn update(&mut self, progress: ProgressCallback<'_>) -> Result<Option<String>> {
        self.verify_installation()?;
        match self.check_for_update().await? {
            Some(release) => {
                self.install_update(&release, progress).await?;
                Ok(Some(release.version))
            }
            None => Ok(None),
        }
    }

    /// Add or replace a single mod next to the mod pack.
    pub async fn install_mod(
        &mut self,
        mod_info: &ModInfo,
        on_progress: &mut (dyn FnMut(f32) + Send),
    ) -> Result<PathBuf> {
        self.verify_installation()?;
        self.installer
            .install_mod(mod_info, &self.config, on_progress)
            .await
    }

    /// Verify the install, bring the mod pack up to date if allowed, then start the game.
    pub async fn run(
        &mut self,
        skip_update: bool,
        progress: ProgressCallback<'_>,
    ) -> Result<LaunchOutcome> {
        info!("run: starting Rebirth launcher (mod pack {})", self.config.version);
        self.verify_installation()?;

        let outcome = if skip_update || !self.config.check_updates_on_launch {
            info!("run: update check skipped");
            LaunchOutcome::Skipped
        } else {
            self.update_before_launch(progress).await?
        };

        self.process.launch(&self.config)?;
        info!("run: game launched");
        Ok(outcome)
    }

    async fn update_before_launch(&mut self, progress: ProgressCallback<'_>) -> Result<LaunchOutcome> {
        let release = match self.check_for_update().await {
            Ok(Some(release)) => release,
            Ok(None) => return Ok(LaunchOutcome::UpToDate),
            Err(err) => {
                warn!(
                    "run: update check failed, launching installed version: {} ({})",
                    err,
                    err.detail().unwrap_or("no detail")
                );
                return Ok(LaunchOutcome::CheckFailed(err));
            }
        };

        if !self.config.auto_update {
            info!("run: update {} available, auto update is off", release.version);
            return Ok(LaunchOutcome::UpdateAvailable(release));
        }

        self.install_update(&release, progress).await?;
        Ok(LaunchOutcome::Installed(release.version))
    }

    fn verify_installation(&mut self) -> Result<()> {
        if !self.steam.verify_ownership() {
            error!("run: Steam ownership check failed");
            return Err(
                LauncherError::steam_ownership("7 Days to Die not found in Steam library")
                    .with_detail("Please ensure the game is installed through Steam"),
            );
        }
        self.config.validate_paths()
    }
}
