use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use crate::archive::Extractor;
use crate::cleanup::clean_directory;
use crate::config::LauncherConfig;
use crate::engine::models::{ModInfo, ReleaseInfo};
use crate::engine::state::{InstallProgress, InstallStage, ProgressCallback, emit_progress};
use crate::error::{ErrorKind, LauncherError, Result};
use crate::integrity::{chunk_sequence, digest, digest_parts, is_sha256_hex, order_chunks};
use crate::networking::AssetFetcher;
use crate::storage::ConfigStore;
use crate::updater::is_plain_file_name;
use crate::util::{format_bytes, overall_fraction};

/// Drives one mod-pack update: clean, download, verify, extract, commit.
///
/// The installed version recorded in the config only changes after every
/// other step has succeeded. A failure at any step stops the install; nothing
/// is retried or rolled back.
pub struct Installer<F, X> {
    fetcher: F,
    extractor: X,
    preserve: HashSet<String>,
    stage: InstallStage,
    fraction: f32,
}

impl<F: AssetFetcher, X: Extractor> Installer<F, X> {
    pub fn new(fetcher: F, extractor: X, preserve: HashSet<String>) -> Self {
        Self {
            fetcher,
            extractor,
            preserve,
            stage: InstallStage::Idle,
            fraction: 0.0,
        }
    }

    pub async fn install(
        &mut self,
        release: &ReleaseInfo,
        config: &mut LauncherConfig,
        store: &ConfigStore,
        mut progress: ProgressCallback<'_>,
    ) -> Result<()> {
        self.stage = InstallStage::Idle;
        self.fraction = 0.0;
        info!(
            "install: updating mod pack {} -> {}",
            config.version, release.version
        );

        let result = self.run_steps(release, config, store, &mut progress).await;
        match &result {
            Ok(()) => {
                self.fraction = 1.0;
                self.enter(
                    InstallStage::Done,
                    format!("Rebirth {} installed", release.version),
                    &mut progress,
                );
                info!("install: update to {} completed", release.version);
            }
            Err(err) => {
                let failed_at = self.stage;
                self.enter(
                    InstallStage::Failed(err.kind()),
                    err.message().to_owned(),
                    &mut progress,
                );
                error!(
                    "install: failed while {}: {} ({})",
                    failed_at,
                    err,
                    err.detail().unwrap_or("no detail")
                );
            }
        }
        result
    }

    async fn run_steps(
        &mut self,
        release: &ReleaseInfo,
        config: &mut LauncherConfig,
        store: &ConfigStore,
        progress: &mut ProgressCallback<'_>,
    ) -> Result<()> {
        self.enter(InstallStage::Cleaning, "Cleaning mod directories".into(), progress);
        self.clean_mod_dirs(config)?;

        let temp_dir = config.temp_dir();
        self.enter(InstallStage::Downloading, "Downloading mod pack".into(), progress);
        self.download_chunks(release, &config.mod_hosting_url, &temp_dir, progress)
            .await?;

        self.enter(InstallStage::Verifying, "Verifying download".into(), progress);
        let parts = verify_chunks(release, &temp_dir)?;

        self.enter(InstallStage::Extracting, "Extracting mod pack".into(), progress);
        self.extract(&parts, config)?;

        self.enter(InstallStage::Committing, "Finishing update".into(), progress);
        remove_chunks(&parts)?;
        commit_version(config, store, &release.version).await
    }

    fn enter(&mut self, next: InstallStage, message: String, progress: &mut ProgressCallback<'_>) {
        debug_assert!(
            self.stage.can_transition_to(next),
            "invalid install transition {} -> {}",
            self.stage,
            next
        );
        debug!("install: {} -> {}", self.stage, next);
        self.stage = next;
        emit_progress(
            progress,
            InstallProgress {
                stage: next,
                fraction: self.fraction,
                message,
                current_file: None,
            },
        );
    }

    fn clean_mod_dirs(&self, config: &LauncherConfig) -> Result<()> {
        for dir in config.mod_dirs() {
            info!("install: cleaning {}", dir.display());
            clean_directory(&dir, &self.preserve).map_err(|e| {
                LauncherError::cleanup("Failed to clean mod directories")
                    .with_detail(format!("{}: {e}", dir.display()))
            })?;
        }
        Ok(())
    }

    async fn download_chunks(
        &mut self,
        release: &ReleaseInfo,
        base_url: &str,
        temp_dir: &Path,
        progress: &mut ProgressCallback<'_>,
    ) -> Result<()> {
        fs::create_dir_all(temp_dir).map_err(|e| {
            LauncherError::download("Failed to prepare download directory")
                .with_detail(format!("{}: {e}", temp_dir.display()))
        })?;

        let total = release.chunks.len();
        let mut fraction = self.fraction;
        for (index, chunk) in release.chunks.iter().enumerate() {
            let url = release.asset_url(base_url, chunk);
            let dest = temp_dir.join(chunk);
            let message = format!("Downloading {chunk} ({}/{total})", index + 1);
            info!("install: {} from {}", message, url);

            let mut on_chunk = |current: f32| {
                fraction = overall_fraction(index, current, total).max(fraction);
                emit_progress(
                    progress,
                    InstallProgress {
                        stage: InstallStage::Downloading,
                        fraction,
                        message: message.clone(),
                        current_file: Some(chunk.clone()),
                    },
                );
            };
            let fetched = self.fetcher.fetch(&url, &dest, &mut on_chunk).await;
            self.fraction = fraction;
            let bytes = fetched?;

            fraction = overall_fraction(index + 1, 0.0, total).max(fraction);
            emit_progress(
                progress,
                InstallProgress {
                    stage: InstallStage::Downloading,
                    fraction,
                    message: format!("Downloaded {chunk} ({})", format_bytes(bytes)),
                    current_file: Some(chunk.clone()),
                },
            );
            debug!("install: {} written to {}", chunk, dest.display());
        }
        self.fraction = fraction;
        Ok(())
    }

    fn extract(&self, parts: &[PathBuf], config: &LauncherConfig) -> Result<()> {
        let first = parts
            .first()
            .ok_or_else(|| LauncherError::integrity("No downloaded archive chunks found"))?;
        self.extractor
            .extract(first, &config.mods_path, config.archive_password.as_deref())
            .map_err(|err| {
                if err.kind() != ErrorKind::ExtractionFailed {
                    return err;
                }
                let detail = err.detail().unwrap_or(err.message()).to_owned();
                LauncherError::extraction(
                    "Failed to extract mod pack; the mods folder may be incomplete. Re-run the update to restore it",
                )
                .with_detail(detail)
            })
    }

    /// Install or replace one add-on mod under `<mods>/<name>`.
    ///
    /// Only that mod's directory is cleared; the rest of the mods folder is left alone.
    pub async fn install_mod(
        &self,
        mod_info: &ModInfo,
        config: &LauncherConfig,
        on_progress: &mut (dyn FnMut(f32) + Send),
    ) -> Result<PathBuf> {
        let name = mod_info.name.as_str();
        if !is_plain_file_name(name) || mod_info.version.trim().is_empty() {
            return Err(LauncherError::mod_install("Invalid mod name or version")
                .with_detail(format!("mod {name:?} version {:?}", mod_info.version)));
        }

        fs::create_dir_all(&config.mods_path).map_err(|e| {
            LauncherError::mod_install(format!(
                "Failed to create mod directory: {}",
                config.mods_path.display()
            ))
            .with_detail(e.to_string())
        })?;

        let target = config.mods_path.join(name);
        clean_directory(&target, &HashSet::new()).map_err(|e| {
            LauncherError::mod_install(format!(
                "Failed to clean existing mod directory: {}",
                target.display()
            ))
            .with_detail(e.to_string())
        })?;

        let temp_dir = config.temp_dir();
        fs::create_dir_all(&temp_dir).map_err(|e| {
            LauncherError::mod_install(format!("Failed to install mod {name}"))
                .with_detail(format!("{}: {e}", temp_dir.display()))
        })?;
        let url = mod_info.download_url(&config.mod_hosting_url);
        let archive = temp_dir.join(format!(
            "{name}-{}.7z",
            mod_info.version.trim_start_matches('v')
        ));
        info!("mod install: {} {} from {}", name, mod_info.version, url);
        self.fetcher
            .fetch(&url, &archive, on_progress)
            .await
            .map_err(|err| {
                LauncherError::mod_install(format!("Failed to download mod {name}"))
                    .with_detail(err.detail().unwrap_or(err.message()).to_owned())
            })?;

        self.extractor
            .extract(&archive, &target, None)
            .map_err(|err| match err.kind() {
                ErrorKind::ToolNotFound => err,
                _ => LauncherError::mod_install(format!("Failed to install mod {name}"))
                    .with_detail(err.detail().unwrap_or(err.message()).to_owned()),
            })?;

        remove_chunks(std::slice::from_ref(&archive))?;
        info!("mod install: {} installed into {}", name, target.display());
        Ok(target)
    }
}

/// Chunks named by the release, present in `temp_dir`, in part order.
fn verify_chunks(release: &ReleaseInfo, temp_dir: &Path) -> Result<Vec<PathBuf>> {
    let (mut present, missing): (Vec<&str>, Vec<&str>) = release
        .chunks
        .iter()
        .map(String::as_str)
        .partition(|chunk| temp_dir.join(chunk).is_file());

    if present.is_empty() {
        return Err(LauncherError::integrity("No downloaded archive chunks found")
            .with_detail(format!("Temp directory: {}", temp_dir.display())));
    }
    if !missing.is_empty() {
        return Err(LauncherError::integrity("Downloaded archive is incomplete")
            .with_detail(format!("missing chunks: {}", missing.join(", "))));
    }

    let mut seen = HashSet::new();
    present.retain(|chunk| seen.insert(*chunk));
    order_chunks(&mut present).map_err(|bad| {
        LauncherError::integrity("Archive chunk has no part number")
            .with_detail(format!("chunk {bad}"))
    })?;
    if let Some(pair) = present
        .windows(2)
        .find(|pair| chunk_sequence(pair[0]) == chunk_sequence(pair[1]))
    {
        return Err(LauncherError::integrity("Archive chunks share a part number")
            .with_detail(format!("chunks {} and {}", pair[0], pair[1])));
    }
    let parts: Vec<PathBuf> = present.iter().map(|chunk| temp_dir.join(chunk)).collect();
    debug!("verify: part order {:?}", present);
    if log::log_enabled!(log::Level::Debug) {
        for part in &parts {
            match digest(part) {
                Ok(sum) => debug!("verify: {} sha256 {}", part.display(), sum),
                Err(e) => debug!("verify: cannot hash {}: {e}", part.display()),
            }
        }
    }

    let expected = release.checksum.trim();
    if is_sha256_hex(expected) {
        let actual = digest_parts(&parts).map_err(|e| {
            LauncherError::integrity("Failed to read downloaded archive").with_detail(e.to_string())
        })?;
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(
                LauncherError::integrity("Downloaded archive failed checksum verification")
                    .with_detail(format!("expected {expected}, got {actual}")),
            );
        }
        info!("verify: checksum matches {}", actual);
    } else if !expected.is_empty() {
        warn!(
            "verify: published checksum {:?} is not a SHA-256 digest; skipping verification",
            expected
        );
    }

    Ok(parts)
}

fn remove_chunks(parts: &[PathBuf]) -> Result<()> {
    for part in parts {
        match fs::remove_file(part) {
            Ok(()) => debug!("install: removed {}", part.display()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(LauncherError::cleanup("Failed to remove downloaded chunks")
                    .with_detail(format!("{}: {err}", part.display())));
            }
        }
    }
    Ok(())
}

async fn commit_version(
    config: &mut LauncherConfig,
    store: &ConfigStore,
    version: &str,
) -> Result<()> {
    let previous = std::mem::replace(&mut config.version, version.to_owned());
    if let Err(err) = store.save(config).await {
        config.version = previous;
        return Err(LauncherError::config(
            "Mod files were updated but the new version could not be saved",
        )
        .with_detail(err.detail().unwrap_or(err.message()).to_owned()));
    }
    info!("install: recorded version {}", version);
    Ok(())
}
