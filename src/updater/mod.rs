use std::path::Path;

use log::{debug, info};
use serde::Deserialize;

use crate::engine::models::ReleaseInfo;
use crate::error::{LauncherError, Result};
use crate::integrity::chunk_sequence;
use crate::networking::NetworkClient;

/// Release manifest as published. Accepts both the dedicated manifest layout and
/// a GitHub release document (`tag_name`, `body`, `assets`).
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseManifest {
    #[serde(alias = "tag_name")]
    pub version: String,
    #[serde(default)]
    pub chunks: Vec<String>,
    #[serde(default)]
    pub assets: Vec<ManifestAsset>,
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default, alias = "body")]
    pub changelog: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestAsset {
    pub name: String,
}

/// Where the latest manifest comes from.
pub trait ReleaseSource {
    async fn latest_manifest(&self) -> Result<ReleaseManifest, String>;
}

pub struct HttpReleaseSource {
    client: NetworkClient,
    url: String,
}

impl HttpReleaseSource {
    pub fn new(client: NetworkClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl ReleaseSource for HttpReleaseSource {
    async fn latest_manifest(&self) -> Result<ReleaseManifest, String> {
        debug!("update check: fetching {}", self.url);
        self.client.get_json(&self.url).await
    }
}

pub struct ReleaseResolver<S> {
    source: S,
}

impl<S: ReleaseSource> ReleaseResolver<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Compare the published release with `current_version`.
    ///
    /// Any difference in the version string counts as an update; there is no
    /// ordering between versions.
    pub async fn check_for_update(&self, current_version: &str) -> Result<Option<ReleaseInfo>> {
        let manifest = self.source.latest_manifest().await.map_err(|e| {
            LauncherError::update_check("Failed to check for updates").with_detail(e)
        })?;

        if manifest.version.trim().is_empty() {
            return Err(LauncherError::update_check("Release manifest has no version"));
        }
        if manifest.version == current_version {
            info!("update check: {} is up to date", current_version);
            return Ok(None);
        }

        let release = into_release(manifest)?;
        info!(
            "update check: {} available (installed {}, {} chunks)",
            release.version,
            current_version,
            release.chunks.len()
        );
        Ok(Some(release))
    }
}

fn into_release(manifest: ReleaseManifest) -> Result<ReleaseInfo> {
    let chunks = if manifest.chunks.is_empty() {
        manifest
            .assets
            .into_iter()
            .map(|asset| asset.name)
            .filter(|name| chunk_sequence(name).is_some())
            .collect()
    } else {
        manifest.chunks
    };

    if chunks.is_empty() {
        return Err(LauncherError::update_check("Release manifest lists no archive chunks")
            .with_detail(format!("version {}", manifest.version)));
    }
    if let Some(bad) = chunks.iter().find(|name| !is_plain_file_name(name)) {
        return Err(
            LauncherError::update_check("Release manifest lists an invalid chunk name")
                .with_detail(format!("chunk {bad:?}")),
        );
    }

    Ok(ReleaseInfo {
        version: manifest.version,
        chunks,
        checksum: manifest.checksum.unwrap_or_default().trim().to_owned(),
        changelog: manifest.changelog.filter(|text| !text.trim().is_empty()),
    })
}

/// Names that become local file or directory names must not reach outside their parent.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\'])
        && Path::new(name).file_name().is_some_and(|file| file == name)
}
