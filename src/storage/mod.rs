use std::io;
use std::path::{Path, PathBuf};

use log::info;
use tokio::fs;

use crate::config::LauncherConfig;
use crate::env;
use crate::error::{LauncherError, Result};

/// Loads and persists the launcher configuration file.
#[derive(Clone, Debug)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Self {
        Self::new(env::config_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the config, writing defaults to disk when no file exists yet.
    pub async fn load(&self) -> Result<LauncherConfig> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let config = LauncherConfig::default();
                self.save(&config).await?;
                info!("config: created new configuration at {}", self.path.display());
                return Ok(config);
            }
            Err(err) => {
                return Err(LauncherError::config("Failed to load configuration")
                    .with_detail(format!("{}: {err}", self.path.display())));
            }
        };
        let config = serde_json::from_slice(&bytes).map_err(|e| {
            LauncherError::config("Failed to load configuration")
                .with_detail(format!("{}: {e}", self.path.display()))
        })?;
        info!("config: loaded configuration from {}", self.path.display());
        Ok(config)
    }

    pub async fn save(&self, config: &LauncherConfig) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(config).map_err(|e| {
            LauncherError::config("Failed to save configuration").with_detail(e.to_string())
        })?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                LauncherError::config("Failed to save configuration")
                    .with_detail(format!("unable to create {}: {e}", parent.display()))
            })?;
        }
        fs::write(&self.path, &bytes).await.map_err(|e| {
            LauncherError::config("Failed to save configuration")
                .with_detail(format!("{}: {e}", self.path.display()))
        })?;
        info!("config: saved configuration to {}", self.path.display());
        Ok(())
    }
}
