use std::fmt;

use thiserror::Error;

/// Failure categories surfaced by the launcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    GamePath,
    SteamOwnership,
    UpdateCheckFailed,
    DownloadFailed,
    IntegrityFailure,
    CleanupFailed,
    ExtractionFailed,
    ToolNotFound,
    ArchiveNotFound,
    LaunchFailed,
    ModInstall,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Config => "ConfigError",
            ErrorKind::GamePath => "GamePathError",
            ErrorKind::SteamOwnership => "SteamOwnershipError",
            ErrorKind::UpdateCheckFailed => "UpdateCheckFailed",
            ErrorKind::DownloadFailed => "DownloadFailed",
            ErrorKind::IntegrityFailure => "IntegrityFailure",
            ErrorKind::CleanupFailed => "CleanupFailed",
            ErrorKind::ExtractionFailed => "ExtractionFailed",
            ErrorKind::ToolNotFound => "ToolNotFound",
            ErrorKind::ArchiveNotFound => "ArchiveNotFound",
            ErrorKind::LaunchFailed => "LaunchFailed",
            ErrorKind::ModInstall => "ModError",
        };
        f.write_str(name)
    }
}

/// A launcher failure: a short message for the user plus optional detail for the log.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LauncherError {
    kind: ErrorKind,
    message: String,
    detail: Option<String>,
}

pub type Result<T, E = LauncherError> = std::result::Result<T, E>;

impl LauncherError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn game_path(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::GamePath, message)
    }

    pub fn steam_ownership(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SteamOwnership, message)
    }

    pub fn update_check(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpdateCheckFailed, message)
    }

    pub fn download(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DownloadFailed, message)
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IntegrityFailure, message)
    }

    pub fn cleanup(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CleanupFailed, message)
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExtractionFailed, message)
    }

    pub fn tool_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ToolNotFound, message)
    }

    pub fn archive_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ArchiveNotFound, message)
    }

    pub fn launch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LaunchFailed, message)
    }

    pub fn mod_install(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ModInstall, message)
    }
}
