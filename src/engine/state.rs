use std::fmt;

use crate::error::ErrorKind;

/// Steps of a mod-pack install.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstallStage {
    Idle,
    Cleaning,
    Downloading,
    Verifying,
    Extracting,
    Committing,
    Done,
    Failed(ErrorKind),
}

impl InstallStage {
    /// Forward-only pipeline; any working stage may fail, `Done` and `Failed` are final.
    pub fn can_transition_to(self, next: InstallStage) -> bool {
        use InstallStage::*;
        match (self, next) {
            (Idle, Cleaning)
            | (Cleaning, Downloading)
            | (Downloading, Verifying)
            | (Verifying, Extracting)
            | (Extracting, Committing)
            | (Committing, Done) => true,
            (Cleaning | Downloading | Verifying | Extracting | Committing, Failed(_)) => true,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, InstallStage::Done | InstallStage::Failed(_))
    }
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallStage::Idle => f.write_str("idle"),
            InstallStage::Cleaning => f.write_str("cleaning"),
            InstallStage::Downloading => f.write_str("downloading"),
            InstallStage::Verifying => f.write_str("verifying"),
            InstallStage::Extracting => f.write_str("extracting"),
            InstallStage::Committing => f.write_str("committing"),
            InstallStage::Done => f.write_str("done"),
            InstallStage::Failed(kind) => write!(f, "failed ({kind})"),
        }
    }
}

// Sent to whoever renders install progress.
#[derive(Clone, Debug, PartialEq)]
pub struct InstallProgress {
    pub stage: InstallStage,
    /// Overall download progress, 0.0-1.0, never decreasing within one install.
    pub fraction: f32,
    pub message: String,
    pub current_file: Option<String>,
}

pub type ProgressCallback<'a> = Option<&'a mut (dyn FnMut(InstallProgress) + Send)>;

pub fn emit_progress(cb: &mut ProgressCallback<'_>, update: InstallProgress) {
    if let Some(callback) = cb.as_deref_mut() {
        callback(update);
    }
}
