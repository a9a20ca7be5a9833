use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use log::{debug, info, warn};

use crate::config::{LauncherConfig, game_executable};
use crate::error::{LauncherError, Result};

#[derive(Clone, Default)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        Self
    }

    /// Start the game detached from the launcher.
    pub fn launch(&self, config: &LauncherConfig) -> Result<()> {
        let game_dir = &config.game_path;
        let exe_path = game_executable(game_dir);
        if !exe_path.is_file() {
            warn!("launch: executable not found at {}", exe_path.display());
            return Err(LauncherError::game_path("Game executable not found")
                .with_detail(format!("Expected path: {}", exe_path.display())));
        }

        let args = launch_args(game_dir, config.disable_eac);
        info!(
            "launch: starting {} {}",
            exe_path.display(),
            args.iter()
                .map(|a| a.to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let mut cmd = Command::new(&exe_path);
        cmd.args(&args)
            .current_dir(game_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(target_os = "windows")]
        {
            use std::os::windows::process::CommandExt;
            // DETACHED_PROCESS
            cmd.creation_flags(0x00000008);
        }

        let child = cmd.spawn().map_err(|e| {
            LauncherError::launch("Failed to launch game")
                .with_detail(format!("{}: {e}", exe_path.display()))
        })?;
        debug!("launch: process {} started", child.id());
        Ok(())
    }
}

/// `-logfile <game>/output_log.txt [-noeac]`
pub fn launch_args(game_dir: &Path, disable_eac: bool) -> Vec<OsString> {
    let mut args = vec![
        OsString::from("-logfile"),
        game_dir.join("output_log.txt").into_os_string(),
    ];
    if disable_eac {
        args.push(OsString::from("-noeac"));
    }
    args
}
