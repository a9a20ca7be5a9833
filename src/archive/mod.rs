use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, error, info};

use crate::error::{LauncherError, Result};

/// Unpacks an archive, given its first part, into a directory.
pub trait Extractor {
    fn extract(&self, first_part: &Path, output_dir: &Path, password: Option<&str>) -> Result<()>;
}

/// The 7-Zip command line tool, found on a short list of install locations.
#[derive(Clone, Debug)]
pub struct SevenZip {
    search_paths: Vec<PathBuf>,
}

impl SevenZip {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    /// Standard install locations, preceded by an explicitly configured binary.
    pub fn with_override(configured: Option<PathBuf>) -> Self {
        let mut paths: Vec<PathBuf> = configured.into_iter().collect();
        paths.extend(default_search_paths());
        Self::new(paths)
    }

    pub fn locate(&self) -> Option<PathBuf> {
        self.search_paths.iter().find(|path| path.is_file()).cloned()
    }
}

impl Extractor for SevenZip {
    fn extract(&self, first_part: &Path, output_dir: &Path, password: Option<&str>) -> Result<()> {
        let tool = self.locate().ok_or_else(|| {
            LauncherError::tool_not_found("7-Zip not found").with_detail(format!(
                "Please install 7-Zip; searched {}",
                self.search_paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })?;

        if !first_part.is_file() {
            return Err(LauncherError::archive_not_found("Archive not found")
                .with_detail(format!("Path: {}", first_part.display())));
        }

        fs::create_dir_all(output_dir).map_err(|e| {
            LauncherError::extraction("Failed to create extraction directory")
                .with_detail(format!("{}: {e}", output_dir.display()))
        })?;

        let args = extract_args(first_part, output_dir, password);
        info!(
            "extract: running {} for {} into {}",
            tool.display(),
            first_part.display(),
            output_dir.display()
        );
        debug!("extract: password supplied={}", password.is_some());

        let output = Command::new(&tool)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                LauncherError::extraction("Failed to run 7-Zip")
                    .with_detail(format!("{}: {e}", tool.display()))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let diagnostics = if stderr.trim().is_empty() {
                stdout.trim().to_owned()
            } else {
                stderr.trim().to_owned()
            };
            error!("extract: 7-Zip exited with {}: {}", output.status, diagnostics);
            return Err(LauncherError::extraction("Failed to extract mod archive")
                .with_detail(format!("7-Zip exited with {}: {diagnostics}", output.status)));
        }

        info!("extract: completed {}", first_part.display());
        Ok(())
    }
}

/// `x -y -o<dir> [-p<password>] <archive>`: extract with paths, answer yes to prompts.
pub fn extract_args(first_part: &Path, output_dir: &Path, password: Option<&str>) -> Vec<OsString> {
    let mut out_flag = OsString::from("-o");
    out_flag.push(output_dir.as_os_str());

    let mut args = vec![OsString::from("x"), OsString::from("-y"), out_flag];
    if let Some(password) = password.filter(|p| !p.is_empty()) {
        args.push(OsString::from(format!("-p{password}")));
    }
    args.push(first_part.as_os_str().to_owned());
    args
}

fn default_search_paths() -> Vec<PathBuf> {
    if cfg!(target_os = "windows") {
        vec![
            PathBuf::from(r"C:\Program Files\7-Zip\7z.exe"),
            PathBuf::from(r"C:\Program Files (x86)\7-Zip\7z.exe"),
        ]
    } else if cfg!(target_os = "macos") {
        vec![
            PathBuf::from("/opt/homebrew/bin/7z"),
            PathBuf::from("/usr/local/bin/7z"),
            PathBuf::from("/opt/homebrew/bin/7zz"),
            PathBuf::from("/usr/local/bin/7zz"),
        ]
    } else {
        vec![
            PathBuf::from("/usr/bin/7z"),
            PathBuf::from("/usr/local/bin/7z"),
            PathBuf::from("/usr/bin/7zz"),
            PathBuf::from("/usr/bin/7za"),
        ]
    }
}
