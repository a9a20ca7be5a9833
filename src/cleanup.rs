use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use log::debug;
use walkdir::WalkDir;

/// Remove everything under `path` except the top-level entries named in `preserve`.
///
/// A missing `path` is a no-op. Removal stops at the first failure and leaves
/// whatever was already deleted deleted.
pub fn clean_directory(path: &Path, preserve: &HashSet<String>) -> io::Result<()> {
    if !path.exists() {
        debug!("clean_directory: {} does not exist", path.display());
        return Ok(());
    }

    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let name = entry.file_name();
        if preserve.contains(name.to_string_lossy().as_ref()) {
            debug!("clean_directory: preserving {}", entry.path().display());
            continue;
        }

        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            remove_tree(&entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

fn remove_tree(root: &Path) -> io::Result<()> {
    for entry in WalkDir::new(root).contents_first(true) {
        let entry = entry.map_err(io::Error::other)?;
        if entry.file_type().is_dir() {
            fs::remove_dir(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}
