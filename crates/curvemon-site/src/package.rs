//! Deployable bundle preparation.
//!
//! Optionally runs the frontend build, then copies the dist directory into a
//! fresh build directory ready to be zipped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;
use walkdir::WalkDir;

use crate::error::{SiteError, SiteResult};

#[derive(Debug, Clone)]
pub struct PackageOptions {
    pub dist_dir: PathBuf,
    pub build_dir: PathBuf,
    /// Shell command producing `dist_dir`, run first when set.
    pub build_command: Option<String>,
}

/// Build and stage the bundle. Returns the staged dist path.
pub fn prepare_bundle(options: &PackageOptions) -> SiteResult<PathBuf> {
    if let Some(command) = &options.build_command {
        run_build(command)?;
    }

    if !options.dist_dir.is_dir() {
        return Err(SiteError::DistNotFound(options.dist_dir.clone()));
    }

    if options.build_dir.exists() {
        fs::remove_dir_all(&options.build_dir)?;
    }
    fs::create_dir_all(&options.build_dir)?;

    let staged = options.build_dir.join("dist");
    let files = copy_dir(&options.dist_dir, &staged)?;

    info!(
        build_dir = %options.build_dir.display(),
        files,
        "Bundle prepared"
    );
    info!(
        "Zip contents before uploading: cd {} && zip -r ../curvemon-site.zip .",
        options.build_dir.display()
    );
    Ok(staged)
}

fn run_build(command: &str) -> SiteResult<()> {
    info!(command, "Running frontend build");
    let status = shell(command)
        .status()
        .map_err(|e| SiteError::BuildFailed {
            command: command.to_string(),
            reason: e.to_string(),
        })?;
    if !status.success() {
        return Err(SiteError::BuildFailed {
            command: command.to_string(),
            reason: status.to_string(),
        });
    }
    Ok(())
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", command]);
    cmd
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", command]);
    cmd
}

/// Recursive copy. Returns the number of files copied.
fn copy_dir(from: &Path, to: &Path) -> SiteResult<usize> {
    let mut files = 0;
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry.path().strip_prefix(from).map_err(io::Error::other)?;
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            files += 1;
        }
    }
    Ok(files)
}
