//! Launch shim
//!
//! Forwards an invocation to the installed executable: arguments pass through
//! untouched, stdio is inherited and the child's exit code becomes ours.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::error::InstallError;
use crate::manifest::{MANIFEST_FILE, PackageManifest};

#[derive(Error, Debug)]
pub enum ShimError {
    #[error(transparent)]
    Manifest(#[from] InstallError),

    #[error(
        "Binary not found at {}. The install step might have failed. Try reinstalling the package.",
        path.display()
    )]
    Missing { path: PathBuf },

    #[error("Error spawning binary {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Path the installer puts the executable at, for the host this runs on
pub fn installed_binary_path(package_root: &Path) -> Result<PathBuf, InstallError> {
    let manifest = PackageManifest::load(package_root)?;
    let command = manifest.command_name(&package_root.join(MANIFEST_FILE))?;
    Ok(package_root
        .join(manifest.bin_dir())
        .join(format!("{command}{}", std::env::consts::EXE_SUFFIX)))
}

/// Run the installed executable, returning the exit code to exit with
pub async fn run(package_root: &Path, args: &[OsString]) -> Result<i32, ShimError> {
    let binary = installed_binary_path(package_root)?;
    exec_binary(&binary, args).await
}

/// Spawn `binary` with inherited stdio and wait for it.
///
/// A child without an exit code (killed by a signal) maps to 0.
pub async fn exec_binary(binary: &Path, args: &[OsString]) -> Result<i32, ShimError> {
    if !binary.is_file() {
        return Err(ShimError::Missing {
            path: binary.to_path_buf(),
        });
    }

    debug!("Spawning {} with {} argument(s)", binary.display(), args.len());
    let status = tokio::process::Command::new(binary)
        .args(args)
        .status()
        .await
        .map_err(|source| ShimError::Spawn {
            path: binary.to_path_buf(),
            source,
        })?;

    Ok(status.code().unwrap_or(0))
}
