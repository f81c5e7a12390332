//! Install orchestration
//!
//! Runs resolve → name → fetch → prepare → extract → verify → chmod exactly
//! once, stopping at the first failure. Nothing is retried and nothing is
//! rolled back; the bin directory may be left behind, empty.

use std::path::{Path, PathBuf};

use log::{debug, info};
use url::Url;

use super::asset::{AssetDescriptor, executable_name};
use super::extract::extract_archive;
use super::fetch::fetch_release_asset;
use super::platform::Platform;
use crate::config::InstallConfig;
use crate::error::{InstallError, Stage};

/// The installed executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledArtifact {
    pub path: PathBuf,
    /// Whether the 0755 permission step ran
    pub executable_bit: bool,
}

/// Everything derivable before touching the network or the filesystem
#[derive(Debug, Clone)]
pub struct InstallPlan {
    pub platform: Platform,
    pub asset: AssetDescriptor,
    pub url: Url,
    pub bin_dir: PathBuf,
    pub executable: String,
}

impl InstallPlan {
    /// Final path of the executable
    pub fn destination(&self) -> PathBuf {
        self.bin_dir.join(&self.executable)
    }
}

pub struct Installer {
    config: InstallConfig,
    platform: Platform,
}

impl Installer {
    pub fn new(config: InstallConfig, platform: Platform) -> Self {
        Self { config, platform }
    }

    /// Detect the host platform, then read the package's own manifest
    pub fn for_package_root(package_root: &Path) -> Result<Self, InstallError> {
        let platform = Platform::detect()?;
        let config = InstallConfig::load(package_root)?;
        Ok(Self::new(config, platform))
    }

    pub fn config(&self) -> &InstallConfig {
        &self.config
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Asset name, URL and destination for this install
    pub fn plan(&self) -> Result<InstallPlan, InstallError> {
        let release = &self.config.release;
        let asset = AssetDescriptor::for_platform(&release.project, self.platform)?;
        let url = release
            .download_url(&self.config.host, &asset.file_name)
            .map_err(|e| InstallError::DownloadFailed {
                status: None,
                url: format!("{}", self.config.host),
                message: format!("cannot build download URL: {e}"),
            })?;

        Ok(InstallPlan {
            platform: self.platform,
            asset,
            url,
            bin_dir: self.config.bin_path(),
            executable: executable_name(&self.config.command, self.platform),
        })
    }

    /// Run the full pipeline
    pub async fn install(&self) -> Result<InstalledArtifact, InstallError> {
        info!("Detected platform: {}", self.platform);
        info!("Required version: {}", self.config.release.version);

        let plan = self.plan()?;

        let archive = fetch_release_asset(&plan.url, &plan.asset).await?;

        info!("Ensuring target directory exists: {}", plan.bin_dir.display());
        tokio::fs::create_dir_all(&plan.bin_dir)
            .await
            .map_err(|e| InstallError::io(Stage::Prepare, &plan.bin_dir, e))?;

        let binary_path = extract_archive(archive, &plan.executable, &plan.bin_dir).await?;

        if !binary_path.is_file() {
            return Err(InstallError::ArtifactMissing { path: binary_path });
        }

        let executable_bit = if plan.platform.is_windows() {
            debug!("Skipping permission step on Windows");
            false
        } else {
            make_executable(&binary_path)?
        };

        info!("Installed {} to {}", self.config.command, binary_path.display());
        Ok(InstalledArtifact {
            path: binary_path,
            executable_bit,
        })
    }
}

/// chmod 0755; returns whether the mode could be set on this host
#[cfg(unix)]
fn make_executable(path: &Path) -> Result<bool, InstallError> {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    info!("Setting executable permission for {}", path.display());
    let mut perms = fs::metadata(path)
        .map_err(|e| InstallError::io(Stage::Permissions, path, e))?
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).map_err(|e| InstallError::io(Stage::Permissions, path, e))?;
    Ok(true)
}

#[cfg(not(unix))]
fn make_executable(path: &Path) -> Result<bool, InstallError> {
    log::warn!(
        "Cannot set Unix permissions on {} from this host",
        path.display()
    );
    Ok(false)
}
