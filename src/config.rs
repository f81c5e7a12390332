use std::path::{Path, PathBuf};

use url::Url;

use crate::error::InstallError;
use crate::install::github::{GITHUB_HOST, ReleaseCoordinates};
use crate::manifest::{MANIFEST_FILE, PackageManifest, manifest_error};

/// Resolved install configuration for one package
#[derive(Debug, Clone)]
pub struct InstallConfig {
    pub package_root: PathBuf,
    pub release: ReleaseCoordinates,
    /// Command name from the manifest's `bin` field, without any `.exe`
    pub command: String,
    pub host: Url,
    pub bin_dir: String,
}

impl InstallConfig {
    /// Load `package.json` from `package_root` and resolve it
    pub fn load(package_root: &Path) -> Result<Self, InstallError> {
        let manifest = PackageManifest::load(package_root)?;
        Self::from_manifest(package_root, &manifest)
    }

    pub fn from_manifest(
        package_root: &Path,
        manifest: &PackageManifest,
    ) -> Result<Self, InstallError> {
        let manifest_path = package_root.join(MANIFEST_FILE);
        let settings = manifest.binary_install.clone().unwrap_or_default();

        let owner = settings
            .owner
            .filter(|o| !o.is_empty())
            .ok_or_else(|| manifest_error(&manifest_path, "'binaryInstall.owner' is required"))?;
        let project = settings
            .project
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| manifest.unscoped_name().to_string());

        let host_str = settings.host.as_deref().unwrap_or(GITHUB_HOST);
        let host = Url::parse(host_str).map_err(|e| {
            manifest_error(&manifest_path, format!("invalid 'binaryInstall.host' {host_str:?}: {e}"))
        })?;
        if host.cannot_be_a_base() {
            return Err(manifest_error(
                &manifest_path,
                format!("'binaryInstall.host' {host_str:?} cannot be a base URL"),
            ));
        }

        Ok(Self {
            package_root: package_root.to_path_buf(),
            release: ReleaseCoordinates::new(owner, project, manifest.version.clone()),
            command: manifest.command_name(&manifest_path)?,
            host,
            bin_dir: manifest.bin_dir().to_string(),
        })
    }

    /// `<package_root>/<bin_dir>`
    pub fn bin_path(&self) -> PathBuf {
        self.package_root.join(&self.bin_dir)
    }
}
