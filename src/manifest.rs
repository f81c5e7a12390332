//! Package manifest (`package.json`) access
//!
//! Only the handful of fields the installer needs are modelled; everything
//! else in the manifest is ignored.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::InstallError;

pub const MANIFEST_FILE: &str = "package.json";

/// Directory under the package root the executable is installed into
pub const DEFAULT_BIN_DIR: &str = "bin";

/// The subset of `package.json` the installer reads
#[derive(Debug, Clone, Deserialize)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub bin: Option<BinField>,
    /// Release location and layout overrides
    #[serde(default, rename = "binaryInstall")]
    pub binary_install: Option<InstallSettings>,
}

/// npm allows `"bin": "./cli.js"` or `"bin": { "<command>": "./cli.js" }`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BinField {
    Single(String),
    Commands(BTreeMap<String, String>),
}

/// `"binaryInstall"` block of the manifest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallSettings {
    pub owner: Option<String>,
    pub project: Option<String>,
    pub host: Option<String>,
    pub bin_dir: Option<String>,
}

impl PackageManifest {
    /// Read `package.json` from a package root
    pub fn load(package_root: &Path) -> Result<Self, InstallError> {
        let path = package_root.join(MANIFEST_FILE);
        let raw = fs::read_to_string(&path).map_err(|e| manifest_error(&path, e))?;
        Self::parse(&raw, &path)
    }

    pub fn parse(raw: &str, path: &Path) -> Result<Self, InstallError> {
        let manifest: PackageManifest =
            serde_json::from_str(raw).map_err(|e| manifest_error(path, e))?;
        manifest.validate_version(path)?;
        Ok(manifest)
    }

    /// Package name with any `@scope/` prefix removed
    pub fn unscoped_name(&self) -> &str {
        match self.name.split_once('/') {
            Some((scope, name)) if scope.starts_with('@') => name,
            _ => &self.name,
        }
    }

    /// Install directory relative to the package root
    pub fn bin_dir(&self) -> &str {
        self.binary_install
            .as_ref()
            .and_then(|s| s.bin_dir.as_deref())
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_BIN_DIR)
    }

    /// The single command this package exposes
    pub fn command_name(&self, path: &Path) -> Result<String, InstallError> {
        let command = match &self.bin {
            None | Some(BinField::Single(_)) => self.unscoped_name().to_string(),
            Some(BinField::Commands(commands)) => {
                let mut names = commands.keys();
                match (names.next(), names.next()) {
                    (Some(name), None) => name.clone(),
                    (None, _) => {
                        return Err(manifest_error(path, "'bin' field declares no command"));
                    }
                    (Some(_), Some(_)) => {
                        return Err(manifest_error(
                            path,
                            "'bin' field declares more than one command; multi-binary packages are not supported",
                        ));
                    }
                }
            }
        };

        if command.is_empty() || command.contains(['/', '\\']) || command == "." || command == ".." {
            return Err(manifest_error(
                path,
                format!("invalid command name '{command}'"),
            ));
        }
        Ok(command)
    }

    fn validate_version(&self, path: &Path) -> Result<(), InstallError> {
        if self.version.is_empty() {
            return Err(manifest_error(path, "'version' is empty"));
        }
        semver::Version::parse(&self.version).map_err(|e| {
            manifest_error(path, format!("'version' {:?} is not semver: {e}", self.version))
        })?;
        Ok(())
    }
}

pub(crate) fn manifest_error(path: &Path, reason: impl ToString) -> InstallError {
    InstallError::Manifest {
        path: PathBuf::from(path),
        reason: reason.to_string(),
    }
}
