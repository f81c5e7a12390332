//! Release asset naming
//!
//! The name built here must stay byte-identical to the archive name template
//! of the release pipeline that publishes the assets:
//!
//! ```text
//! {project}_{Os}_{arch}.{ext}      ext = "zip" on Windows, "tar.gz" otherwise
//! ```
//!
//! Drift between the two is not detectable at runtime; it shows up as a 404
//! from the fetcher. `tests/fixtures/published_assets.txt` pins the names of a
//! real release so a template change fails the test suite instead.

use std::fmt;

use super::platform::Platform;
use crate::error::InstallError;

/// Archive container format of a release asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    TarGz,
    Zip,
}

impl ArchiveKind {
    /// Archive kind published for a platform
    pub fn for_platform(platform: Platform) -> Self {
        if platform.is_windows() {
            ArchiveKind::Zip
        } else {
            ArchiveKind::TarGz
        }
    }

    /// Infer the kind from an asset file name.
    ///
    /// This is the only place a name suffix is inspected; everything downstream
    /// matches on the returned variant.
    pub fn from_file_name(file_name: &str) -> Result<Self, InstallError> {
        if file_name.ends_with(".tar.gz") {
            Ok(ArchiveKind::TarGz)
        } else if file_name.ends_with(".zip") {
            Ok(ArchiveKind::Zip)
        } else {
            Err(InstallError::extraction("unsupported archive format"))
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveKind::TarGz => "tar.gz",
            ArchiveKind::Zip => "zip",
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A published release asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    pub file_name: String,
    pub archive_kind: ArchiveKind,
}

impl AssetDescriptor {
    /// Build the asset published for `project` on `platform`
    pub fn for_platform(project: &str, platform: Platform) -> Result<Self, InstallError> {
        let file_name = asset_file_name(project, platform);
        let archive_kind = ArchiveKind::from_file_name(&file_name)?;
        Ok(Self {
            file_name,
            archive_kind,
        })
    }
}

/// `{project}_{Os}_{arch}.{ext}`
pub fn asset_file_name(project: &str, platform: Platform) -> String {
    format!(
        "{}_{}_{}.{}",
        project,
        platform.os,
        platform.arch,
        ArchiveKind::for_platform(platform).extension()
    )
}

/// File name of the installed executable; `.exe` is appended only on Windows
pub fn executable_name(command: &str, platform: Platform) -> String {
    if platform.is_windows() {
        format!("{command}.exe")
    } else {
        command.to_string()
    }
}
