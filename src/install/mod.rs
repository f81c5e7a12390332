//! Release download and single-binary installation
//!
//! ## Module Organization
//!
//! - `platform` - Host OS/architecture resolution
//! - `asset` - Release asset naming and archive kind
//! - `github` - Release coordinates and download URLs
//! - `fetch` - Archive download
//! - `extract` - Single-entry extraction (tar.gz, zip)
//! - `core` - Install orchestration

pub mod asset;
pub mod core;
pub mod extract;
pub mod fetch;
pub mod github;
pub mod platform;

// Re-export public API
pub use asset::{ArchiveKind, AssetDescriptor, asset_file_name, executable_name};
pub use self::core::{InstallPlan, InstalledArtifact, Installer};
pub use extract::extract_executable;
pub use fetch::DownloadedArchive;
pub use github::ReleaseCoordinates;
pub use platform::{ArchToken, OsToken, Platform};
