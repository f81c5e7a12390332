//! Install a prebuilt release binary into a script-only package
//!
//! At package install time the [`Installer`] resolves the host platform,
//! derives the release asset name, downloads the archive from the release
//! host, extracts the one executable into `<package>/bin` and marks it
//! executable. The [`shim`] then forwards every later invocation to it.

pub mod config;
pub mod error;
pub mod install;
pub mod manifest;
pub mod shim;

pub use config::InstallConfig;
pub use error::{InstallError, Stage};
pub use install::{InstalledArtifact, Installer};
