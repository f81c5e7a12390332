//! Install failure taxonomy
//!
//! Every failure is fatal to the install. Each variant carries the pipeline
//! [`Stage`] it belongs to so the entry point can emit a single
//! stage-attributed diagnostic line.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Pipeline stage a failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolve,     // OS/arch mapping
    Manifest,    // package.json read
    Download,    // release fetch
    Prepare,     // destination directory
    Extract,     // archive unpack
    Verify,      // post-condition check
    Permissions, // chmod 0755
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Resolve => "resolve",
            Stage::Manifest => "manifest",
            Stage::Download => "download",
            Stage::Prepare => "prepare",
            Stage::Extract => "extract",
            Stage::Verify => "verify",
            Stage::Permissions => "permissions",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Unsupported platform or architecture: {os}/{arch}. Cannot download binary.")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("Failed to read package manifest {}: {reason}", path.display())]
    Manifest { path: PathBuf, reason: String },

    #[error("{}", download_message(*status, url, message))]
    DownloadFailed {
        status: Option<u16>,
        url: String,
        message: String,
    },

    #[error("Failed to extract binary from archive: {reason}")]
    ExtractionFailed { reason: String },

    #[error("Binary not found after extraction: {}", path.display())]
    ArtifactMissing { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn download_message(status: Option<u16>, url: &str, message: &str) -> String {
    match status {
        Some(status) => format!(
            "Failed to download binary. Status: {status}. URL: {url}. Error: {message}"
        ),
        None => format!("Failed to download binary. URL: {url}. Error: {message}"),
    }
}

impl InstallError {
    /// Stage this failure is reported under
    pub fn stage(&self) -> Stage {
        match self {
            InstallError::UnsupportedPlatform { .. } => Stage::Resolve,
            InstallError::Manifest { .. } => Stage::Manifest,
            InstallError::DownloadFailed { .. } => Stage::Download,
            InstallError::ExtractionFailed { .. } => Stage::Extract,
            InstallError::ArtifactMissing { .. } => Stage::Verify,
            InstallError::Io { stage, .. } => *stage,
        }
    }

    pub(crate) fn extraction(reason: impl Into<String>) -> Self {
        InstallError::ExtractionFailed {
            reason: reason.into(),
        }
    }

    pub(crate) fn io(stage: Stage, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InstallError::Io {
            stage,
            path: path.into(),
            source,
        }
    }

    /// HTTP status of a failed download, if the server answered at all
    pub fn http_status(&self) -> Option<u16> {
        match self {
            InstallError::DownloadFailed { status, .. } => *status,
            _ => None,
        }
    }

    /// Single diagnostic line: `<stage>: <message>`
    pub fn diagnostic(&self) -> String {
        let line = format!("{}: {}", self.stage(), self);
        line.replace(['\n', '\r'], " ")
    }
}
