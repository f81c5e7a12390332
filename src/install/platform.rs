//! Platform detection for release asset selection
//!
//! Maps the host's operating system and CPU architecture onto the tokens used
//! in published asset names. Both the Node-style identifiers (`win32`, `x64`)
//! and Rust's own `std::env::consts` spellings (`windows`, `x86_64`) are
//! accepted so the resolver works whichever side reports the host.

use std::fmt;

use crate::error::InstallError;

/// Operating system token as it appears in asset names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsToken {
    Linux,
    Darwin,
    Windows,
}

/// CPU architecture token as it appears in asset names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchToken {
    X86_64,
    Arm64,
}

impl OsToken {
    pub const ALL: [OsToken; 3] = [OsToken::Linux, OsToken::Darwin, OsToken::Windows];

    pub fn from_host(os: &str) -> Option<Self> {
        match os {
            "linux" => Some(OsToken::Linux),
            "darwin" | "macos" => Some(OsToken::Darwin),
            "win32" | "windows" => Some(OsToken::Windows),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OsToken::Linux => "Linux",
            OsToken::Darwin => "Darwin",
            OsToken::Windows => "Windows",
        }
    }
}

impl ArchToken {
    pub const ALL: [ArchToken; 2] = [ArchToken::X86_64, ArchToken::Arm64];

    pub fn from_host(arch: &str) -> Option<Self> {
        match arch {
            "x64" | "x86_64" => Some(ArchToken::X86_64),
            "arm64" | "aarch64" => Some(ArchToken::Arm64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArchToken::X86_64 => "x86_64",
            ArchToken::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for OsToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ArchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved target platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: OsToken,
    pub arch: ArchToken,
}

impl Platform {
    pub fn new(os: OsToken, arch: ArchToken) -> Self {
        Self { os, arch }
    }

    /// Detect the platform this process is running on
    pub fn detect() -> Result<Self, InstallError> {
        Self::resolve(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Resolve host identifiers, failing closed when either is unknown
    pub fn resolve(os: &str, arch: &str) -> Result<Self, InstallError> {
        match (OsToken::from_host(os), ArchToken::from_host(arch)) {
            (Some(os), Some(arch)) => Ok(Self { os, arch }),
            _ => Err(InstallError::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            }),
        }
    }

    #[inline]
    pub fn is_windows(&self) -> bool {
        self.os == OsToken::Windows
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.os, self.arch)
    }
}
