//! GitHub release download URLs

use std::fmt;

use url::Url;

/// Default release host
pub const GITHUB_HOST: &str = "https://github.com";

/// Identifies exactly one immutable release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseCoordinates {
    pub owner: String,
    pub project: String,
    /// Semver version without a leading `v`
    pub version: String,
}

impl ReleaseCoordinates {
    pub fn new(
        owner: impl Into<String>,
        project: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            project: project.into(),
            version: version.into(),
        }
    }

    /// Release tag the assets are published under
    pub fn tag(&self) -> String {
        format!("v{}", self.version)
    }

    /// `<host>/<owner>/<project>/releases/download/v<version>/<file_name>`
    pub fn download_url(&self, host: &Url, file_name: &str) -> Result<Url, url::ParseError> {
        let mut url = host.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
            segments.pop_if_empty().extend([
                self.owner.as_str(),
                self.project.as_str(),
                "releases",
                "download",
                self.tag().as_str(),
                file_name,
            ]);
        }
        Ok(url)
    }
}

impl fmt::Display for ReleaseCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.project, self.tag())
    }
}
