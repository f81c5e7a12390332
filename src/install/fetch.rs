//! Release archive download
//!
//! One GET per install: no retries, no resume, no timeout beyond the
//! transport defaults. The body is held in memory and never staged on disk.

use log::{debug, info};
use reqwest::header::ACCEPT;
use url::Url;

use super::asset::AssetDescriptor;
use crate::error::InstallError;

const USER_AGENT: &str = concat!("relinstall/", env!("CARGO_PKG_VERSION"));

/// Raw archive bytes together with the asset they were fetched for
#[derive(Debug, Clone)]
pub struct DownloadedArchive {
    pub asset: AssetDescriptor,
    pub bytes: Vec<u8>,
}

/// Download `asset` from `url`
pub async fn fetch_release_asset(
    url: &Url,
    asset: &AssetDescriptor,
) -> Result<DownloadedArchive, InstallError> {
    info!("Attempting to download binary package from: {url}");
    let bytes = fetch_bytes(url).await?;
    info!("Successfully downloaded {} ({} bytes)", asset.file_name, bytes.len());
    Ok(DownloadedArchive {
        asset: asset.clone(),
        bytes,
    })
}

/// Single GET, classifying failures by HTTP status vs. transport error
pub async fn fetch_bytes(url: &Url) -> Result<Vec<u8>, InstallError> {
    let transport_failure = |err: reqwest::Error| InstallError::DownloadFailed {
        status: None,
        url: url.to_string(),
        message: format!("{:#}", anyhow::Error::new(err)),
    };

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(transport_failure)?;

    let response = client
        .get(url.clone())
        .header(ACCEPT, "application/octet-stream")
        .send()
        .await
        .map_err(transport_failure)?;

    let status = response.status();
    debug!("GET {url} -> {status}");
    if !status.is_success() {
        return Err(InstallError::DownloadFailed {
            status: Some(status.as_u16()),
            url: url.to_string(),
            message: format!("HTTP {status}"),
        });
    }

    let body = response.bytes().await.map_err(transport_failure)?;
    Ok(body.to_vec())
}
