//! GitHub release API interaction

use std::time::Duration;

use serde::Deserialize;

use crate::error::InstallError;

/// GitHub release metadata from API
#[derive(Deserialize, Debug)]
pub struct GitHubRelease {
    pub tag_name: String,
    pub assets: Vec<GitHubAsset>,
}

/// GitHub release asset metadata
#[derive(Deserialize, Debug)]
pub struct GitHubAsset {
    pub name: String,
    pub browser_download_url: String,
    pub size: u64,
}

const API_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetch the latest release of `owner/name`.
pub async fn latest_release(repo: &str) -> Result<GitHubRelease, InstallError> {
    let url = format!("https://api.github.com/repos/{repo}/releases/latest");

    let client = reqwest::Client::builder()
        .user_agent(crate::USER_AGENT)
        .timeout(API_TIMEOUT)
        .build()?;

    let response = client.get(&url).send().await?;

    if !response.status().is_success() {
        return Err(InstallError::DownloadFailed {
            engine: repo.to_string(),
            reason: format!("GitHub API returned HTTP {}", response.status()),
        });
    }

    Ok(response.json().await?)
}

/// First asset matching "linux" + the arch token + a `.tar.gz` suffix.
///
/// Returning `None` here is what keeps a missing link from ever turning into
/// a download attempt.
pub fn find_asset<'a>(release: &'a GitHubRelease, arch: &str) -> Option<&'a GitHubAsset> {
    release.assets.iter().find(|asset| {
        let name = asset.name.to_ascii_lowercase();
        name.contains("linux") && name.contains(arch) && name.ends_with(".tar.gz")
    })
}
