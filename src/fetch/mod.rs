//! Core fetcher: locate, download, and unpack the proxy engines.
//!
//! For each engine the release listing is queried once; the same response
//! supplies both the asset URL and the version string reported on success.

mod extract;
mod github;

pub use extract::extract_binary;
pub use github::{GitHubAsset, GitHubRelease, find_asset, latest_release};

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncWriteExt;

use crate::detect::HostProfile;
use crate::engine::Engine;
use crate::error::InstallError;
use crate::layout::Layout;
use crate::output;

const DOWNLOAD_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Download and install one engine binary into the core directory.
pub async fn fetch_engine(
    engine: &Engine,
    profile: &HostProfile,
    layout: &Layout,
) -> Result<PathBuf, InstallError> {
    output::info(&format!("resolving latest {} release", engine.name));
    let release = latest_release(engine.repo).await?;

    let arch = profile.arch.token();
    let asset = find_asset(&release, arch).ok_or_else(|| InstallError::DownloadLinkNotFound {
        engine: engine.name.to_string(),
        arch: arch.to_string(),
    })?;

    let archive_path = layout.scratch_dir.join(&asset.name);
    download(engine, asset, &archive_path).await?;

    let archive = archive_path.clone();
    let core_dir = layout.core_dir.clone();
    let name = engine.name;
    let binary = tokio::task::spawn_blocking(move || extract_binary(&archive, name, &core_dir))
        .await
        .map_err(|e| InstallError::ExtractionFailed {
            engine: name.to_string(),
            reason: format!("extraction task failed: {e}"),
        })??;

    output::success(&format!(
        "{} {} installed to {}",
        engine.name,
        release.tag_name,
        binary.display()
    ));
    Ok(binary)
}

fn download_failed(engine: &Engine, reason: impl ToString) -> InstallError {
    InstallError::DownloadFailed {
        engine: engine.name.to_string(),
        reason: reason.to_string(),
    }
}

/// Stream the asset into the scratch directory with a byte-progress bar.
async fn download(engine: &Engine, asset: &GitHubAsset, dest: &Path) -> Result<(), InstallError> {
    let client = reqwest::Client::builder()
        .connect_timeout(DOWNLOAD_CONNECT_TIMEOUT)
        .user_agent(crate::USER_AGENT)
        .build()?;

    let response = client
        .get(&asset.browser_download_url)
        .send()
        .await
        .map_err(|e| download_failed(engine, e))?;
    if !response.status().is_success() {
        return Err(download_failed(
            engine,
            format!("HTTP {}", response.status()),
        ));
    }

    let pb = ProgressBar::new(asset.size);
    if let Ok(style) =
        ProgressStyle::default_bar().template("   [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
    {
        pb.set_style(style.progress_chars("█▓░"));
    }
    pb.set_message(engine.name);

    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| download_failed(engine, e))?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| download_failed(engine, e))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| download_failed(engine, e))?;
        pb.inc(chunk.len() as u64);
    }
    file.flush().await.map_err(|e| download_failed(engine, e))?;
    pb.finish_and_clear();

    log::debug!("downloaded {} to {}", asset.name, dest.display());
    Ok(())
}
