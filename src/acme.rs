//! acme.sh installation and default CA selection.
//!
//! Certificate issuance itself is driven later from the menu tool; this step
//! only guarantees the client exists and points at Let's Encrypt.

use std::path::{Path, PathBuf};

use crate::error::InstallError;
use crate::layout::Layout;
use crate::output;

const ACME_INSTALL_URL: &str = "https://get.acme.sh";
const ACME_HOME: &str = "/root/.acme.sh";
const DEFAULT_CA: &str = "letsencrypt";

fn acme_bin() -> PathBuf {
    Path::new(ACME_HOME).join("acme.sh")
}

pub fn is_installed() -> bool {
    acme_bin().exists() || which::which("acme.sh").is_ok()
}

/// Download the fixed install script to scratch and run it with `sh`.
async fn run_install_script(layout: &Layout) -> Result<(), InstallError> {
    let client = reqwest::Client::builder()
        .user_agent(crate::USER_AGENT)
        .build()?;
    let response = client
        .get(ACME_INSTALL_URL)
        .send()
        .await
        .map_err(|e| InstallError::AcmeInstallFailed(e.to_string()))?;
    if !response.status().is_success() {
        return Err(InstallError::AcmeInstallFailed(format!(
            "HTTP {} from {}",
            response.status(),
            ACME_INSTALL_URL
        )));
    }
    let body = response
        .bytes()
        .await
        .map_err(|e| InstallError::AcmeInstallFailed(e.to_string()))?;

    let script_path = layout.scratch_dir.join("acme-install.sh");
    tokio::fs::write(&script_path, &body).await?;

    let status = tokio::process::Command::new("sh")
        .arg(&script_path)
        .status()
        .await
        .map_err(|e| InstallError::AcmeInstallFailed(format!("failed to run installer: {e}")))?;
    if !status.success() {
        return Err(InstallError::AcmeInstallFailed(format!(
            "installer exited with {status}"
        )));
    }
    Ok(())
}

/// Idempotent: acme.sh stores the default CA in its own config.
async fn set_default_ca() -> Result<(), InstallError> {
    let bin = if acme_bin().exists() {
        acme_bin()
    } else {
        which::which("acme.sh").map_err(|_| {
            InstallError::AcmeInstallFailed("acme.sh not found after install".to_string())
        })?
    };

    let output = tokio::process::Command::new(bin)
        .args(["--set-default-ca", "--server", DEFAULT_CA])
        .output()
        .await
        .map_err(|e| InstallError::AcmeInstallFailed(format!("set-default-ca: {e}")))?;
    if !output.status.success() {
        return Err(InstallError::AcmeInstallFailed(format!(
            "set-default-ca failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}

pub async fn install(layout: &Layout) -> Result<(), InstallError> {
    if is_installed() {
        output::info("acme.sh already present");
    } else {
        output::info("installing acme.sh");
        run_install_script(layout).await?;
    }
    set_default_ca().await?;
    output::success(&format!("acme.sh ready (default CA: {DEFAULT_CA})"));
    Ok(())
}
