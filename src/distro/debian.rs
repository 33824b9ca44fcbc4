//! Debian-family provisioning: apt-get package install, ufw.

use async_trait::async_trait;

use crate::error::InstallError;
use crate::firewall::{OPEN_PORTS, PROTOCOLS, PortSpec};
use crate::output;

use super::{DistroStrategy, run_tool, stderr_of};

const APT_PACKAGES: [&str; 8] = ["curl", "wget", "tar", "unzip", "socat", "jq", "cron", "ufw"];

pub struct DebianStrategy;

impl DebianStrategy {
    pub fn new() -> Self {
        Self
    }
}

async fn apt_checked(args: &[&str]) -> Result<(), InstallError> {
    let output = tokio::process::Command::new("apt-get")
        .env("DEBIAN_FRONTEND", "noninteractive")
        .args(args)
        .output()
        .await
        .map_err(|e| InstallError::PackageManager(format!("failed to execute apt-get: {e}")))?;
    if !output.status.success() {
        return Err(InstallError::PackageManager(format!(
            "apt-get {} failed: {}",
            args.join(" "),
            stderr_of(&output)
        )));
    }
    Ok(())
}

async fn ufw_checked(args: &[&str]) -> Result<(), InstallError> {
    let output = run_tool("ufw", args)
        .await
        .map_err(|e| InstallError::FirewallFailed(format!("failed to execute ufw: {e}")))?;
    if !output.status.success() {
        return Err(InstallError::FirewallFailed(format!(
            "ufw {} failed: {}",
            args.join(" "),
            stderr_of(&output)
        )));
    }
    Ok(())
}

/// ufw rule form: `30000:60000/udp`.
pub(crate) fn allow_rule(spec: PortSpec, proto: &str) -> String {
    format!("{}/{}", spec.coloned(), proto)
}

#[async_trait]
impl DistroStrategy for DebianStrategy {
    async fn install_packages(&self) -> Result<(), InstallError> {
        apt_checked(&["update"]).await?;
        let mut args = vec!["install", "-y"];
        args.extend(APT_PACKAGES);
        apt_checked(&args).await
    }

    /// The one tolerated failure in the whole flow: a host without a usable
    /// ufw still gets provisioned, with a warning.
    async fn enable_firewall(&self) -> Result<(), InstallError> {
        match run_tool("ufw", &["--force", "enable"]).await {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => {
                output::warn(&format!(
                    "ufw enable failed ({}); continuing",
                    stderr_of(&out)
                ));
                Ok(())
            }
            Err(e) => {
                output::warn(&format!("ufw enable failed ({e}); continuing"));
                Ok(())
            }
        }
    }

    async fn open_firewall_ports(&self) -> Result<(), InstallError> {
        for spec in OPEN_PORTS {
            for proto in PROTOCOLS {
                let rule = allow_rule(spec, proto);
                ufw_checked(&["allow", &rule]).await?;
            }
        }
        ufw_checked(&["reload"]).await
    }
}
