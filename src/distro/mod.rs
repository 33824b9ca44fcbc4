//! Per-family provisioning strategies, selected once after detection.
//!
//! Each family bundles the package-manager path, the firewall-daemon
//! enablement, and the port-opening tool behind one trait so the rest of the
//! flow never branches on OS strings again.

mod debian;
mod rhel;

use async_trait::async_trait;

pub use debian::DebianStrategy;
pub use rhel::RhelStrategy;

use crate::detect::{HostProfile, OsFamily};
use crate::error::InstallError;

/// Commands that must resolve on PATH once package installation finished.
pub const REQUIRED_COMMANDS: [&str; 6] = ["curl", "wget", "tar", "unzip", "socat", "jq"];

#[async_trait]
pub trait DistroStrategy: Send + Sync {
    /// Install the fixed package set for this family.
    async fn install_packages(&self) -> Result<(), InstallError>;

    /// Bring up the family's firewall daemon/front-end.
    async fn enable_firewall(&self) -> Result<(), InstallError>;

    /// Open the fixed port set for TCP and UDP, then reload the ruleset.
    async fn open_firewall_ports(&self) -> Result<(), InstallError>;
}

pub fn strategy_for(profile: &HostProfile) -> Box<dyn DistroStrategy> {
    match profile.family {
        OsFamily::Rhel => Box::new(RhelStrategy::new(profile)),
        OsFamily::Ubuntu | OsFamily::Debian => Box::new(DebianStrategy::new()),
    }
}

/// Post-install verification: each required command must resolve on PATH.
pub fn verify_commands() -> Result<(), InstallError> {
    for cmd in REQUIRED_COMMANDS {
        which::which(cmd).map_err(|_| InstallError::MissingCommand(cmd.to_string()))?;
    }
    Ok(())
}

/// Run a system tool to completion, capturing its output.
pub(crate) async fn run_tool(
    program: &str,
    args: &[&str],
) -> std::io::Result<std::process::Output> {
    tokio::process::Command::new(program)
        .args(args)
        .output()
        .await
}

pub(crate) fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}
