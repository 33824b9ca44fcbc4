//! RHEL-family provisioning: dnf/yum package install, firewalld, firewall-cmd.

use async_trait::async_trait;

use crate::detect::HostProfile;
use crate::error::InstallError;
use crate::firewall::{OPEN_PORTS, PROTOCOLS, PortSpec};
use crate::output;

use super::{DistroStrategy, run_tool, stderr_of};

/// Fixed package set. firewalld appears only on the dnf branch; the yum
/// branch never enables it.
const DNF_PACKAGES: [&str; 8] = [
    "curl", "wget", "tar", "unzip", "socat", "jq", "crontabs", "firewalld",
];
const YUM_PACKAGES: [&str; 7] = ["curl", "wget", "tar", "unzip", "socat", "jq", "crontabs"];

pub struct RhelStrategy {
    vendor: String,
    version: u32,
}

impl RhelStrategy {
    pub fn new(profile: &HostProfile) -> Self {
        Self {
            vendor: profile.os_id.clone(),
            version: profile.version,
        }
    }

    /// OpenCloudOS hosts take the dnf path with the EPEL side-repository;
    /// every other RHEL-family vendor goes through plain yum.
    fn use_dnf(&self) -> bool {
        self.vendor == "opencloudos"
    }

    pub(crate) fn epel_url(version: u32) -> String {
        format!("https://dl.fedoraproject.org/pub/epel/epel-release-latest-{version}.noarch.rpm")
    }

    async fn ensure_epel(&self) -> Result<(), InstallError> {
        let listed = run_tool("dnf", &["repolist"])
            .await
            .map_err(|e| InstallError::PackageManager(format!("failed to execute dnf: {e}")))?;
        if listed.status.success()
            && String::from_utf8_lossy(&listed.stdout)
                .to_ascii_lowercase()
                .contains("epel")
        {
            log::debug!("epel repository already enabled");
            return Ok(());
        }
        output::info("enabling EPEL repository");
        let url = Self::epel_url(self.version);
        pkg_checked("dnf", &["install", "-y", &url]).await
    }
}

async fn pkg_checked(program: &str, args: &[&str]) -> Result<(), InstallError> {
    let output = run_tool(program, args)
        .await
        .map_err(|e| InstallError::PackageManager(format!("failed to execute {program}: {e}")))?;
    if !output.status.success() {
        return Err(InstallError::PackageManager(format!(
            "{program} {} failed: {}",
            args.join(" "),
            stderr_of(&output)
        )));
    }
    Ok(())
}

async fn firewall_checked(args: &[&str]) -> Result<(), InstallError> {
    let output = run_tool("firewall-cmd", args).await.map_err(|e| {
        InstallError::FirewallFailed(format!("failed to execute firewall-cmd: {e}"))
    })?;
    if !output.status.success() {
        return Err(InstallError::FirewallFailed(format!(
            "firewall-cmd {} failed: {}",
            args.join(" "),
            stderr_of(&output)
        )));
    }
    Ok(())
}

pub(crate) fn add_port_arg(spec: PortSpec, proto: &str) -> String {
    format!("--add-port={}/{}", spec.dashed(), proto)
}

#[async_trait]
impl DistroStrategy for RhelStrategy {
    async fn install_packages(&self) -> Result<(), InstallError> {
        if self.use_dnf() {
            self.ensure_epel().await?;
            pkg_checked("dnf", &["makecache"]).await?;
            let mut args = vec!["install", "-y"];
            args.extend(DNF_PACKAGES);
            pkg_checked("dnf", &args).await
        } else {
            let mut args = vec!["install", "-y"];
            args.extend(YUM_PACKAGES);
            pkg_checked("yum", &args).await
        }
    }

    async fn enable_firewall(&self) -> Result<(), InstallError> {
        if !self.use_dnf() {
            return Ok(());
        }
        let output = run_tool("systemctl", &["enable", "--now", "firewalld"])
            .await
            .map_err(|e| {
                InstallError::FirewallFailed(format!("failed to execute systemctl: {e}"))
            })?;
        if !output.status.success() {
            return Err(InstallError::FirewallFailed(format!(
                "could not enable firewalld: {}",
                stderr_of(&output)
            )));
        }
        Ok(())
    }

    async fn open_firewall_ports(&self) -> Result<(), InstallError> {
        for spec in OPEN_PORTS {
            for proto in PROTOCOLS {
                let arg = add_port_arg(spec, proto);
                firewall_checked(&["--permanent", &arg]).await?;
            }
        }
        firewall_checked(&["--reload"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{Arch, OsFamily};

    fn profile(os_id: &str, version: u32) -> HostProfile {
        HostProfile {
            family: OsFamily::Rhel,
            version,
            os_id: os_id.to_string(),
            arch: Arch::Amd64,
        }
    }

    #[test]
    fn opencloudos_takes_the_dnf_path() {
        assert!(RhelStrategy::new(&profile("opencloudos", 9)).use_dnf());
        assert!(!RhelStrategy::new(&profile("centos", 8)).use_dnf());
        assert!(!RhelStrategy::new(&profile("rocky", 9)).use_dnf());
    }

    #[test]
    fn epel_url_carries_major_version() {
        assert_eq!(
            RhelStrategy::epel_url(9),
            "https://dl.fedoraproject.org/pub/epel/epel-release-latest-9.noarch.rpm"
        );
    }

    #[test]
    fn add_port_arg_renders_single_and_range() {
        assert_eq!(add_port_arg(PortSpec::Single(443), "tcp"), "--add-port=443/tcp");
        assert_eq!(
            add_port_arg(PortSpec::Range(30000, 60000), "udp"),
            "--add-port=30000-60000/udp"
        );
    }

    #[test]
    fn package_lists_cover_required_commands() {
        for cmd in super::super::REQUIRED_COMMANDS {
            assert!(DNF_PACKAGES.contains(&cmd), "dnf list missing {cmd}");
            assert!(YUM_PACKAGES.contains(&cmd), "yum list missing {cmd}");
        }
    }
}
