//! Host detection: OS family, major version, architecture.
//!
//! The profile is derived once at startup from `/etc/os-release` (with a
//! legacy `/etc/redhat-release` fallback) and passed by reference into every
//! later step. Unsupported vendors, versions below the documented minimums,
//! and unknown machine architectures all terminate the run.

use std::fmt;
use std::fs;

use crate::error::InstallError;
use crate::output;

const OS_RELEASE: &str = "/etc/os-release";
const REDHAT_RELEASE: &str = "/etc/redhat-release";

/// Coarse OS family driving package-manager and firewall-tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Rhel,
    Ubuntu,
    Debian,
}

impl OsFamily {
    fn minimum_version(self) -> u32 {
        match self {
            OsFamily::Rhel => 7,
            OsFamily::Ubuntu => 18,
            OsFamily::Debian => 10,
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OsFamily::Rhel => "rhel",
            OsFamily::Ubuntu => "ubuntu",
            OsFamily::Debian => "debian",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Amd64,
    Arm64,
}

impl Arch {
    /// Token used in release-asset names.
    pub fn token(self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Immutable host profile, populated before any OS-conditional step runs.
#[derive(Debug, Clone)]
pub struct HostProfile {
    pub family: OsFamily,
    pub version: u32,
    pub os_id: String,
    pub arch: Arch,
}

/// Detect the host profile from the release-metadata files.
pub fn detect() -> Result<HostProfile, InstallError> {
    let (os_id, version_id) = read_release_metadata()?;
    let (family, version) = resolve(&os_id, &version_id)?;
    let arch = map_arch(std::env::consts::ARCH)?;
    output::info(&format!(
        "detected {os_id} {version_id} ({family} family, version {version}), architecture {arch}"
    ));
    Ok(HostProfile {
        family,
        version,
        os_id,
        arch,
    })
}

fn read_release_metadata() -> Result<(String, String), InstallError> {
    if let Ok(content) = fs::read_to_string(OS_RELEASE) {
        return parse_os_release(&content)
            .ok_or_else(|| InstallError::UnsupportedOs(format!("malformed {OS_RELEASE}")));
    }
    if let Ok(content) = fs::read_to_string(REDHAT_RELEASE) {
        output::info(&format!("{OS_RELEASE} absent, using {REDHAT_RELEASE}"));
        return parse_redhat_release(&content)
            .ok_or_else(|| InstallError::UnsupportedOs(format!("malformed {REDHAT_RELEASE}")));
    }
    Err(InstallError::UnsupportedOs(
        "no OS release metadata found".to_string(),
    ))
}

/// Extract `(ID, VERSION_ID)` from os-release content, unquoted and lowercased.
pub fn parse_os_release(content: &str) -> Option<(String, String)> {
    let mut id = None;
    let mut version = None;
    for line in content.lines() {
        if let Some(value) = line.strip_prefix("ID=") {
            id = Some(value.trim().trim_matches('"').to_ascii_lowercase());
        } else if let Some(value) = line.strip_prefix("VERSION_ID=") {
            version = Some(value.trim().trim_matches('"').to_string());
        }
    }
    Some((id?, version?))
}

/// Legacy fallback: `"CentOS Linux release 7.9.2009 (Core)"` and friends.
pub fn parse_redhat_release(content: &str) -> Option<(String, String)> {
    let lower = content.to_ascii_lowercase();
    let id = if lower.contains("centos") {
        "centos"
    } else if lower.contains("red hat") {
        "rhel"
    } else {
        lower.split_whitespace().next()?
    };
    let version = lower
        .split_whitespace()
        .find(|tok| tok.chars().next().is_some_and(|c| c.is_ascii_digit()))?;
    Some((id.to_string(), version.to_string()))
}

/// Normalize a `(os_id, version_id)` pair into `(family, major version)`.
pub fn resolve(os_id: &str, version_id: &str) -> Result<(OsFamily, u32), InstallError> {
    let version = major_version(version_id);
    let family = match os_id {
        "centos" | "rhel" | "almalinux" | "rocky" => OsFamily::Rhel,
        // OpenCloudOS tracks RHEL by major version; its 8.x/9.x lines behave
        // as RHEL 8/9 here.
        "opencloudos" => OsFamily::Rhel,
        "ubuntu" => OsFamily::Ubuntu,
        "debian" => OsFamily::Debian,
        other => return Err(InstallError::UnsupportedOs(other.to_string())),
    };
    let minimum = family.minimum_version();
    if version < minimum {
        return Err(InstallError::UnsupportedVersion {
            os: os_id.to_string(),
            version,
            minimum,
        });
    }
    Ok((family, version))
}

/// Integer major version: truncate at the first period.
pub fn major_version(version_id: &str) -> u32 {
    version_id
        .split('.')
        .next()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

/// Map machine architecture strings; total over exactly two accepted inputs.
pub fn map_arch(machine: &str) -> Result<Arch, InstallError> {
    match machine {
        "x86_64" => Ok(Arch::Amd64),
        "aarch64" => Ok(Arch::Arm64),
        other => Err(InstallError::UnsupportedArch(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_pairs_resolve() {
        let cases = [
            ("opencloudos", "9.2", OsFamily::Rhel, 9),
            ("centos", "8.5", OsFamily::Rhel, 8),
            ("centos", "7.9", OsFamily::Rhel, 7),
            ("rhel", "9.3", OsFamily::Rhel, 9),
            ("almalinux", "9.4", OsFamily::Rhel, 9),
            ("rocky", "8.9", OsFamily::Rhel, 8),
            ("ubuntu", "22.04", OsFamily::Ubuntu, 22),
            ("ubuntu", "18.04", OsFamily::Ubuntu, 18),
            ("debian", "12", OsFamily::Debian, 12),
            ("debian", "10", OsFamily::Debian, 10),
        ];
        for (id, version_id, family, major) in cases {
            let (got_family, got_major) = resolve(id, version_id).unwrap();
            assert_eq!(got_family, family, "{id} {version_id}");
            assert_eq!(got_major, major, "{id} {version_id}");
        }
    }

    #[test]
    fn unsupported_vendor_is_fatal() {
        assert!(matches!(
            resolve("fedora", "38"),
            Err(InstallError::UnsupportedOs(_))
        ));
        assert!(matches!(
            resolve("arch", "rolling"),
            Err(InstallError::UnsupportedOs(_))
        ));
    }

    #[test]
    fn below_minimum_version_is_fatal() {
        for (id, version_id) in [("debian", "9"), ("ubuntu", "16.04"), ("centos", "6.10")] {
            assert!(
                matches!(
                    resolve(id, version_id),
                    Err(InstallError::UnsupportedVersion { .. })
                ),
                "{id} {version_id}"
            );
        }
    }

    #[test]
    fn arch_mapping_is_total_over_two_inputs() {
        assert_eq!(map_arch("x86_64").unwrap(), Arch::Amd64);
        assert_eq!(map_arch("aarch64").unwrap(), Arch::Arm64);
        assert!(matches!(
            map_arch("riscv64"),
            Err(InstallError::UnsupportedArch(_))
        ));
        assert!(matches!(
            map_arch("armv7l"),
            Err(InstallError::UnsupportedArch(_))
        ));
    }

    #[test]
    fn os_release_parsing_strips_quotes() {
        let content = r#"NAME="Ubuntu"
VERSION="22.04.4 LTS (Jammy Jellyfish)"
ID=ubuntu
ID_LIKE=debian
VERSION_ID="22.04"
"#;
        let (id, version) = parse_os_release(content).unwrap();
        assert_eq!(id, "ubuntu");
        assert_eq!(version, "22.04");
    }

    #[test]
    fn os_release_missing_fields_is_none() {
        assert!(parse_os_release("NAME=thing\n").is_none());
    }

    #[test]
    fn redhat_release_fallback() {
        let (id, version) = parse_redhat_release("CentOS Linux release 7.9.2009 (Core)").unwrap();
        assert_eq!(id, "centos");
        assert_eq!(major_version(&version), 7);

        let (id, version) =
            parse_redhat_release("Red Hat Enterprise Linux release 8.6 (Ootpa)").unwrap();
        assert_eq!(id, "rhel");
        assert_eq!(major_version(&version), 8);
    }

    #[test]
    fn major_version_truncates_at_first_period() {
        assert_eq!(major_version("22.04"), 22);
        assert_eq!(major_version("9.2"), 9);
        assert_eq!(major_version("12"), 12);
        assert_eq!(major_version("garbage"), 0);
    }
}
