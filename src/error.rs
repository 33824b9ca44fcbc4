//! Fatal-error taxonomy for the provisioning flow.
//!
//! Every failure below is terminal: the orchestrator performs a single
//! top-level match that prints one ERROR line and exits nonzero. Nothing is
//! retried, and no step runs compensating cleanup for an earlier one.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("this installer must run as root")]
    NotRoot,

    #[error("network unreachable: failed to reach {0}")]
    NetworkUnreachable(String),

    #[error("unsupported operating system: {0}")]
    UnsupportedOs(String),

    #[error("unsupported {os} version {version} (minimum supported: {minimum})")]
    UnsupportedVersion {
        os: String,
        version: u32,
        minimum: u32,
    },

    #[error("unsupported architecture: {0}")]
    UnsupportedArch(String),

    #[error("package manager failed: {0}")]
    PackageManager(String),

    #[error("required command not found after install: {0}")]
    MissingCommand(String),

    #[error("{engine}: download link not found (no linux/{arch} .tar.gz asset)")]
    DownloadLinkNotFound { engine: String, arch: String },

    #[error("{engine}: download failed: {reason}")]
    DownloadFailed { engine: String, reason: String },

    #[error("{engine}: extraction failed: {reason}")]
    ExtractionFailed { engine: String, reason: String },

    #[error("service activation failed: {0}")]
    ServiceActivationFailed(String),

    #[error("firewall configuration failed: {0}")]
    FirewallFailed(String),

    #[error("failed to fetch management script: {0}")]
    RemoteScriptFetchFailed(String),

    #[error("acme.sh installation failed: {0}")]
    AcmeInstallFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
