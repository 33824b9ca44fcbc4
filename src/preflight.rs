//! Preflight: privilege check and network reachability probes.

use std::time::Duration;

use crate::error::InstallError;
use crate::output;

/// Endpoints the rest of the flow depends on; probed before any mutation.
const PROBE_URLS: [&str; 2] = ["https://api.github.com", "https://raw.githubusercontent.com"];

const PROBE_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub fn check_root() -> Result<(), InstallError> {
    if unsafe { libc::getuid() } != 0 {
        return Err(InstallError::NotRoot);
    }
    Ok(())
}

/// Probe each fixed endpoint; any transport failure aborts the run.
pub async fn check_network() -> Result<(), InstallError> {
    let client = reqwest::Client::builder()
        .connect_timeout(PROBE_CONNECT_TIMEOUT)
        .user_agent(crate::USER_AGENT)
        .build()?;

    for url in PROBE_URLS {
        match client.head(url).send().await {
            Ok(_) => log::debug!("reachability probe ok: {url}"),
            Err(e) => {
                log::debug!("reachability probe failed: {url}: {e}");
                return Err(InstallError::NetworkUnreachable(url.to_string()));
            }
        }
    }
    output::info("network reachability verified");
    Ok(())
}
