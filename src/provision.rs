//! The linear provisioning flow.
//!
//! One fixed path with no branching back: the first failing step terminates
//! the run with nothing retried or rolled back. The scratch directory is
//! removed only after every prior step succeeded; a failure partway leaves
//! the host in a mixed state that a re-run repairs.

use anyhow::{Context, Result};

use crate::distro::DistroStrategy;
use crate::engine::ENGINES;
use crate::layout::Layout;
use crate::{acme, detect, distro, fetch, menu, output, preflight, service};

pub async fn run() -> Result<()> {
    output::info("starting proxy server provisioning");

    preflight::check_root().context("preflight failed")?;
    preflight::check_network().await.context("preflight failed")?;

    let profile = detect::detect().context("system detection failed")?;

    let layout = Layout::system();
    layout
        .prepare()
        .context("failed to prepare directory layout")?;
    output::info(&format!("work root ready at {}", layout.work_root.display()));

    let strategy = distro::strategy_for(&profile);

    output::info("installing system packages");
    strategy
        .install_packages()
        .await
        .context("dependency installation failed")?;
    strategy
        .enable_firewall()
        .await
        .context("firewall enablement failed")?;
    distro::verify_commands().context("post-install verification failed")?;
    output::success("system packages installed");

    output::info("opening firewall ports");
    strategy
        .open_firewall_ports()
        .await
        .context("firewall configuration failed")?;
    output::success("firewall ports open");

    acme::install(&layout)
        .await
        .context("ACME client installation failed")?;

    for engine in &ENGINES {
        fetch::fetch_engine(engine, &profile, &layout)
            .await
            .with_context(|| format!("failed to fetch {}", engine.name))?;
    }

    for engine in &ENGINES {
        service::install_and_start(engine, &layout)
            .await
            .with_context(|| format!("failed to install service {}", engine.service))?;
    }

    menu::install(&layout)
        .await
        .context("menu installation failed")?;

    layout
        .cleanup()
        .context("failed to remove scratch directory")?;
    output::success("provisioning complete");
    Ok(())
}
