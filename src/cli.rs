//! CLI argument parsing for vasma-install

use clap::Parser;

/// Command-line arguments for vasma-install.
///
/// The provisioner takes no flags: one invocation runs the whole flow from
/// preflight through cleanup. Only the generated `--help`/`--version` exist.
#[derive(Parser, Clone)]
#[command(name = "vasma-install")]
#[command(version, about = "Provision Xray-core and sing-box as managed systemd services")]
pub struct Cli {}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
