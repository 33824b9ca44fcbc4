mod acme;
mod cli;
mod detect;
mod distro;
mod engine;
mod error;
mod fetch;
mod firewall;
mod layout;
mod menu;
mod output;
mod preflight;
mod provision;
mod service;

use log::error;

/// User-Agent sent on every outbound HTTP request.
pub const USER_AGENT: &str = "vasma-install/0.1";

fn main() {
    // Initialize logger with custom format for supplementary diagnostics;
    // user-facing status goes through the output module.
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();

    cli::Cli::parse_args();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("FATAL: Failed to create Tokio runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(provision::run()) {
        error!("{e:#}");
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
