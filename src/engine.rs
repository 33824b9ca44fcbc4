//! The two proxy cores managed by this provisioner.

#[derive(Debug, Clone, Copy)]
pub struct Engine {
    /// Binary name; also the token expected in release-asset names.
    pub name: &'static str,
    /// GitHub `owner/name` queried for releases.
    pub repo: &'static str,
    /// Systemd unit name (without the `.service` suffix).
    pub service: &'static str,
    /// Config file under the layout's `config/` directory. Written later by
    /// the external menu tool, not by this flow.
    pub config: &'static str,
    pub description: &'static str,
}

pub const ENGINES: [Engine; 2] = [
    Engine {
        name: "xray",
        repo: "XTLS/Xray-core",
        service: "xray-agent",
        config: "xray.json",
        description: "Xray-core proxy service",
    },
    Engine {
        name: "sing-box",
        repo: "SagerNet/sing-box",
        service: "sing-box-agent",
        config: "sing-box.json",
        description: "sing-box proxy service",
    },
];
