//! Systemd unit rendering and activation for the proxy engines.
//!
//! Units are rendered from a fixed template and written atomically. A single
//! `systemctl enable --now` brings each unit up, so the persisted enable
//! state and the running process are one observable post-condition. Restart
//! policy lives in the unit and is delegated to systemd.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::engine::Engine;
use crate::error::InstallError;
use crate::layout::Layout;
use crate::output;

/// Render the unit for one engine against the layout paths.
pub fn render_unit(engine: &Engine, layout: &Layout) -> String {
    format!(
        r#"[Unit]
Description={description}
After=network.target

[Service]
Type=simple
WorkingDirectory={workdir}
ExecStart={binary} run -c {config}
Restart=on-failure
RestartSec=5

StandardOutput=journal
StandardError=journal
SyslogIdentifier={service}

[Install]
WantedBy=multi-user.target
"#,
        description = engine.description,
        workdir = layout.work_root.display(),
        binary = layout.core_dir.join(engine.name).display(),
        config = layout.config_dir.join(engine.config).display(),
        service = engine.service,
    )
}

/// Write file atomically to prevent a half-written unit on crash.
fn write_file_atomic(path: &Path, content: &str) -> Result<(), InstallError> {
    let temp_path = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Render and write the unit file; idempotent overwrite on re-runs.
pub fn install_unit(engine: &Engine, layout: &Layout) -> Result<PathBuf, InstallError> {
    let unit_path = layout.unit_dir.join(format!("{}.service", engine.service));
    if let Some(parent) = unit_path.parent() {
        fs::create_dir_all(parent)?;
    }
    write_file_atomic(&unit_path, &render_unit(engine, layout))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&unit_path)?.permissions();
        perms.set_mode(0o644);
        fs::set_permissions(&unit_path, perms)?;
    }

    Ok(unit_path)
}

async fn systemctl_checked(args: &[&str], context: &str) -> Result<(), InstallError> {
    let output = tokio::process::Command::new("systemctl")
        .args(args)
        .output()
        .await
        .map_err(|e| InstallError::ServiceActivationFailed(format!("{context}: {e}")))?;
    if !output.status.success() {
        return Err(InstallError::ServiceActivationFailed(format!(
            "{context}: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}

/// Reload the service manager's unit cache.
pub async fn reload_daemon() -> Result<(), InstallError> {
    systemctl_checked(&["daemon-reload"], "daemon-reload").await
}

/// Enable and start in one call; failure to reach the active state is fatal.
pub async fn enable_and_start(service: &str) -> Result<(), InstallError> {
    let unit = format!("{service}.service");
    systemctl_checked(&["enable", "--now", &unit], service).await
}

/// Full per-engine service installation.
pub async fn install_and_start(engine: &Engine, layout: &Layout) -> Result<(), InstallError> {
    let unit_path = install_unit(engine, layout)?;
    log::debug!("wrote unit {}", unit_path.display());
    reload_daemon().await?;
    enable_and_start(engine.service).await?;
    output::success(&format!("service {} enabled and started", engine.service));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ENGINES;

    fn test_layout(root: &Path) -> Layout {
        Layout::rooted(
            &root.join("vasma"),
            &root.join("scratch"),
            &root.join("units"),
        )
    }

    #[test]
    fn unit_interpolates_layout_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = test_layout(tmp.path());
        let xray = &ENGINES[0];
        let unit = render_unit(xray, &layout);

        let binary = layout.core_dir.join("xray");
        let config = layout.config_dir.join("xray.json");
        assert!(unit.contains(&format!(
            "ExecStart={} run -c {}",
            binary.display(),
            config.display()
        )));
        assert!(unit.contains(&format!("WorkingDirectory={}", layout.work_root.display())));
        assert!(unit.contains("Restart=on-failure"));
        assert!(unit.contains("RestartSec=5"));
        assert!(unit.contains("WantedBy=multi-user.target"));
    }

    #[test]
    fn each_engine_gets_its_own_unit_name() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = test_layout(tmp.path());
        for engine in &ENGINES {
            let path = install_unit(engine, &layout).unwrap();
            assert_eq!(
                path.file_name().unwrap().to_str().unwrap(),
                format!("{}.service", engine.service)
            );
        }
        assert!(layout.unit_dir.join("xray-agent.service").is_file());
        assert!(layout.unit_dir.join("sing-box-agent.service").is_file());
    }

    #[test]
    fn unit_write_is_idempotent_and_mode_0644() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = test_layout(tmp.path());
        let engine = &ENGINES[1];

        let first = install_unit(engine, &layout).unwrap();
        let second = install_unit(engine, &layout).unwrap();
        assert_eq!(first, second);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&second).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o644);
        }
    }
}
