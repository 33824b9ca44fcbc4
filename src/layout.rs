//! Filesystem layout produced by the provisioner.
//!
//! A fixed directory set under the work root, a scratch area for downloads,
//! and the systemd unit directory. Directory creation is idempotent; the
//! scratch area is removed only once the whole flow has succeeded.

use std::fs;
use std::path::{Path, PathBuf};

pub const WORK_ROOT: &str = "/etc/vasma";
pub const SCRATCH_DIR: &str = "/tmp/vasma-install";
pub const UNIT_DIR: &str = "/etc/systemd/system";
pub const WRAPPER_PATH: &str = "/usr/local/bin/vasma";

#[derive(Debug, Clone)]
pub struct Layout {
    pub work_root: PathBuf,
    pub core_dir: PathBuf,
    pub config_dir: PathBuf,
    pub log_dir: PathBuf,
    pub scripts_dir: PathBuf,
    pub scratch_dir: PathBuf,
    pub unit_dir: PathBuf,
}

impl Layout {
    pub fn system() -> Self {
        Self::rooted(
            Path::new(WORK_ROOT),
            Path::new(SCRATCH_DIR),
            Path::new(UNIT_DIR),
        )
    }

    pub fn rooted(work_root: &Path, scratch_dir: &Path, unit_dir: &Path) -> Self {
        Self {
            work_root: work_root.to_path_buf(),
            core_dir: work_root.join("core"),
            config_dir: work_root.join("config"),
            log_dir: work_root.join("log"),
            scripts_dir: work_root.join("scripts"),
            scratch_dir: scratch_dir.to_path_buf(),
            unit_dir: unit_dir.to_path_buf(),
        }
    }

    /// Create every directory; safe to call again on a re-run.
    pub fn prepare(&self) -> std::io::Result<()> {
        for dir in [
            &self.core_dir,
            &self.config_dir,
            &self.log_dir,
            &self.scripts_dir,
            &self.scratch_dir,
        ] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Remove the scratch area. Called only once every prior step succeeded.
    pub fn cleanup(&self) -> std::io::Result<()> {
        if self.scratch_dir.exists() {
            fs::remove_dir_all(&self.scratch_dir)?;
        }
        Ok(())
    }
}
