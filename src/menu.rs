//! Menu command installation: wrapper executable plus fetched management script.
//!
//! The wrapper on PATH only delegates; everything interactive lives in the
//! management script fetched into the work root's scripts directory.

use std::fs;
use std::path::Path;

use crate::error::InstallError;
use crate::layout::{Layout, WRAPPER_PATH};
use crate::output;

pub const MENU_SCRIPT_URL: &str =
    "https://raw.githubusercontent.com/vasma-proxy/vasma/main/menu.sh";

/// Fixed wrapper content: load and run the management script.
pub fn wrapper_script(scripts_dir: &Path) -> String {
    format!(
        "#!/bin/bash\nexec bash {}/menu.sh \"$@\"\n",
        scripts_dir.display()
    )
}

pub fn install_wrapper(layout: &Layout, wrapper_path: &Path) -> Result<(), InstallError> {
    fs::write(wrapper_path, wrapper_script(&layout.scripts_dir))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(wrapper_path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(wrapper_path, perms)?;
    }

    Ok(())
}

/// Fetch the current management script into `scripts/menu.sh`.
pub async fn fetch_menu_script(layout: &Layout) -> Result<(), InstallError> {
    let client = reqwest::Client::builder()
        .user_agent(crate::USER_AGENT)
        .build()?;
    let response = client
        .get(MENU_SCRIPT_URL)
        .send()
        .await
        .map_err(|e| InstallError::RemoteScriptFetchFailed(e.to_string()))?;
    if !response.status().is_success() {
        return Err(InstallError::RemoteScriptFetchFailed(format!(
            "HTTP {} from {}",
            response.status(),
            MENU_SCRIPT_URL
        )));
    }
    let body = response
        .bytes()
        .await
        .map_err(|e| InstallError::RemoteScriptFetchFailed(e.to_string()))?;
    fs::write(layout.scripts_dir.join("menu.sh"), &body)?;
    Ok(())
}

pub async fn install(layout: &Layout) -> Result<(), InstallError> {
    fetch_menu_script(layout).await?;
    install_wrapper(layout, Path::new(WRAPPER_PATH))?;
    output::success("menu command 'vasma' installed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapper_delegates_to_scripts_dir() {
        let script = wrapper_script(Path::new("/etc/vasma/scripts"));
        assert!(script.starts_with("#!/bin/bash\n"));
        assert!(script.contains("exec bash /etc/vasma/scripts/menu.sh \"$@\""));
    }

    #[test]
    fn wrapper_is_executable() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = Layout::rooted(
            &tmp.path().join("vasma"),
            &tmp.path().join("scratch"),
            &tmp.path().join("units"),
        );
        layout.prepare().unwrap();
        let wrapper = tmp.path().join("vasma-wrapper");
        install_wrapper(&layout, &wrapper).unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&wrapper).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }
}
