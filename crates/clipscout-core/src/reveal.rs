use std::path::Path;

use tokio::process::Command;

use crate::error::{ClipscoutError, Result};

#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(target_os = "windows")]
const OPENER: &str = "explorer";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const OPENER: &str = "xdg-open";

/// Open a directory in the host file browser. Frontends treat this step as
/// best-effort after a job has finished.
pub async fn open_in_file_browser(dir: &Path) -> Result<()> {
    let status = Command::new(OPENER).arg(dir).status().await?;

    if !status.success() {
        return Err(ClipscoutError::Io(std::io::Error::other(format!(
            "{OPENER} exited with {status} for {}",
            dir.display()
        ))));
    }

    Ok(())
}
