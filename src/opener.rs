//! src/opener.rs
// Opens files and folders with the platform's default application.

use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{anyhow, Context, Result};

fn opener_command(path: &Path) -> Result<Command> {
    let mut cmd = if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        cmd
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        let program = ["xdg-open", "gio", "wslview"]
            .into_iter()
            .find(|p| which::which(p).is_ok())
            .ok_or_else(|| anyhow!("找不到可用的開啟程式（xdg-open / gio / wslview）"))?;
        let mut cmd = Command::new(program);
        if program == "gio" {
            cmd.arg("open");
        }
        cmd
    };
    cmd.arg(path);
    Ok(cmd)
}

/// Launch the default application for `path` without waiting for it.
pub fn open_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(crate::errors::RoundtableError::MissingPath(path.to_path_buf()).into());
    }
    let mut cmd = opener_command(path)?;
    log::debug!("開啟 {}: {:?}", path.display(), cmd);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("無法開啟 {}", path.display()))?;
    Ok(())
}
