//! Launching applications, files and URLs with the platform opener.

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, info};

/// Filesystem launch and browser navigation capability.
pub trait Launcher: Send + Sync {
    /// Open a file or application by path.
    fn launch_path(&self, path: &str) -> anyhow::Result<()>;

    /// Open a URL in the default browser.
    fn open_url(&self, url: &str) -> anyhow::Result<()>;

    /// Best-effort launch of something only known by name.
    fn launch_by_name(&self, name: &str) -> anyhow::Result<()>;
}

/// Launcher backed by `cmd /C start`, `open` or `xdg-open`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch_path(&self, path: &str) -> anyhow::Result<()> {
        open_with_default(path)
    }

    fn open_url(&self, url: &str) -> anyhow::Result<()> {
        open_with_default(url)
    }

    fn launch_by_name(&self, name: &str) -> anyhow::Result<()> {
        let name = name.trim();
        if name.is_empty() {
            debug!("Nothing to launch");
            return Ok(());
        }

        if cfg!(target_os = "windows") {
            // `start` resolves App Paths registrations as well as PATH.
            return spawn_detached(Command::new("cmd").args(["/C", "start", "", name]));
        }

        if let Ok(binary) = which::which(name) {
            info!(binary = %binary.display(), "Launching binary");
            return spawn_detached(&mut Command::new(binary));
        }

        if cfg!(target_os = "macos") {
            return spawn_detached(Command::new("open").args(["-a", name]));
        }

        anyhow::bail!("No application named '{}' was found", name)
    }
}

fn open_with_default(target: &str) -> anyhow::Result<()> {
    info!(target = %target, "Opening with system handler");
    if cfg!(target_os = "windows") {
        spawn_detached(Command::new("cmd").args(["/C", "start", "", target]))
    } else if cfg!(target_os = "macos") {
        spawn_detached(Command::new("open").arg(target))
    } else {
        spawn_detached(Command::new("xdg-open").arg(target))
    }
}

/// Spawn without waiting; the child outlives this call.
fn spawn_detached(cmd: &mut Command) -> anyhow::Result<()> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| anyhow::anyhow!("Failed to launch {:?}: {}", cmd.get_program(), e))?;
    Ok(())
}

/// Chromium-family binaries that support `--app=<url>`.
const CHROME_BINARIES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
];

/// Open the front end in a chromeless Chrome window when possible, falling
/// back to the default browser.
pub fn open_app_window(url: &str) -> anyhow::Result<()> {
    let app_flag = format!("--app={}", url);

    if cfg!(target_os = "macos") && Path::new("/Applications/Google Chrome.app").exists() {
        return spawn_detached(Command::new("open").args([
            "-a",
            "Google Chrome",
            "--args",
            &app_flag,
        ]));
    }

    for candidate in CHROME_BINARIES {
        if let Ok(binary) = which::which(candidate) {
            info!(browser = %binary.display(), "Opening UI in app mode");
            return spawn_detached(Command::new(binary).arg(&app_flag));
        }
    }

    open_with_default(url)
}
