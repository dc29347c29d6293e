//! Config file IO: locating, reading, creating and opening the config file.
//!
//! The schema itself lives in [`procon_gardener_core::config`]. Files are
//! JSON unless their name ends in `.yaml` or `.yml`.
//!
//! # Errors
//! Everything here returns `anyhow::Error` with the offending path in the
//! message; the CLI logs it and stops.
use anyhow::{anyhow, Context, Result};
use procon_gardener_core::config::Config;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{error, info, warn};

pub const APP_NAME: &str = "procon-gardener";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// `~/.procon-gardener/config.json`.
pub fn default_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine the home directory"))?;
    Ok(home.join(format!(".{APP_NAME}")).join(CONFIG_FILE_NAME))
}

/// The explicit path if one was given, the default otherwise.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => default_config_path(),
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Replaces a leading `~` with the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Reads and parses the config file. Does not validate it.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow!(
                "Failed to read config file {:?}: {} (run `{APP_NAME} init` to create one)",
                path_ref,
                e
            ));
        }
    };

    let parsed = if is_yaml(path_ref) {
        serde_yaml::from_str::<Config>(&content)
            .map_err(|e| anyhow!("Failed to parse config YAML: {e}"))
    } else {
        serde_json::from_str::<Config>(&content)
            .map_err(|e| anyhow!("Failed to parse config JSON: {e}"))
    };
    let mut config = match parsed {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, config_path = ?path_ref, "Failed to parse config file");
            return Err(e);
        }
    };

    config.atcoder.repository_path = expand_home(&config.atcoder.repository_path);
    config.trace_loaded();
    Ok(config)
}

/// Tab-indented JSON, the same layout as the archive's sidecar files.
fn render_json(config: &Config) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    serde::Serialize::serialize(config, &mut ser).context("Failed to serialise config")?;
    let mut text = String::from_utf8(buf).context("Config JSON is not UTF-8")?;
    text.push('\n');
    Ok(text)
}

fn render(path: &Path, config: &Config) -> Result<String> {
    if is_yaml(path) {
        serde_yaml::to_string(config).context("Failed to serialise config")
    } else {
        render_json(config)
    }
}

#[cfg(unix)]
fn restrict_dir(dir: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o700))
        .with_context(|| format!("Failed to set permissions on {}", dir.display()))
}

#[cfg(not(unix))]
fn restrict_dir(_dir: &Path) -> Result<()> {
    Ok(())
}

/// Writes a blank config to `path`. An existing file is kept unless `force`
/// is set. Returns whether a file was written.
pub fn init_config(path: &Path, force: bool) -> Result<bool> {
    if path.exists() && !force {
        warn!(
            config_path = ?path,
            "Config file already exists, leaving it untouched (use --force to overwrite)"
        );
        return Ok(false);
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
            restrict_dir(dir)?;
        }
    }

    let text = render(path, &Config::default())?;
    fs::write(path, text)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    info!(config_path = ?path, "Wrote blank config file");
    Ok(true)
}

/// Program and leading arguments used to open `path`: `$EDITOR` when set,
/// the platform opener otherwise.
pub fn editor_command(editor: Option<&str>, path: &Path) -> Result<Command> {
    let mut command = match editor.map(str::trim).filter(|e| !e.is_empty()) {
        Some(editor) => {
            let mut parts = editor.split_whitespace();
            let program = parts.next().ok_or_else(|| anyhow!("EDITOR is blank"))?;
            let mut command = Command::new(program);
            command.args(parts);
            command
        }
        None => platform_opener(),
    };
    command.arg(path);
    Ok(command)
}

#[cfg(target_os = "macos")]
fn platform_opener() -> Command {
    Command::new("open")
}

#[cfg(target_os = "windows")]
fn platform_opener() -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn platform_opener() -> Command {
    Command::new("xdg-open")
}

/// Creates the config if missing, then opens it for editing and waits.
pub fn edit_config(path: &Path) -> Result<()> {
    init_config(path, false)?;

    let editor = std::env::var("EDITOR").ok();
    let mut command = editor_command(editor.as_deref(), path)?;
    info!(config_path = ?path, program = ?command.get_program(), "Opening config file");
    let status = command
        .status()
        .with_context(|| format!("Failed to launch {:?}", command.get_program()))?;
    if !status.success() {
        return Err(anyhow!("Editor exited with {status}"));
    }
    Ok(())
}
