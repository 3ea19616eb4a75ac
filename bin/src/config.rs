//! Config file lookup.

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use std::path::PathBuf;
use xetl_lib::EtlConfig;

/// Environment variable naming the config file.
pub(crate) const CONFIG_ENV: &str = "XETL_CONFIG";

/// Returns the default config path in the user config directory.
///
/// - Linux: `~/.config/xetl/config.toml`
/// - macOS: `~/Library/Application Support/xetl/config.toml`
/// - Windows: `C:\Users\<User>\AppData\Roaming\xetl\config\config.toml`
pub(crate) fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "xetl").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Picks the config file: the flag, then `$XETL_CONFIG`, then [`default_path`].
pub(crate) fn resolve(flag: Option<PathBuf>, env: Option<PathBuf>) -> Option<PathBuf> {
    flag.or(env).or_else(default_path)
}

/// Loads and validates the config file.
pub(crate) fn load(flag: Option<PathBuf>) -> Result<EtlConfig> {
    let env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let Some(path) = resolve(flag, env) else {
        bail!("No config file given and no user config directory found; pass --config or set {CONFIG_ENV}");
    };

    EtlConfig::from_file(&path).with_context(|| format!("Failed to load config {}", path.display()))
}
