//! Configuration – reads/writes `~/.awareness/config.toml`.

use awareness_guard::{ApiKeyGuard, PermissionSet, PolicyGate};
use awareness_types::{ApiKey, Permission};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Persisted host configuration stored in `~/.awareness/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Key for the sensing service (stored as plain text; the file is
    /// written owner-only).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub awareness_api_key: String,

    /// Runtime permissions the user has granted.
    #[serde(default = "default_permissions")]
    pub permissions: Vec<Permission>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field(
                "awareness_api_key",
                if self.awareness_api_key.is_empty() { &"<not set>" } else { &"<redacted>" },
            )
            .field("permissions", &self.permissions)
            .finish()
    }
}

fn default_permissions() -> Vec<Permission> {
    vec![Permission::FineLocation, Permission::ActivityRecognition]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            awareness_api_key: String::new(),
            permissions: default_permissions(),
        }
    }
}

impl Config {
    /// Build the guard layer from the configured keys and permissions.
    pub fn policy_gate(&self) -> PolicyGate {
        let mut keys = ApiKeyGuard::new();
        if !self.awareness_api_key.is_empty() {
            keys.register(ApiKey::Awareness, self.awareness_api_key.as_str());
        }
        let permissions: PermissionSet = self.permissions.iter().copied().collect();
        PolicyGate::new(keys, permissions)
    }
}

/// Return the path to `~/.awareness/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".awareness").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `AWARENESS_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `AWARENESS_API_KEY` | `awareness_api_key` |
/// | `AWARENESS_PERMISSIONS` | `permissions` (comma-separated, e.g. `fine_location,activity_recognition`) |
pub fn apply_env_overrides(cfg: &mut Config) {
    apply_overrides(cfg, |name| std::env::var(name).ok());
}

/// Apply overrides looked up by variable name.
fn apply_overrides(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("AWARENESS_API_KEY") {
        cfg.awareness_api_key = v;
    }
    if let Some(v) = lookup("AWARENESS_PERMISSIONS")
        && let Some(permissions) = parse_permissions(&v)
    {
        cfg.permissions = permissions;
    }
}

/// `None` if any entry is not a known permission.
fn parse_permissions(list: &str) -> Option<Vec<Permission>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s {
            "fine_location" => Some(Permission::FineLocation),
            "activity_recognition" => Some(Permission::ActivityRecognition),
            _ => None,
        })
        .collect()
}

/// Save the config to disk, creating `~/.awareness/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    // Owner-only read/write on Unix; the file holds API keys.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}
