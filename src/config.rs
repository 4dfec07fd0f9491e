use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "ManagerDoctors";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Largest accepted avatar upload (4 MB).
pub const MAX_AVATAR_BYTES: usize = 4 * 1024 * 1024;

const ENV_DB_PATH: &str = "DOCTORS_DB_PATH";
const ENV_STORAGE_ROOT: &str = "DOCTORS_STORAGE_ROOT";
const ENV_BIND_ADDR: &str = "DOCTORS_BIND_ADDR";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "manager_doctors=info,tower_http=info"
}

/// Get the application data directory
/// Platform data dir (e.g. ~/.local/share/ManagerDoctors), falling back to the working directory.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from(".").join(APP_NAME))
}

/// Runtime configuration, resolved once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Root of the web-visible storage area; avatars go under `Upload/img/`.
    pub storage_root: PathBuf,
    pub bind_addr: SocketAddr,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {var}: {value} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl AppConfig {
    /// Defaults rooted at `data_dir`.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            db_path: data_dir.join("appointment.db"),
            storage_root: data_dir.join("wwwroot"),
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8080))),
        }
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through `lookup`, falling back to defaults
    /// under [`app_data_dir`] for anything unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::with_data_dir(app_data_dir());

        if let Some(path) = lookup(ENV_DB_PATH).filter(|v| !v.is_empty()) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(root) = lookup(ENV_STORAGE_ROOT).filter(|v| !v.is_empty()) {
            config.storage_root = PathBuf::from(root);
        }
        if let Some(addr) = lookup(ENV_BIND_ADDR).filter(|v| !v.is_empty()) {
            config.bind_addr = addr.parse().map_err(|e: std::net::AddrParseError| {
                ConfigError::Invalid {
                    var: ENV_BIND_ADDR,
                    value: addr.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with(APP_NAME));
    }

    #[test]
    fn defaults_live_under_data_dir() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        let data = app_data_dir();
        assert!(config.db_path.starts_with(&data));
        assert!(config.storage_root.starts_with(&data));
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
    }

    #[test]
    fn env_overrides_apply() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, "/tmp/d.db"),
            (ENV_STORAGE_ROOT, "/srv/www"),
            (ENV_BIND_ADDR, "0.0.0.0:9000"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/d.db"));
        assert_eq!(config.storage_root, PathBuf::from("/srv/www"));
        assert_eq!(config.bind_addr.port(), 9000);
    }

    #[test]
    fn bad_bind_addr_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[(ENV_BIND_ADDR, "not-an-addr")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_BIND_ADDR));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
