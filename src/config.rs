// ⚙️ Configuration - resolved from the environment, with local defaults

use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub const DB_PATH_VAR: &str = "EXPENSE_TRACKER_DB";
pub const SERVER_ADDR_VAR: &str = "EXPENSE_SERVER_ADDR";

const DEFAULT_DB_PATH: &str = "expenses.db";
const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite file holding the persisted collection
    pub db_path: PathBuf,

    /// Bind address of the HTTP API
    pub server_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve from any variable source; blank values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Config {
            db_path: read(DB_PATH_VAR).map(PathBuf::from).unwrap_or(defaults.db_path),
            server_addr: read(SERVER_ADDR_VAR).unwrap_or(defaults.server_addr),
        }
    }
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `default_level`.
///
/// Output goes to stderr so it never mixes with command output on stdout.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (tests, embedding) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.db_path, PathBuf::from("expenses.db"));
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let vars: HashMap<&str, &str> = [
            (DB_PATH_VAR, "/tmp/ledger.db"),
            (SERVER_ADDR_VAR, "   "),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.db_path, PathBuf::from("/tmp/ledger.db"));
        assert_eq!(config.server_addr, "127.0.0.1:3000");
    }
}
