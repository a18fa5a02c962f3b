// ⚙️ Settings - data file locations + server address
// Resolved from the environment (a .env file is honoured), with defaults.

use std::env;
use std::path::PathBuf;

pub const NEO_FILE_VAR: &str = "NEO_CATALOG_NEO_FILE";
pub const CAD_FILE_VAR: &str = "NEO_CATALOG_CAD_FILE";
pub const ADDR_VAR: &str = "NEO_CATALOG_ADDR";

pub const DEFAULT_NEO_FILE: &str = "data/neos.csv";
pub const DEFAULT_CAD_FILE: &str = "data/cad.json";
pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub neo_file: PathBuf,
    pub cad_file: PathBuf,
    pub server_addr: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            neo_file: PathBuf::from(DEFAULT_NEO_FILE),
            cad_file: PathBuf::from(DEFAULT_CAD_FILE),
            server_addr: DEFAULT_ADDR.to_string(),
        }
    }
}

impl Settings {
    /// Load `.env` (if any), then read settings from the process environment
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Settings::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve settings through an arbitrary key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Settings::default();

        Settings {
            neo_file: get(NEO_FILE_VAR).map(PathBuf::from).unwrap_or(defaults.neo_file),
            cad_file: get(CAD_FILE_VAR).map(PathBuf::from).unwrap_or(defaults.cad_file),
            server_addr: get(ADDR_VAR).unwrap_or(defaults.server_addr),
        }
    }

    /// Apply command-line overrides on top of the environment
    pub fn with_overrides(mut self, neo_file: Option<PathBuf>, cad_file: Option<PathBuf>) -> Self {
        if let Some(path) = neo_file {
            self.neo_file = path;
        }
        if let Some(path) = cad_file {
            self.cad_file = path;
        }
        self
    }
}
