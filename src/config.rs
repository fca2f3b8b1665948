use anyhow::{anyhow, Result};
use config::Config;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::database::ConnectionOptions;

/// Default database file name inside the data directory
const DEFAULT_DATABASE: &str = "tabula.sqlite3";

#[derive(Debug, Clone, Serialize)]
pub struct TabulaConfig {
    /// Path to the directory holding tabula's databases
    pub data_dir: String,

    /// Database file used when no path is given on the command line
    pub database: String,

    /// Use WAL journaling (default: true)
    pub journal_wal: bool,

    /// Enforce foreign key constraints (default: true)
    pub foreign_keys: bool,
}

const EMPTY_CONFIG: &str = r#"### tabula configuration file

### directory for databases created by tabula
# data_dir = "~/.tabula"

### database file used when --db is not given (relative to data_dir)
# database = "tabula.sqlite3"

### connection settings
# journal_wal = true
# foreign_keys = true
"#;

impl Default for TabulaConfig {
    fn default() -> Self {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| ".".to_string());

        Self {
            data_dir: format!("{}/.tabula", home_dir),
            database: DEFAULT_DATABASE.to_string(),
            journal_wal: true,
            foreign_keys: true,
        }
    }
}

impl TabulaConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<TabulaConfig> {
        let mut builder = Config::builder();

        // By default use $HOME/.tabula/tabula.toml as the configuration file path
        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .to_str()
            .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
            .to_owned();

        let tabula_dir = format!("{}/.tabula", home_dir.as_str());

        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                std::fs::create_dir_all(tabula_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create tabula directory: {}", e))?;
                let p = format!("{}/tabula.toml", tabula_dir.as_str());
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        // Add in settings from the environment (with a prefix of TABULA)
        // E.g., `TABULA_DATA_DIR=/tmp/tabula ./tabula tables` would set the data directory
        builder = builder.add_source(config::Environment::with_prefix("TABULA"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        Self::from_map(&config, &tabula_dir)
    }

    fn from_map(config: &HashMap<String, String>, default_dir: &str) -> Result<TabulaConfig> {
        let data_dir = match config.get("data_dir") {
            Some(p) => expand_home(p),
            None => default_dir.to_string(),
        };
        std::fs::create_dir_all(data_dir.as_str())
            .map_err(|e| anyhow!("Unable to create data directory: {}", e))?;

        let database = config
            .get("database")
            .cloned()
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let journal_wal = parse_bool(config.get("journal_wal"), true)?;
        let foreign_keys = parse_bool(config.get("foreign_keys"), true)?;

        Ok(TabulaConfig {
            data_dir,
            database,
            journal_wal,
            foreign_keys,
        })
    }

    /// Path of the default database file
    ///
    /// An absolute `database` setting is used as is; a relative one is
    /// resolved against `data_dir`.
    pub fn database_path(&self) -> String {
        if Path::new(&self.database).is_absolute() {
            return self.database.clone();
        }
        let data_dir = self.data_dir.trim_end_matches('/');
        format!("{}/{}", data_dir, self.database)
    }

    pub fn connection_options(&self) -> ConnectionOptions {
        ConnectionOptions {
            journal_wal: self.journal_wal,
            foreign_keys: self.foreign_keys,
        }
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        [
            format!("Config File:        {}", Self::config_file_path()),
            format!("Data Directory:     {}", self.data_dir),
            format!("Database Path:      {}", self.database_path()),
            format!("WAL Journal:        {}", self.journal_wal),
            format!("Foreign Keys:       {}", self.foreign_keys),
        ]
        .join("\n")
    }

    /// Get the config file path
    pub fn config_file_path() -> String {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| "~".to_string());
        format!("{}/.tabula/tabula.toml", home_dir)
    }
}

fn expand_home(path: &str) -> String {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => format!("{}/{}", home.to_string_lossy(), rest),
        _ => path.to_string(),
    }
}

fn parse_bool(value: Option<&String>, default: bool) -> Result<bool> {
    match value {
        None => Ok(default),
        Some(v) => match v.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(anyhow!("Invalid boolean value in configuration: {}", v)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_map_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let default_dir = dir.path().to_string_lossy().to_string();

        let config = TabulaConfig::from_map(&HashMap::new(), &default_dir).unwrap();
        assert_eq!(config.data_dir, default_dir);
        assert_eq!(
            config.database_path(),
            format!("{}/tabula.sqlite3", default_dir)
        );
        assert!(config.journal_wal);
        assert!(config.foreign_keys);
    }

    #[test]
    fn test_from_map_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data").to_string_lossy().to_string();

        let mut map = HashMap::new();
        map.insert("data_dir".to_string(), data_dir.clone());
        map.insert("database".to_string(), "school.db".to_string());
        map.insert("journal_wal".to_string(), "false".to_string());

        let config = TabulaConfig::from_map(&map, "/unused").unwrap();
        assert!(Path::new(&data_dir).exists());
        assert_eq!(config.database_path(), format!("{}/school.db", data_dir));
        assert_eq!(
            config.connection_options(),
            ConnectionOptions {
                journal_wal: false,
                foreign_keys: true,
            }
        );
    }

    #[test]
    fn test_invalid_bool() {
        let mut map = HashMap::new();
        map.insert("foreign_keys".to_string(), "maybe".to_string());
        let dir = tempfile::tempdir().unwrap();
        let default_dir = dir.path().to_string_lossy().to_string();

        assert!(TabulaConfig::from_map(&map, &default_dir).is_err());
    }

    #[test]
    fn test_absolute_database_path() {
        let config = TabulaConfig {
            database: "/var/lib/school.db".to_string(),
            ..Default::default()
        };
        assert_eq!(config.database_path(), "/var/lib/school.db");
    }
}
