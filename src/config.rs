//! Runtime settings resolved once per invocation

use directories::BaseDirs;
use std::path::PathBuf;

use crate::services::api::DEFAULT_API_BASE;
use crate::types::{Result, TglError};

/// Store file name used when no path is given
pub const DATABASE_FILE_NAME: &str = "db.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_path: PathBuf,
    pub api_base_url: String,
}

impl Settings {
    /// Apply overrides (from flags or environment) on top of the defaults
    pub fn resolve(database: Option<PathBuf>, api_url: Option<String>) -> Result<Self> {
        let database_path = match database {
            Some(path) if path.as_os_str().is_empty() => {
                return Err(TglError::Config("database path is empty".into()));
            }
            Some(path) => path,
            None => Self::default_database_path()?,
        };

        let api_base_url = api_url.unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        if !(api_base_url.starts_with("https://") || api_base_url.starts_with("http://")) {
            return Err(TglError::Config(format!(
                "API URL must start with http:// or https://, got '{}'",
                api_base_url
            )));
        }

        Ok(Self {
            database_path,
            api_base_url,
        })
    }

    /// `db.sqlite3` beside the executable, or `~/.tgl/db.sqlite3` when the
    /// executable location is unknown
    pub fn default_database_path() -> Result<PathBuf> {
        if let Some(dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
        {
            return Ok(dir.join(DATABASE_FILE_NAME));
        }

        let base_dirs = BaseDirs::new()
            .ok_or_else(|| TglError::Config("Cannot determine home directory".into()))?;
        Ok(base_dirs.home_dir().join(".tgl").join(DATABASE_FILE_NAME))
    }
}
