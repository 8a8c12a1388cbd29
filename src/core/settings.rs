//! Process settings: where the cache lives, which catalog to use, how loud to log.
//!
//! Precedence is command-line flag, then environment variable, then default.

use crate::core::schemas;
use std::path::PathBuf;

pub const DB_ENV: &str = "APIZZA_DB";
pub const MENU_ENV: &str = "APIZZA_MENU";
pub const LOG_ENV: &str = "APIZZA_LOG";

const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db_path: PathBuf,
    pub menu_path: Option<PathBuf>,
    pub log_filter: String,
}

impl Settings {
    /// Settings pointing at an explicit cache file with defaults elsewhere.
    pub fn with_db_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            menu_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }

    /// Resolve settings from flags and an environment lookup.
    pub fn resolve<E>(
        db_flag: Option<PathBuf>,
        menu_flag: Option<PathBuf>,
        verbose: u8,
        env: E,
    ) -> Self
    where
        E: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let db_path = db_flag
            .or_else(|| non_empty(DB_ENV).map(PathBuf::from))
            .unwrap_or_else(|| default_db_path(non_empty("HOME")));
        let menu_path = menu_flag.or_else(|| non_empty(MENU_ENV).map(PathBuf::from));
        let log_filter = match verbose {
            0 => non_empty(LOG_ENV).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            1 => "info".to_string(),
            _ => "debug".to_string(),
        };

        Self {
            db_path,
            menu_path,
            log_filter,
        }
    }
}

fn default_db_path(home: Option<String>) -> PathBuf {
    let base = home.map(PathBuf::from).unwrap_or_else(std::env::temp_dir);
    base.join(schemas::CACHE_DIR).join(schemas::CACHE_DB_NAME)
}
