use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::filter::FilterSet;
use crate::core::sort::{default_sorting, SortKey};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("flint")
}

pub fn config_path(dir: &Path) -> PathBuf {
    dir.join("config.json")
}

pub fn filters_path(dir: &Path) -> PathBuf {
    dir.join("filters.json")
}

/// View behavior persisted between sessions. Unknown fields in a stored
/// document are ignored and missing ones take their defaults, so old
/// files keep loading across releases.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub sorting: Vec<SortKey>,
    /// Skip sorting entirely and present records as they sit in the file.
    pub file_sorting: bool,
    pub show_completed: bool,
    pub show_hidden: bool,
    /// Stamp new and recurring lines with a creation date.
    pub append_creation_date: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sorting: default_sorting(),
            file_sorting: false,
            show_completed: true,
            show_hidden: true,
            append_creation_date: false,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Missing or unreadable settings are not fatal, the defaults serve.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                if path.exists() {
                    log::warn!("falling back to default settings: {err}");
                }
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Stored filters are a cache of the last session; anything unreadable
/// simply means no active filters.
pub fn load_filters(path: &Path) -> FilterSet {
    let Ok(content) = std::fs::read_to_string(path) else {
        return FilterSet::new();
    };
    match serde_json::from_str(&content) {
        Ok(filters) => filters,
        Err(err) => {
            log::warn!("ignoring stored filters: {err}");
            FilterSet::new()
        }
    }
}

pub fn save_filters(path: &Path, filters: &FilterSet) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(filters)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::FilterClause;
    use crate::core::task::Attribute;

    #[test]
    fn defaults_match_first_run_behavior() {
        let settings = Settings::default();
        assert!(settings.show_completed);
        assert!(settings.show_hidden);
        assert!(!settings.file_sorting);
        assert!(!settings.append_creation_date);
        assert_eq!(settings.sorting.len(), 7);
        assert_eq!(settings.sorting[0].attribute, Attribute::Priority);
    }

    #[test]
    fn partial_settings_documents_fill_in_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"showCompleted": false}"#).unwrap();
        assert!(!settings.show_completed);
        assert!(settings.show_hidden);
        assert_eq!(settings.sorting, default_sorting());
    }

    #[test]
    fn settings_round_trip_through_disk() {
        let dir = std::env::temp_dir().join("flint-config-test");
        let path = config_path(&dir);
        let mut settings = Settings::default();
        settings.show_hidden = false;
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_files_yield_defaults_and_empty_filters() {
        let path = Path::new("/nonexistent/flint/config.json");
        assert_eq!(Settings::load_or_default(path), Settings::default());
        assert!(load_filters(Path::new("/nonexistent/flint/filters.json")).is_empty());
    }

    #[test]
    fn filters_round_trip_through_disk() {
        let dir = std::env::temp_dir().join("flint-filters-test");
        let path = filters_path(&dir);
        let mut filters = FilterSet::new();
        filters.set(Attribute::Contexts, vec![FilterClause::exclude("phone")]);
        save_filters(&path, &filters).unwrap();
        assert_eq!(load_filters(&path), filters);
        std::fs::remove_dir_all(&dir).ok();
    }
}
