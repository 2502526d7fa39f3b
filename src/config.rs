use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::collation::{DEFAULT_LOCALE, LocaleCollation};
use crate::storage::TecStore;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TecConfig {
    /// Database file the directory reads and writes
    pub database: Option<String>,
    /// Pre-populated database copied to `database` on first run
    pub template: Option<String>,
    /// Locale used to sort names and interests
    pub locale: Option<String>,
}

impl TecConfig {
    pub fn database_path(&self) -> PathBuf {
        self.database
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| default_database_path_in(Path::new(".")))
    }

    pub fn locale(&self) -> &str {
        self.locale.as_deref().unwrap_or(DEFAULT_LOCALE)
    }

    /// Open the configured store, seeding it from the template when one is set
    pub fn open_store(&self) -> anyhow::Result<TecStore> {
        let collation = LocaleCollation::new(self.locale())?;
        let db_path = self.database_path();
        let store = match &self.template {
            Some(template) => TecStore::open_from_template(Path::new(template), &db_path, collation)?,
            None => {
                ensure_db_dir(&db_path)?;
                TecStore::open_with_collation(&db_path, collation)?
            }
        };
        Ok(store)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("tec.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".tec").join("tec.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<TecConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: TecConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &TecConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.toml"))).unwrap().is_none());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tec.toml");
        let config = TecConfig {
            database: Some("data/tec.db".to_string()),
            template: None,
            locale: Some("en".to_string()),
        };

        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.locale(), "en");
    }

    #[test]
    fn test_defaults() {
        let config = TecConfig::default();
        assert_eq!(config.locale(), "fa");
        assert_eq!(config.database_path(), PathBuf::from("./.tec/tec.db"));
    }

    #[test]
    fn test_open_store_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("tec.db");
        let config = TecConfig {
            database: Some(db.to_string_lossy().to_string()),
            ..Default::default()
        };

        let store = config.open_store().unwrap();
        assert_eq!(store.count_members().unwrap(), 0);
        assert!(db.exists());
    }
}
