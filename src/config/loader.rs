use serde_json::Value;
use std::{fs, path::{Path, PathBuf}};

use super::store::Config;
use crate::errors::ConfigError;

/// Configuration loader responsible for loading `*.toml` files from a config directory
///
/// Each file becomes a top-level key named after its stem, so `config/app.toml`
/// is reachable under `app.*`.
pub struct ConfigLoader {
    dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load every config file in the directory
    pub fn load(&self) -> Result<Config, ConfigError> {
        let mut config = Config::new();

        if !self.dir.is_dir() {
            tracing::warn!("配置目录 {:?} 不存在，使用空配置", self.dir);
            return Ok(config);
        }

        for path in self.config_files()? {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let value = self.load_file(&path)?;
            config.merge(stem, value)?;
            tracing::debug!("已加载配置文件: {:?}", path);
        }

        Ok(config)
    }

    /// Collect `*.toml` files, sorted for a stable merge order
    fn config_files(&self) -> Result<Vec<PathBuf>, ConfigError> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| ConfigError::FileRead(self.dir.to_string_lossy().to_string(), e))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
            .collect();
        files.sort();
        Ok(files)
    }

    /// Parse a single TOML file into a JSON value tree
    fn load_file(&self, path: &Path) -> Result<Value, ConfigError> {
        let display = path.to_string_lossy().to_string();
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::FileRead(display.clone(), e))?;
        let table: toml::Value =
            toml::from_str(&content).map_err(|e| ConfigError::TomlParse(display.clone(), e))?;

        serde_json::to_value(table).map_err(|e| ConfigError::InvalidValue {
            key: display,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_loader() -> (ConfigLoader, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::new(temp_dir.path());
        (loader, temp_dir)
    }

    #[test]
    fn test_load_files_by_stem() {
        let (loader, temp_dir) = create_test_loader();
        fs::write(
            temp_dir.path().join("app.toml"),
            r#"
name = "demo"

[logger]
driver = "console"

[logger.file]
filename = "demo.log"
max_size = 1024
"#,
        )
        .unwrap();
        fs::write(temp_dir.path().join("database.toml"), "connection = \"sqlite\"\n").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let config = loader.load().unwrap();
        assert_eq!(config.get_str("app.name"), Some("demo"));
        assert_eq!(config.get_str("app.logger.driver"), Some("console"));
        assert_eq!(config.get("app.logger.file.max_size").and_then(|v| v.as_u64()), Some(1024));
        assert_eq!(config.get_str("database.connection"), Some("sqlite"));
        assert!(config.get("notes").is_none());
    }

    #[test]
    fn test_missing_dir_yields_empty_config() {
        let loader = ConfigLoader::new("/definitely/not/here");
        let config = loader.load().unwrap();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let (loader, temp_dir) = create_test_loader();
        fs::write(temp_dir.path().join("app.toml"), "name = ").unwrap();

        let err = loader.load().unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(path, _) if path.ends_with("app.toml")));
    }
}
