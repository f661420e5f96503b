//! `.env` 环境文件加载
//!
//! 文件中的值只作为缺省值，同名的进程环境变量优先。加载过程不会修改
//! 进程环境。

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{ENV_FILE_NAME, ENV_PATH_VAR};
use crate::errors::ConfigError;

#[derive(Debug, Clone, Default)]
pub struct Env {
    values: HashMap<String, String>,
    source: Option<PathBuf>,
}

impl Env {
    /// 加载应用根目录下的 `.env`，可通过 `ENV_PATH` 指定其他文件
    pub fn load(app_root: &Path) -> Result<Self, ConfigError> {
        let file = std::env::var(ENV_PATH_VAR).unwrap_or_else(|_| ENV_FILE_NAME.to_string());
        Self::from_file(&app_root.join(file))
    }

    /// 从指定文件加载，文件不存在时返回空环境
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            tracing::warn!("环境文件 {:?} 不存在，跳过加载", path);
            return Ok(Self::default());
        }

        let display = path.to_string_lossy().to_string();
        let iter = dotenv::from_path_iter(path)
            .map_err(|e| ConfigError::EnvParse(display.clone(), e.to_string()))?;

        let mut values = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| ConfigError::EnvParse(display.clone(), e.to_string()))?;
            values.insert(key, value);
        }

        tracing::debug!("已加载 {} 个环境变量: {:?}", values.len(), path);
        Ok(Self {
            values,
            source: Some(path.to_path_buf()),
        })
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            source: None,
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().or_else(|| self.values.get(key).cloned())
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// 加载来源文件
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_from_file_parses_pairs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".env");
        fs::write(
            &path,
            "# comment\nIGNITOR_TEST_APP_NAME=demo\nIGNITOR_TEST_QUOTED=\"hello world\"\n",
        )
        .unwrap();

        let env = Env::from_file(&path).unwrap();
        assert_eq!(env.len(), 2);
        assert_eq!(env.get("IGNITOR_TEST_APP_NAME").as_deref(), Some("demo"));
        assert_eq!(env.get("IGNITOR_TEST_QUOTED").as_deref(), Some("hello world"));
        assert_eq!(env.source(), Some(path.as_path()));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let env = Env::from_file(Path::new("/definitely/not/here/.env")).unwrap();
        assert!(env.is_empty());
        assert!(env.source().is_none());
    }

    #[test]
    fn test_get_or_default() {
        let env = Env::from_pairs([("IGNITOR_TEST_PORT", "3333")]);
        assert_eq!(env.get_or("IGNITOR_TEST_PORT", "80"), "3333");
        assert_eq!(env.get_or("IGNITOR_TEST_MISSING_KEY", "80"), "80");
    }

    #[test]
    fn test_process_env_wins() {
        // PATH 总是存在于进程环境中
        let env = Env::from_pairs([("PATH", "from-file")]);
        assert_ne!(env.get("PATH").as_deref(), Some("from-file"));
    }
}
