//! 应用目录解析
//!
//! [`Helpers`] 以应用根目录为基准给出各约定目录：
//! - `config/`：配置文件
//! - `logs/`：文件日志驱动的默认目录
//! - `public/`、`resources/`、`app/`

use std::path::{Path, PathBuf};

pub const APP_DIR: &str = "app";
pub const CONFIG_DIR: &str = "config";
pub const LOGS_DIR: &str = "logs";
pub const PUBLIC_DIR: &str = "public";
pub const RESOURCES_DIR: &str = "resources";

/// 展开用户目录 ~ 到实际路径
///
/// 支持：
/// - Unix 风格：~/path、~  
/// - Windows 风格：~\path
pub fn expand_user(input: &str) -> PathBuf {
    if let Some(stripped) = input.strip_prefix('~') {
        if let Some(home) = home::home_dir() {
            let stripped = stripped
                .strip_prefix('/')
                .or_else(|| stripped.strip_prefix('\\'))
                .unwrap_or(stripped);

            return if stripped.is_empty() {
                home
            } else {
                home.join(stripped)
            };
        }
    }
    PathBuf::from(input)
}

/// 路径解析助手
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Helpers {
    app_root: PathBuf,
}

impl Helpers {
    pub fn new(app_root: impl Into<PathBuf>) -> Self {
        Self {
            app_root: app_root.into(),
        }
    }

    pub fn app_root(&self) -> &Path {
        &self.app_root
    }

    pub fn app_path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.under(APP_DIR, rel)
    }

    pub fn config_path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.under(CONFIG_DIR, rel)
    }

    pub fn logs_path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.under(LOGS_DIR, rel)
    }

    pub fn public_path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.under(PUBLIC_DIR, rel)
    }

    pub fn resources_path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.under(RESOURCES_DIR, rel)
    }

    /// 绝对路径原样返回，相对路径基于应用根目录
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.app_root.join(path)
        }
    }

    fn under(&self, dir: &str, rel: impl AsRef<Path>) -> PathBuf {
        let rel = rel.as_ref();
        let base = self.app_root.join(dir);
        if rel.as_os_str().is_empty() {
            base
        } else {
            base.join(rel)
        }
    }
}
