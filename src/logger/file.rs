//! 文件日志驱动
//!
//! 每条记录写为一行 JSON，文件在第一次写入时才打开（必要时创建父目录）。
//! 配置 `max_size` 后按大小轮转：`app.log -> app.log.1 -> app.log.2 ...`，
//! 最多保留 `max_files` 个历史文件。

use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::driver::{configured_level, LogDriver, LogRecord, Threshold};
use super::level::Severity;
use crate::config::Config;
use crate::errors::LogError;
use crate::utils::Helpers;

pub const DRIVER_NAME: &str = "file";
pub const SETTINGS_KEY: &str = "app.logger.file";
pub const DEFAULT_FILENAME: &str = "ignitor-app.log";
pub const DEFAULT_MAX_FILES: usize = 5;

/// `app.logger.file` 配置段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub filename: String,
    pub directory: Option<PathBuf>,
    pub level: Option<String>,
    /// 单个文件的最大字节数，未设置时不轮转
    pub max_size: Option<u64>,
    pub max_files: usize,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            filename: DEFAULT_FILENAME.to_string(),
            directory: None,
            level: None,
            max_size: None,
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

impl FileSettings {
    pub fn from_config(config: &Config) -> Result<Self, LogError> {
        config
            .get_as::<FileSettings>(SETTINGS_KEY)
            .map(Option::unwrap_or_default)
            .map_err(|source| LogError::Settings {
                driver: DRIVER_NAME.to_string(),
                source,
            })
    }

    /// 解析日志文件路径
    ///
    /// 绝对路径的 `filename` 原样使用；否则拼接到 `directory`（相对目录基于
    /// 应用根目录），未配置目录时使用 `<app_root>/logs`。
    pub fn resolve_path(&self, helpers: &Helpers) -> PathBuf {
        let filename = Path::new(&self.filename);
        if filename.is_absolute() {
            return filename.to_path_buf();
        }
        match &self.directory {
            Some(dir) => helpers.resolve(dir).join(filename),
            None => helpers.logs_path(filename),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Rotation {
    max_size: u64,
    max_files: usize,
}

#[derive(Debug, Default)]
struct FileState {
    file: Option<File>,
    size: u64,
}

#[derive(Debug)]
pub struct FileDriver {
    path: PathBuf,
    threshold: Threshold,
    rotation: Option<Rotation>,
    state: Mutex<FileState>,
}

impl FileDriver {
    pub fn new(config: &Config, helpers: &Helpers) -> Result<Self, LogError> {
        let settings = FileSettings::from_config(config)?;
        Self::from_settings(&settings, helpers)
    }

    pub fn from_settings(settings: &FileSettings, helpers: &Helpers) -> Result<Self, LogError> {
        let level = configured_level(settings.level.as_deref())?;
        let rotation = settings.max_size.map(|max_size| Rotation {
            max_size,
            max_files: settings.max_files,
        });

        Ok(Self {
            path: settings.resolve_path(helpers),
            threshold: Threshold::new(level),
            rotation,
            state: Mutex::new(FileState::default()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 第 `index` 个历史文件的路径
    pub fn rotated_path(&self, index: usize) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    async fn open(&self) -> Result<(File, u64), LogError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| LogError::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| LogError::io(&self.path, e))?;
        let size = file
            .metadata()
            .await
            .map_err(|e| LogError::io(&self.path, e))?
            .len();
        Ok((file, size))
    }

    async fn rotate(&self, state: &mut FileState, rotation: Rotation) -> Result<(), LogError> {
        state.file = None;
        state.size = 0;

        if rotation.max_files == 0 {
            return fs::remove_file(&self.path)
                .await
                .map_err(|e| LogError::io(&self.path, e));
        }

        for index in (1..rotation.max_files).rev() {
            let from = self.rotated_path(index);
            let exists = fs::try_exists(&from)
                .await
                .map_err(|e| LogError::io(&from, e))?;
            if exists {
                let to = self.rotated_path(index + 1);
                fs::rename(&from, &to).await.map_err(|e| LogError::io(&from, e))?;
            }
        }
        fs::rename(&self.path, self.rotated_path(1))
            .await
            .map_err(|e| LogError::io(&self.path, e))?;

        tracing::debug!("日志文件已轮转: {:?}", self.path);
        Ok(())
    }
}

#[async_trait]
impl LogDriver for FileDriver {
    async fn log(&self, level: Severity, message: &str) -> Result<(), LogError> {
        if !self.enabled(level) {
            return Ok(());
        }

        let line = LogRecord::now(level, message).to_line()?;
        let len = line.len() as u64;
        let mut state = self.state.lock().await;

        if state.file.is_none() {
            let (file, size) = self.open().await?;
            state.file = Some(file);
            state.size = size;
        }

        if let Some(rotation) = self.rotation {
            if state.size > 0 && state.size + len > rotation.max_size {
                self.rotate(&mut state, rotation).await?;
                let (file, size) = self.open().await?;
                state.file = Some(file);
                state.size = size;
            }
        }

        if let Some(file) = state.file.as_mut() {
            let written = match file.write_all(line.as_bytes()).await {
                Ok(()) => file.flush().await,
                Err(e) => Err(e),
            };
            if let Err(e) = written {
                // 下次写入时重新打开
                state.file = None;
                return Err(LogError::io(&self.path, e));
            }
        }
        state.size += len;
        Ok(())
    }

    fn level(&self) -> Severity {
        self.threshold.get()
    }

    fn set_level(&self, level: Severity) {
        self.threshold.set(level);
    }
}
