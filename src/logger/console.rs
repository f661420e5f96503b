//! 控制台日志驱动
//!
//! `warning` 及更紧急的级别写入 stderr，其余写入 stdout。每次写入后立即
//! flush，`log` 返回时输出已落到流上。

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use std::io::{self, Write};

use super::driver::{configured_level, LogDriver, Threshold};
use super::level::Severity;
use crate::config::Config;
use crate::errors::LogError;

pub const DRIVER_NAME: &str = "console";
pub const SETTINGS_KEY: &str = "app.logger.console";

type Stream = Box<dyn Write + Send>;

/// `app.logger.console` 配置段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    pub level: Option<String>,
    /// 是否在每行前输出时间戳
    pub timestamp: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            level: None,
            timestamp: true,
        }
    }
}

pub struct ConsoleDriver {
    threshold: Threshold,
    timestamp: bool,
    out: Mutex<Stream>,
    err: Mutex<Stream>,
}

impl ConsoleDriver {
    pub fn new(config: &Config) -> Result<Self, LogError> {
        let settings = config
            .get_as::<ConsoleSettings>(SETTINGS_KEY)
            .map_err(|source| LogError::Settings {
                driver: DRIVER_NAME.to_string(),
                source,
            })?
            .unwrap_or_default();
        let level = configured_level(settings.level.as_deref())?;

        let mut driver = Self::with_streams(level, Box::new(io::stdout()), Box::new(io::stderr()));
        driver.timestamp = settings.timestamp;
        Ok(driver)
    }

    /// 使用自定义输出流，时间戳关闭
    pub fn with_streams(level: Severity, out: Stream, err: Stream) -> Self {
        Self {
            threshold: Threshold::new(level),
            timestamp: false,
            out: Mutex::new(out),
            err: Mutex::new(err),
        }
    }

    fn format(&self, level: Severity, message: &str) -> String {
        if self.timestamp {
            format!(
                "{} {}: {}\n",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                level,
                message
            )
        } else {
            format!("{level}: {message}\n")
        }
    }
}

#[async_trait]
impl LogDriver for ConsoleDriver {
    async fn log(&self, level: Severity, message: &str) -> Result<(), LogError> {
        if !self.enabled(level) {
            return Ok(());
        }

        let line = self.format(level, message);
        let stream = if level <= Severity::Warning {
            &self.err
        } else {
            &self.out
        };

        let mut stream = stream.lock();
        stream
            .write_all(line.as_bytes())
            .and_then(|_| stream.flush())
            .map_err(LogError::Console)
    }

    fn level(&self) -> Severity {
        self.threshold.get()
    }

    fn set_level(&self, level: Severity) {
        self.threshold.set(level);
    }
}

impl std::fmt::Debug for ConsoleDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleDriver")
            .field("level", &self.level())
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

/// 共享缓冲区，便于测试中读取控制台输出
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(std::sync::Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
