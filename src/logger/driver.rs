//! 日志驱动接口
//!
//! 所有驱动（内置的 file / console 以及通过 `extend` 注册的第三方驱动）
//! 都实现 [`LogDriver`]。级别过滤由驱动自身完成：低于阈值的调用直接返回
//! `Ok(())`，调用方无需区分消息是否真正写出。

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;

use super::level::Severity;
use crate::errors::LogError;

#[async_trait]
pub trait LogDriver: Send + Sync {
    /// 写入一条日志，写入被确认后 future 才完成
    async fn log(&self, level: Severity, message: &str) -> Result<(), LogError>;

    /// 当前阈值
    fn level(&self) -> Severity;

    /// 修改阈值
    fn set_level(&self, level: Severity);

    fn enabled(&self, level: Severity) -> bool {
        level.passes(self.level())
    }
}

/// 可在运行期修改的阈值
#[derive(Debug, Default)]
pub struct Threshold(RwLock<Severity>);

impl Threshold {
    pub fn new(level: Severity) -> Self {
        Self(RwLock::new(level))
    }

    pub fn get(&self) -> Severity {
        *self.0.read()
    }

    pub fn set(&self, level: Severity) {
        *self.0.write() = level;
    }
}

/// 文件驱动写出的单条记录
#[derive(Debug, Serialize)]
pub struct LogRecord<'a> {
    pub level: &'static str,
    pub message: &'a str,
    pub timestamp: String,
}

impl<'a> LogRecord<'a> {
    pub fn now(level: Severity, message: &'a str) -> Self {
        Self {
            level: level.name(),
            message,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// 编码为一行 JSON（含换行符）
    pub fn to_line(&self) -> Result<String, LogError> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// 从驱动配置中读取 `level`，缺省为 `info`
pub(crate) fn configured_level(name: Option<&str>) -> Result<Severity, LogError> {
    match name {
        Some(name) => name.parse(),
        None => Ok(Severity::default()),
    }
}
