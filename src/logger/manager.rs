//! Logger 管理器
//!
//! 每个 manager 维护自己的 Logger 缓存：同一名称多次解析得到同一个
//! `Arc<Logger>`，不同 manager 之间互不共享。驱动实现来自注册表，
//! `LoggerManager::new` 使用进程级注册表。

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use super::level::Severity;
use super::registry::{DriverContext, DriverEntry, DriverRegistry};
use super::{file, Logger};
use crate::config::Config;
use crate::errors::LogError;
use crate::utils::Helpers;

/// 默认驱动名称的配置键
pub const DEFAULT_DRIVER_KEY: &str = "app.logger.driver";

pub struct LoggerManager {
    config: Arc<Config>,
    helpers: Arc<Helpers>,
    registry: Arc<DriverRegistry>,
    loggers: DashMap<String, Arc<Logger>>,
}

impl LoggerManager {
    /// 使用进程级注册表创建
    pub fn new(config: Arc<Config>, helpers: Arc<Helpers>) -> Self {
        Self::with_registry(config, helpers, DriverRegistry::global())
    }

    pub fn with_registry(
        config: Arc<Config>,
        helpers: Arc<Helpers>,
        registry: Arc<DriverRegistry>,
    ) -> Self {
        Self {
            config,
            helpers,
            registry,
            loggers: DashMap::new(),
        }
    }

    /// 向进程级注册表注册驱动，对之后所有 manager 的解析生效
    pub fn extend(name: impl Into<String>, entry: DriverEntry) {
        DriverRegistry::global().extend(name, entry);
    }

    pub fn registry(&self) -> &Arc<DriverRegistry> {
        &self.registry
    }

    /// 按名称解析 Logger
    ///
    /// 已缓存时直接返回；名称未注册时返回 `InvalidDriver`，不会回退到默认驱动。
    pub fn driver(&self, name: &str) -> Result<Arc<Logger>, LogError> {
        if let Some(logger) = self.loggers.get(name) {
            return Ok(logger.value().clone());
        }

        let entry = self
            .registry
            .get(name)
            .ok_or_else(|| LogError::InvalidDriver(name.to_string()))?;

        match self.loggers.entry(name.to_string()) {
            Entry::Occupied(cached) => Ok(cached.get().clone()),
            Entry::Vacant(slot) => {
                let ctx = DriverContext {
                    name,
                    config: self.config.as_ref(),
                    helpers: self.helpers.as_ref(),
                };
                let logger = Arc::new(Logger::new(entry.build(&ctx)?));
                slot.insert(logger.clone());
                tracing::debug!("日志驱动 '{}' 已实例化", name);
                Ok(logger)
            }
        }
    }

    /// 默认驱动名称，未配置时为 `file`
    pub fn default_driver_name(&self) -> String {
        self.config
            .get_str(DEFAULT_DRIVER_KEY)
            .unwrap_or(file::DRIVER_NAME)
            .to_string()
    }

    pub fn default_logger(&self) -> Result<Arc<Logger>, LogError> {
        self.driver(&self.default_driver_name())
    }

    /// 通过默认驱动写入
    pub async fn log(&self, level: Severity, message: &str) -> Result<(), LogError> {
        self.default_logger()?.log(level, message).await
    }

    all_severity_methods!();

    /// 已实例化的驱动名称
    pub fn resolved(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loggers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for LoggerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerManager")
            .field("default_driver", &self.default_driver_name())
            .field("resolved", &self.resolved())
            .finish()
    }
}
