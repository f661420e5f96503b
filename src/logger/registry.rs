//! 驱动注册表
//!
//! 名称到驱动实现的映射。条目可以是工厂（每个 manager 首次解析时构建新驱动），
//! 也可以是已构建好的实例（原样包装）。注册表只增不减。

use dashmap::DashMap;
use lazy_static::lazy_static;
use std::sync::Arc;

use super::console::{self, ConsoleDriver};
use super::driver::LogDriver;
use super::file::{self, FileDriver};
use crate::config::Config;
use crate::errors::LogError;
use crate::utils::Helpers;

/// 工厂构建驱动时可用的上下文
#[derive(Debug, Clone, Copy)]
pub struct DriverContext<'a> {
    pub name: &'a str,
    pub config: &'a Config,
    pub helpers: &'a Helpers,
}

impl DriverContext<'_> {
    /// 该驱动的配置段 `app.logger.<name>`
    pub fn settings_key(&self) -> String {
        format!("app.logger.{}", self.name)
    }

    pub fn settings(&self) -> Option<&serde_json::Value> {
        self.config.get(&self.settings_key())
    }
}

pub type DriverFactory =
    Arc<dyn Fn(&DriverContext<'_>) -> Result<Arc<dyn LogDriver>, LogError> + Send + Sync>;

#[derive(Clone)]
pub enum DriverEntry {
    Factory(DriverFactory),
    Instance(Arc<dyn LogDriver>),
}

impl DriverEntry {
    /// 工厂在 manager 的缓存锁内执行，不能再通过同一 manager 解析驱动
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn(&DriverContext<'_>) -> Result<Arc<dyn LogDriver>, LogError> + Send + Sync + 'static,
    {
        DriverEntry::Factory(Arc::new(factory))
    }

    pub fn instance(driver: Arc<dyn LogDriver>) -> Self {
        DriverEntry::Instance(driver)
    }

    /// 解析为驱动实例
    pub fn build(&self, ctx: &DriverContext<'_>) -> Result<Arc<dyn LogDriver>, LogError> {
        match self {
            DriverEntry::Factory(factory) => factory(ctx),
            DriverEntry::Instance(driver) => Ok(driver.clone()),
        }
    }
}

impl std::fmt::Debug for DriverEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverEntry::Factory(_) => f.write_str("DriverEntry::Factory"),
            DriverEntry::Instance(_) => f.write_str("DriverEntry::Instance"),
        }
    }
}

lazy_static! {
    static ref GLOBAL_REGISTRY: Arc<DriverRegistry> = Arc::new(DriverRegistry::with_builtins());
}

#[derive(Debug, Default)]
pub struct DriverRegistry {
    entries: DashMap<String, DriverEntry>,
}

impl DriverRegistry {
    /// 空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置 `file` 与 `console` 的注册表
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.extend(
            file::DRIVER_NAME,
            DriverEntry::factory(|ctx| {
                Ok(Arc::new(FileDriver::new(ctx.config, ctx.helpers)?) as Arc<dyn LogDriver>)
            }),
        );
        registry.extend(
            console::DRIVER_NAME,
            DriverEntry::factory(|ctx| Ok(Arc::new(ConsoleDriver::new(ctx.config)?) as Arc<dyn LogDriver>)),
        );
        registry
    }

    /// 进程级共享注册表
    pub fn global() -> Arc<DriverRegistry> {
        GLOBAL_REGISTRY.clone()
    }

    /// 注册或覆盖驱动
    pub fn extend(&self, name: impl Into<String>, entry: DriverEntry) {
        let name = name.into();
        if self.entries.insert(name.clone(), entry).is_some() {
            tracing::info!("日志驱动 '{}' 已被覆盖", name);
        } else {
            tracing::debug!("日志驱动 '{}' 已注册", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<DriverEntry> {
        self.entries.get(name).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// 已注册的驱动名称（已排序）
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{Severity, SharedBuffer};

    fn context<'a>(config: &'a Config, helpers: &'a Helpers, name: &'a str) -> DriverContext<'a> {
        DriverContext { name, config, helpers }
    }

    #[test]
    fn test_builtins_are_seeded() {
        let registry = DriverRegistry::with_builtins();
        assert_eq!(registry.names(), vec!["console".to_string(), "file".to_string()]);
        assert!(registry.contains("file"));
        assert!(registry.contains("console"));
        assert!(!registry.contains("nope"));
        assert!(DriverRegistry::new().names().is_empty());
    }

    #[test]
    fn test_factory_builds_fresh_drivers() {
        let registry = DriverRegistry::with_builtins();
        let config = Config::new();
        let helpers = Helpers::new("/srv/demo");
        let ctx = context(&config, &helpers, "console");

        let entry = registry.get("console").unwrap();
        let a = entry.build(&ctx).unwrap();
        let b = entry.build(&ctx).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_instance_entry_is_returned_as_is() {
        let registry = DriverRegistry::new();
        let driver: Arc<dyn LogDriver> = Arc::new(crate::logger::ConsoleDriver::with_streams(
            Severity::Info,
            Box::new(SharedBuffer::new()),
            Box::new(SharedBuffer::new()),
        ));
        registry.extend("shared", DriverEntry::instance(driver.clone()));

        let config = Config::new();
        let helpers = Helpers::new("/srv/demo");
        let built = registry
            .get("shared")
            .unwrap()
            .build(&context(&config, &helpers, "shared"))
            .unwrap();
        assert!(Arc::ptr_eq(&built, &driver));
    }

    #[test]
    fn test_extend_overwrites() {
        let registry = DriverRegistry::with_builtins();
        registry.extend(
            "file",
            DriverEntry::factory(|_| Err(LogError::InvalidDriver("replaced".to_string()))),
        );

        let config = Config::new();
        let helpers = Helpers::new("/srv/demo");
        let result = registry.get("file").unwrap().build(&context(&config, &helpers, "file"));
        assert!(matches!(result, Err(LogError::InvalidDriver(name)) if name == "replaced"));
        assert_eq!(registry.names().len(), 2);
    }

    #[test]
    fn test_context_settings() {
        let mut config = Config::new();
        config
            .set("app.logger.custom", serde_json::json!({ "endpoint": "udp://127.0.0.1:514" }))
            .unwrap();
        let helpers = Helpers::new("/srv/demo");
        let ctx = context(&config, &helpers, "custom");

        assert_eq!(ctx.settings_key(), "app.logger.custom");
        assert_eq!(ctx.settings().unwrap()["endpoint"], "udp://127.0.0.1:514");
    }
}
