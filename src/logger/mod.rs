//! 应用日志子系统
//!
//! - [`LogDriver`]：驱动接口，内置 [`FileDriver`] 与 [`ConsoleDriver`]
//! - [`Logger`]：包装单个驱动，提供 `emerg` … `debug` 八个级别方法
//! - [`LoggerManager`]：按名称解析驱动并缓存 Logger，可通过 `extend` 注册新驱动
//!
//! ```no_run
//! use ignitor::config::Config;
//! use ignitor::logger::LoggerManager;
//! use ignitor::utils::Helpers;
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), ignitor::errors::LogError> {
//! let manager = LoggerManager::new(Arc::new(Config::new()), Arc::new(Helpers::new(".")));
//! manager.driver("console")?.info("server started").await?;
//! manager.warning("written through the default driver").await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::errors::LogError;

/// 为实现了 `log(level, message)` 的类型生成八个级别方法
macro_rules! severity_methods {
    ($($name:ident => $level:ident),* $(,)?) => {
        $(
            #[doc = concat!("以 `", stringify!($name), "` 级别写入一条日志")]
            pub async fn $name(&self, message: &str) -> Result<(), $crate::errors::LogError> {
                self.log($crate::logger::Severity::$level, message).await
            }
        )*
    };
}

macro_rules! all_severity_methods {
    () => {
        severity_methods! {
            emerg => Emerg,
            alert => Alert,
            crit => Crit,
            error => Error,
            warning => Warning,
            notice => Notice,
            info => Info,
            debug => Debug,
        }
    };
}

pub mod console;
pub mod driver;
pub mod file;
pub mod level;
pub mod manager;
pub mod registry;

pub use console::{ConsoleDriver, SharedBuffer};
pub use driver::{LogDriver, LogRecord, Threshold};
pub use file::{FileDriver, FileSettings};
pub use level::Severity;
pub use manager::LoggerManager;
pub use registry::{DriverContext, DriverEntry, DriverRegistry};

/// 驱动的转发包装，自身不保存其他状态
#[derive(Clone)]
pub struct Logger {
    driver: Arc<dyn LogDriver>,
}

impl Logger {
    pub fn new(driver: Arc<dyn LogDriver>) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &Arc<dyn LogDriver> {
        &self.driver
    }

    pub async fn log(&self, level: Severity, message: &str) -> Result<(), LogError> {
        self.driver.log(level, message).await
    }

    /// 按数值级别写入，数值超出 0..=7 时返回 `InvalidLevel`
    pub async fn log_rank(&self, rank: u8, message: &str) -> Result<(), LogError> {
        let level = Severity::from_rank(rank).ok_or_else(|| LogError::InvalidLevel(rank.to_string()))?;
        self.log(level, message).await
    }

    all_severity_methods!();

    pub fn level(&self) -> Severity {
        self.driver.level()
    }

    pub fn set_level(&self, level: Severity) {
        self.driver.set_level(level);
    }

    /// 按名称设置阈值，名称无效时阈值保持不变
    pub fn set_level_name(&self, name: &str) -> Result<(), LogError> {
        let level = name.parse()?;
        self.driver.set_level(level);
        Ok(())
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger").field("level", &self.level()).finish()
    }
}
