//! 框架自身的诊断日志（tracing）
//!
//! 与 [`crate::logger`] 不同，这里配置的是容器、配置加载、驱动注册等内部
//! 组件的 tracing 输出。`RUST_LOG` 存在时优先于配置的级别。

use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::{generic_error, AppResult};

/// 日志格式配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 人类可读格式
    Pretty,
    /// JSON 格式
    Json,
    /// 紧凑格式
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            other => Err(format!(
                "unknown log format '{other}', expected pretty, json or compact"
            )),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: Level,
    /// 输出格式
    pub format: LogFormat,
    /// 是否显示目标模块
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否使用 ANSI 颜色
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::Compact,
            show_target: false,
            show_thread_ids: false,
            ansi: true,
        }
    }
}

impl LoggingConfig {
    /// 按命令行 `-v` 次数选择级别
    pub fn from_verbosity(verbose: u8) -> Self {
        let level = match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            ..Self::default()
        }
    }

    /// 替换输出格式，JSON 输出不带 ANSI 颜色
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        if format == LogFormat::Json {
            self.ansi = false;
        }
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_str().to_lowercase()))
    }
}

/// 初始化日志系统，全局 subscriber 已存在时返回错误
pub fn init_logging(config: LoggingConfig) -> AppResult<()> {
    let registry = tracing_subscriber::registry().with(config.filter());

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(config.show_target)
                    .with_thread_ids(config.show_thread_ids)
                    .with_ansi(config.ansi)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(config.show_target)
                    .with_thread_ids(config.show_thread_ids)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(config.show_target)
                    .with_thread_ids(config.show_thread_ids)
                    .with_ansi(config.ansi)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    result.map_err(|e| generic_error(format!("failed to initialise tracing: {e}")))?;

    tracing::debug!(
        level = %config.level,
        format = ?config.format,
        "Logging system initialized"
    );
    Ok(())
}
