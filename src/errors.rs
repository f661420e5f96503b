use thiserror::Error;

use crate::infrastructure::container::ContainerError;

/// 应用统一错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Logger error: {0}")]
    Log(#[from] LogError),
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),
    #[error("Application error: {0}")]
    Generic(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from file '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
    #[error("Failed to parse env file '{0}': {1}")]
    EnvParse(String, String),
    #[error("Configuration value '{key}' is invalid: {reason}")]
    InvalidValue { key: String, reason: String },
    #[error("Configuration key '{0}' cannot be set below a non-table value")]
    NotATable(String),
}

#[derive(Debug, Error)]
pub enum LogError {
    /// 未知的日志级别名称
    #[error("Invalid log level '{0}', expected one of emerg, alert, crit, error, warning, notice, info, debug")]
    InvalidLevel(String),
    /// 注册表中不存在的驱动
    #[error("Logger driver '{0}' is not registered")]
    InvalidDriver(String),
    #[error("Failed to write log file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Console stream write failed: {0}")]
    Console(#[source] std::io::Error),
    #[error("Failed to encode log record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Invalid settings for driver '{driver}': {source}")]
    Settings {
        driver: String,
        #[source]
        source: ConfigError,
    },
}

impl LogError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        LogError::Io {
            path: path.to_string_lossy().to_string(),
            source,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// 快捷构造通用错误
pub fn generic_error(msg: impl Into<String>) -> AppError {
    AppError::Generic(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_error_messages_name_the_culprit() {
        let err = LogError::InvalidDriver("doesNotExist".to_string());
        assert!(err.to_string().contains("doesNotExist"));

        let err = LogError::InvalidLevel("verbose".to_string());
        assert!(err.to_string().contains("'verbose'"));
    }

    #[test]
    fn test_app_error_from_log_error() {
        let err: AppError = LogError::InvalidDriver("x".to_string()).into();
        assert!(matches!(err, AppError::Log(LogError::InvalidDriver(_))));
        assert!(err.to_string().starts_with("Logger error:"));
    }

    #[test]
    fn test_io_helper_keeps_path() {
        let err = LogError::io(
            std::path::Path::new("/tmp/app.log"),
            std::io::Error::other("disk full"),
        );
        match err {
            LogError::Io { path, .. } => assert_eq!(path, "/tmp/app.log"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
