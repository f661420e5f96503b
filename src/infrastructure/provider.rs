//! 服务提供者实现
//!
//! 为各个框架子系统提供注册逻辑。每个提供者先在 `register` 阶段向容器
//! 注册绑定，所有提供者注册完成后再依次执行 `boot`。

use async_trait::async_trait;
use std::sync::Arc;

use super::container::{BoxError, ServiceContainer, ServiceLifetime};
use crate::config::{Config, Env};
use crate::errors::AppResult;
use crate::logger::LoggerManager;
use crate::utils::Helpers;

pub const ENV_ALIAS: &str = "Env";
pub const CONFIG_ALIAS: &str = "Config";
pub const HELPERS_ALIAS: &str = "Helpers";
pub const LOGGER_ALIAS: &str = "Logger";

/// 启动时写入默认驱动的消息（可选）
pub const BOOT_MESSAGE_KEY: &str = "app.logger.boot_message";

#[async_trait]
pub trait ServiceProvider: Send + Sync {
    fn name(&self) -> &str;

    /// 注册绑定，此阶段不应解析其他提供者的服务
    async fn register(&self, container: &ServiceContainer) -> AppResult<()>;

    /// 所有提供者注册完成后执行
    async fn boot(&self, _container: &ServiceContainer) -> AppResult<()> {
        Ok(())
    }
}

/// 核心子系统提供者：环境、配置、路径助手与日志
pub struct AppProvider {
    helpers: Arc<Helpers>,
}

impl AppProvider {
    pub fn new(helpers: Arc<Helpers>) -> Self {
        Self { helpers }
    }

    fn register_helpers(&self, container: &ServiceContainer) {
        container.instance(self.helpers.clone());
        container.alias::<Helpers>(HELPERS_ALIAS);
    }

    fn register_env(&self, container: &ServiceContainer) {
        let root = self.helpers.app_root().to_path_buf();
        container.register(ServiceLifetime::Singleton, move |_| Ok(Env::load(&root)?));
        container.alias::<Env>(ENV_ALIAS);
    }

    fn register_config(&self, container: &ServiceContainer) {
        container.singleton_async(|c: ServiceContainer| async move {
            let helpers = c.resolve::<Helpers>().await?;
            Ok::<_, BoxError>(Config::load(helpers.config_path(""))?)
        });
        container.alias::<Config>(CONFIG_ALIAS);
    }

    fn register_logger(&self, container: &ServiceContainer) {
        container.singleton_async(|c: ServiceContainer| async move {
            let config = c.resolve::<Config>().await?;
            let helpers = c.resolve::<Helpers>().await?;
            Ok::<_, BoxError>(LoggerManager::new(config, helpers))
        });
        container.alias::<LoggerManager>(LOGGER_ALIAS);
    }
}

#[async_trait]
impl ServiceProvider for AppProvider {
    fn name(&self) -> &str {
        "app"
    }

    async fn register(&self, container: &ServiceContainer) -> AppResult<()> {
        self.register_helpers(container);
        self.register_env(container);
        self.register_config(container);
        self.register_logger(container);
        Ok(())
    }

    async fn boot(&self, container: &ServiceContainer) -> AppResult<()> {
        let config = container.resolve::<Config>().await?;
        if let Some(message) = config.get_str(BOOT_MESSAGE_KEY) {
            let logger = container.resolve::<LoggerManager>().await?;
            logger.info(message).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ContainerError;
    use std::fs;
    use tempfile::TempDir;

    async fn registered(root: &std::path::Path) -> ServiceContainer {
        let container = ServiceContainer::new();
        let provider = AppProvider::new(Arc::new(Helpers::new(root)));
        provider.register(&container).await.unwrap();
        container
    }

    #[tokio::test]
    async fn test_registers_core_aliases() {
        let temp_dir = TempDir::new().unwrap();
        let container = registered(temp_dir.path()).await;

        assert_eq!(
            container.aliases(),
            vec!["Config", "Env", "Helpers", "Logger"]
        );
        assert!(container.is_registered::<LoggerManager>());
        assert!(container.is_registered::<Env>());
    }

    #[tokio::test]
    async fn test_config_is_loaded_from_config_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("config")).unwrap();
        fs::write(
            temp_dir.path().join("config/app.toml"),
            "[logger]\ndriver = \"console\"\n",
        )
        .unwrap();

        let container = registered(temp_dir.path()).await;
        let config = container.resolve_alias::<Config>(CONFIG_ALIAS).await.unwrap();
        assert_eq!(config.get_str("app.logger.driver"), Some("console"));

        let manager = container.resolve_alias::<LoggerManager>(LOGGER_ALIAS).await.unwrap();
        assert_eq!(manager.default_driver_name(), "console");
    }

    #[tokio::test]
    async fn test_logger_manager_is_singleton() {
        let temp_dir = TempDir::new().unwrap();
        let container = registered(temp_dir.path()).await;

        let a = container.resolve::<LoggerManager>().await.unwrap();
        let b = container.resolve::<LoggerManager>().await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a.driver("file").unwrap(), &b.driver("file").unwrap()));
    }

    #[tokio::test]
    async fn test_broken_config_surfaces_as_creation_failure() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("config")).unwrap();
        fs::write(temp_dir.path().join("config/app.toml"), "driver = ").unwrap();

        let container = registered(temp_dir.path()).await;
        let result = container.resolve::<LoggerManager>().await;
        assert!(matches!(result, Err(ContainerError::CreationFailed(_))));
    }

    #[tokio::test]
    async fn test_boot_writes_boot_message() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("config")).unwrap();
        fs::write(
            temp_dir.path().join("config/app.toml"),
            "[logger]\nboot_message = \"application booted\"\n",
        )
        .unwrap();

        let container = registered(temp_dir.path()).await;
        let provider = AppProvider::new(Arc::new(Helpers::new(temp_dir.path())));
        provider.boot(&container).await.unwrap();

        let written = fs::read_to_string(temp_dir.path().join("logs/ignitor-app.log")).unwrap();
        assert!(written.contains("application booted"));
    }
}
