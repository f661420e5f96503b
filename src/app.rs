//! 应用启动入口

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{Config, Env};
use crate::errors::AppResult;
use crate::infrastructure::{AppProvider, ServiceContainer, ServiceProvider};
use crate::logger::LoggerManager;
use crate::utils::Helpers;

/// 应用程序：持有容器与提供者列表
pub struct Application {
    helpers: Arc<Helpers>,
    container: ServiceContainer,
    providers: Vec<Arc<dyn ServiceProvider>>,
    booted: bool,
}

impl Application {
    /// 以应用根目录创建，默认包含 [`AppProvider`]
    pub fn new(app_root: impl Into<PathBuf>) -> Self {
        let helpers = Arc::new(Helpers::new(app_root));
        Self {
            providers: vec![Arc::new(AppProvider::new(helpers.clone()))],
            helpers,
            container: ServiceContainer::new(),
            booted: false,
        }
    }

    /// 追加提供者，按添加顺序注册与启动
    pub fn with_provider(mut self, provider: impl ServiceProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// 注册并启动所有提供者，重复调用无效果
    pub async fn fire(&mut self) -> AppResult<()> {
        if self.booted {
            return Ok(());
        }

        for provider in &self.providers {
            provider.register(&self.container).await?;
            tracing::debug!("服务提供者 '{}' 已注册", provider.name());
        }
        for provider in &self.providers {
            provider.boot(&self.container).await?;
        }

        self.booted = true;
        tracing::info!(
            root = %self.helpers.app_root().display(),
            providers = self.providers.len(),
            "应用已启动"
        );
        Ok(())
    }

    pub fn is_booted(&self) -> bool {
        self.booted
    }

    pub fn container(&self) -> &ServiceContainer {
        &self.container
    }

    pub fn helpers(&self) -> &Arc<Helpers> {
        &self.helpers
    }

    pub async fn config(&self) -> AppResult<Arc<Config>> {
        Ok(self.container.resolve::<Config>().await?)
    }

    pub async fn env(&self) -> AppResult<Arc<Env>> {
        Ok(self.container.resolve::<Env>().await?)
    }

    pub async fn logger(&self) -> AppResult<Arc<LoggerManager>> {
        Ok(self.container.resolve::<LoggerManager>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct CountingProvider {
        registered: Arc<AtomicUsize>,
        booted: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ServiceProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        async fn register(&self, _container: &ServiceContainer) -> AppResult<()> {
            self.registered.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn boot(&self, container: &ServiceContainer) -> AppResult<()> {
            // 启动阶段可以使用其他提供者注册的服务
            container.resolve::<LoggerManager>().await?;
            self.booted.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_fire_runs_register_then_boot_once() {
        let temp_dir = TempDir::new().unwrap();
        let registered = Arc::new(AtomicUsize::new(0));
        let booted = Arc::new(AtomicUsize::new(0));

        let mut app = Application::new(temp_dir.path()).with_provider(CountingProvider {
            registered: registered.clone(),
            booted: booted.clone(),
        });
        assert!(!app.is_booted());

        app.fire().await.unwrap();
        app.fire().await.unwrap();

        assert!(app.is_booted());
        assert_eq!(registered.load(Ordering::SeqCst), 1);
        assert_eq!(booted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_core_services_resolve_after_fire() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = Application::new(temp_dir.path());
        app.fire().await.unwrap();

        let config = app.config().await.unwrap();
        assert!(config.get("app").is_none());
        assert!(app.env().await.unwrap().is_empty());
        assert_eq!(app.logger().await.unwrap().default_driver_name(), "file");
        assert_eq!(app.helpers().app_root(), temp_dir.path());
    }
}
