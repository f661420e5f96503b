//! 依赖注入容器
//!
//! - 以 `TypeId` 为键注册工厂，解析结果为 `Arc<T>`
//! - 单例通过 `OnceCell` 保证并发解析时只创建一次
//! - 工厂可以是同步闭包，也可以是异步闭包（用于在工厂内解析其他服务）
//! - 字符串别名映射到具体类型，解析时校验类型一致

use dashmap::DashMap;
use futures_util::future::BoxFuture;
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::ServiceLifetime;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

type ServiceRef = Arc<dyn Any + Send + Sync>;

/// 容器错误类型
#[derive(Debug)]
pub enum ContainerError {
    /// 服务未注册
    ServiceNotRegistered(&'static str),
    /// 别名未注册
    AliasNotRegistered(String),
    /// 类型转换失败
    TypeCastFailed {
        expected: String,
        actual: String,
    },
    /// 服务创建失败
    CreationFailed(String),
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerError::ServiceNotRegistered(type_name) => {
                write!(f, "Service not registered: {}", type_name)
            }
            ContainerError::AliasNotRegistered(alias) => {
                write!(f, "Alias not registered: {}", alias)
            }
            ContainerError::TypeCastFailed { expected, actual } => {
                write!(f, "Type cast failed: expected {}, got {}", expected, actual)
            }
            ContainerError::CreationFailed(msg) => {
                write!(f, "Service creation failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for ContainerError {}

/// 服务工厂trait
pub trait ServiceFactory: Send + Sync {
    /// 创建服务实例
    fn create(&self, container: ServiceContainer) -> BoxFuture<'static, Result<ServiceRef, ContainerError>>;

    fn lifetime(&self) -> ServiceLifetime;

    /// 获取服务类型名称（用于错误信息）
    fn service_type_name(&self) -> &'static str;
}

/// 同步闭包工厂
struct FnServiceFactory<F, T> {
    factory_fn: F,
    lifetime: ServiceLifetime,
    _phantom: std::marker::PhantomData<fn() -> T>,
}

impl<F, T> ServiceFactory for FnServiceFactory<F, T>
where
    F: Fn(&ServiceContainer) -> Result<T, BoxError> + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    fn create(&self, container: ServiceContainer) -> BoxFuture<'static, Result<ServiceRef, ContainerError>> {
        let result = (self.factory_fn)(&container)
            .map(|service| Arc::new(service) as ServiceRef)
            .map_err(|e| ContainerError::CreationFailed(e.to_string()));
        Box::pin(futures_util::future::ready(result))
    }

    fn lifetime(&self) -> ServiceLifetime {
        self.lifetime
    }

    fn service_type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// 异步闭包工厂
struct AsyncFnServiceFactory<F, T> {
    factory_fn: F,
    lifetime: ServiceLifetime,
    _phantom: std::marker::PhantomData<fn() -> T>,
}

impl<F, Fut, T> ServiceFactory for AsyncFnServiceFactory<F, T>
where
    F: Fn(ServiceContainer) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
    T: Send + Sync + 'static,
{
    fn create(&self, container: ServiceContainer) -> BoxFuture<'static, Result<ServiceRef, ContainerError>> {
        let pending = (self.factory_fn)(container);
        Box::pin(async move {
            pending
                .await
                .map(|service| Arc::new(service) as ServiceRef)
                .map_err(|e| ContainerError::CreationFailed(e.to_string()))
        })
    }

    fn lifetime(&self) -> ServiceLifetime {
        self.lifetime
    }

    fn service_type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// 预先构建的实例
struct InstanceFactory {
    service: ServiceRef,
    type_name: &'static str,
}

impl ServiceFactory for InstanceFactory {
    fn create(&self, _container: ServiceContainer) -> BoxFuture<'static, Result<ServiceRef, ContainerError>> {
        Box::pin(futures_util::future::ready(Ok(self.service.clone())))
    }

    fn lifetime(&self) -> ServiceLifetime {
        ServiceLifetime::Singleton
    }

    fn service_type_name(&self) -> &'static str {
        self.type_name
    }
}

#[derive(Debug, Clone, Copy)]
struct Alias {
    type_id: TypeId,
    type_name: &'static str,
}

/// 服务容器，克隆后共享同一份注册表
#[derive(Clone)]
pub struct ServiceContainer {
    factories: Arc<DashMap<TypeId, Arc<dyn ServiceFactory>>>,
    singletons: Arc<DashMap<TypeId, Arc<OnceCell<ServiceRef>>>>,
    aliases: Arc<DashMap<String, Alias>>,
    stats: Arc<InnerStats>,
}

/// 内部容器统计信息（原子计数器）
#[derive(Default)]
struct InnerStats {
    total_resolutions: AtomicUsize,
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self {
            factories: Arc::new(DashMap::new()),
            singletons: Arc::new(DashMap::new()),
            aliases: Arc::new(DashMap::new()),
            stats: Arc::new(InnerStats::default()),
        }
    }

    /// 注册同步工厂，重复注册同一类型时替换旧工厂并丢弃已缓存的单例
    pub fn register<T, F>(&self, lifetime: ServiceLifetime, factory: F)
    where
        F: Fn(&ServiceContainer) -> Result<T, BoxError> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.insert_factory::<T>(Arc::new(FnServiceFactory {
            factory_fn: factory,
            lifetime,
            _phantom: std::marker::PhantomData,
        }));
    }

    /// 注册异步工厂
    pub fn register_async<T, F, Fut>(&self, lifetime: ServiceLifetime, factory: F)
    where
        F: Fn(ServiceContainer) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
        T: Send + Sync + 'static,
    {
        self.insert_factory::<T>(Arc::new(AsyncFnServiceFactory {
            factory_fn: factory,
            lifetime,
            _phantom: std::marker::PhantomData,
        }));
    }

    /// 注册单例服务 - 便捷方法
    pub fn singleton<T, F>(&self, factory: F)
    where
        F: Fn(&ServiceContainer) -> T + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.register(ServiceLifetime::Singleton, move |container| Ok(factory(container)));
    }

    /// 注册瞬态服务 - 便捷方法
    pub fn bind<T, F>(&self, factory: F)
    where
        F: Fn(&ServiceContainer) -> T + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.register(ServiceLifetime::Transient, move |container| Ok(factory(container)));
    }

    pub fn singleton_async<T, F, Fut>(&self, factory: F)
    where
        F: Fn(ServiceContainer) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
        T: Send + Sync + 'static,
    {
        self.register_async(ServiceLifetime::Singleton, factory);
    }

    pub fn bind_async<T, F, Fut>(&self, factory: F)
    where
        F: Fn(ServiceContainer) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
        T: Send + Sync + 'static,
    {
        self.register_async(ServiceLifetime::Transient, factory);
    }

    /// 注册已构建的实例，解析时返回同一个 `Arc`
    pub fn instance<T: Send + Sync + 'static>(&self, service: Arc<T>) {
        self.insert_factory::<T>(Arc::new(InstanceFactory {
            service,
            type_name: type_name::<T>(),
        }));
    }

    /// 为已注册类型添加字符串别名
    pub fn alias<T: 'static>(&self, name: impl Into<String>) {
        let name = name.into();
        tracing::debug!("别名 '{}' -> {}", name, type_name::<T>());
        self.aliases.insert(
            name,
            Alias {
                type_id: TypeId::of::<T>(),
                type_name: type_name::<T>(),
            },
        );
    }

    /// 解析服务 - 主要API
    pub async fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ContainerError> {
        self.stats.total_resolutions.fetch_add(1, Ordering::Relaxed);

        let type_id = TypeId::of::<T>();
        let factory = self
            .factories
            .get(&type_id)
            .map(|entry| entry.value().clone())
            .ok_or(ContainerError::ServiceNotRegistered(type_name::<T>()))?;

        if factory.lifetime() == ServiceLifetime::Transient {
            self.stats.cache_misses.fetch_add(1, Ordering::Relaxed);
            let service = factory.create(self.clone()).await?;
            return downcast::<T>(service, factory.service_type_name());
        }

        let cell = self
            .singletons
            .entry(type_id)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        if let Some(service) = cell.get() {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return downcast::<T>(service.clone(), factory.service_type_name());
        }

        self.stats.cache_misses.fetch_add(1, Ordering::Relaxed);
        let service = cell
            .get_or_try_init(|| factory.create(self.clone()))
            .await?
            .clone();
        downcast::<T>(service, factory.service_type_name())
    }

    /// 通过别名解析，别名指向的类型必须与 `T` 一致
    pub async fn resolve_alias<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, ContainerError> {
        let alias = self
            .aliases
            .get(name)
            .map(|entry| *entry.value())
            .ok_or_else(|| ContainerError::AliasNotRegistered(name.to_string()))?;

        if alias.type_id != TypeId::of::<T>() {
            return Err(ContainerError::TypeCastFailed {
                expected: type_name::<T>().to_string(),
                actual: alias.type_name.to_string(),
            });
        }
        self.resolve::<T>().await
    }

    /// 检查服务是否已注册
    pub fn is_registered<T: 'static>(&self) -> bool {
        self.factories.contains_key(&TypeId::of::<T>())
    }

    pub fn has_alias(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    /// 全部别名（已排序）
    pub fn aliases(&self) -> Vec<String> {
        let mut names: Vec<String> = self.aliases.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// 获取容器统计信息
    pub fn get_stats(&self) -> ContainerStats {
        ContainerStats {
            total_resolutions: self.stats.total_resolutions.load(Ordering::Relaxed),
            cache_hits: self.stats.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.stats.cache_misses.load(Ordering::Relaxed),
        }
    }

    fn insert_factory<T: 'static>(&self, factory: Arc<dyn ServiceFactory>) {
        let type_id = TypeId::of::<T>();
        if self.factories.insert(type_id, factory).is_some() {
            self.singletons.remove(&type_id);
            tracing::debug!("服务 {} 已重新注册", type_name::<T>());
        }
    }
}

impl Default for ServiceContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("services", &self.factories.len())
            .field("aliases", &self.aliases())
            .finish()
    }
}

fn downcast<T: Send + Sync + 'static>(service: ServiceRef, actual: &'static str) -> Result<Arc<T>, ContainerError> {
    service.downcast::<T>().map_err(|_| ContainerError::TypeCastFailed {
        expected: type_name::<T>().to_string(),
        actual: actual.to_string(),
    })
}

/// 容器统计信息
#[derive(Debug, Clone)]
pub struct ContainerStats {
    pub total_resolutions: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
}

impl ContainerStats {
    /// 获取总解析次数
    pub fn total(&self) -> usize {
        self.total_resolutions
    }

    /// 获取缓存命中率
    pub fn hit_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.total() as f64
        }
    }
}
