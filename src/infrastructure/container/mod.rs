//! Container module (v2 as default)

pub mod v2;

// Re-export primary types from v2
pub use v2::{BoxError, ContainerError, ContainerStats, ServiceContainer};

/// 服务生命周期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceLifetime {
    /// 整个容器生命周期内只创建一次
    Singleton,
    /// 每次解析创建新实例
    Transient,
}
