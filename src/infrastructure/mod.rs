//! 基础设施层
//!
//! 提供具体的技术实现，包括：
//! - 依赖注入容器
//! - 服务提供者

// 容器实现
pub mod container;
pub mod provider;

// 重新导出API
pub use container::{BoxError, ContainerError, ServiceContainer, ServiceLifetime};
pub use provider::{AppProvider, ServiceProvider};
