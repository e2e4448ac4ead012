//! 依赖注入容器
//!
//! 注册 → 构建 → 解析：
//! - `ServiceCollection` 收集服务描述符（保持插入顺序）
//! - `ServiceProvider` 由描述符表构建，构建后只读
//! - 单例按容器缓存，作用域实例按作用域缓存，瞬态每次新建

mod collection;
mod descriptor;
mod error;
mod provider;
mod stats;

pub use collection::ServiceCollection;
pub use descriptor::{BoxError, ServiceDescriptor, ServiceKey};
pub use error::ContainerError;
pub use provider::ServiceProvider;
pub use stats::ContainerStats;

/// Service lifetime policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceLifetime {
    /// Single instance per built container
    Singleton,
    /// One instance per scope; the root provider is the root scope
    Scoped,
    /// New instance per resolve
    Transient,
}
