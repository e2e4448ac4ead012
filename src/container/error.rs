use thiserror::Error;

use super::descriptor::BoxError;

/// 容器错误
#[derive(Debug, Error)]
pub enum ContainerError {
    /// 服务未注册
    #[error("Service '{type_name}' is not registered")]
    ServiceNotRegistered { type_name: &'static str },

    /// 循环依赖 - 包含完整的解析链
    #[error("Circular dependency detected: {}", chain.join(" -> "))]
    CircularDependency { chain: Vec<&'static str> },

    /// 工厂返回错误
    #[error("Failed to create service '{type_name}': {source}")]
    CreationFailed {
        type_name: &'static str,
        #[source]
        source: BoxError,
    },

    /// 类型转换失败
    #[error("Type cast failed: expected '{expected}', registration holds a different type")]
    TypeCastFailed { expected: &'static str },
}

impl ContainerError {
    /// 是否为"服务未注册"错误
    pub fn is_not_registered(&self) -> bool {
        matches!(self, ContainerError::ServiceNotRegistered { .. })
    }
}
