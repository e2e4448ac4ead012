//! 服务描述符
//!
//! 描述符 = 服务键 + 生命周期 + 构造策略（工厂或预建实例）

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::{ServiceLifetime, ServiceProvider};

/// 工厂返回的错误类型
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 类型擦除后的实例，内部实际保存的是 `Arc<T>`
pub(crate) type ErasedInstance = Arc<dyn Any + Send + Sync>;

type ErasedFactory =
    Arc<dyn Fn(&ServiceProvider) -> Result<ErasedInstance, BoxError> + Send + Sync>;

/// 服务键
///
/// 由服务类型 `T` 静态推导，`T` 可以是 `dyn Trait`。
/// 相等性与哈希只看 `TypeId`，类型名仅用于错误信息。
#[derive(Clone, Copy)]
pub struct ServiceKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl ServiceKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

#[derive(Clone)]
pub(crate) enum Strategy {
    Factory(ErasedFactory),
    Instance(ErasedInstance),
}

/// 服务描述符
#[derive(Clone)]
pub struct ServiceDescriptor {
    key: ServiceKey,
    lifetime: ServiceLifetime,
    strategy: Strategy,
}

impl ServiceDescriptor {
    /// 以工厂函数注册，工厂可失败
    pub fn from_factory<T, F>(lifetime: ServiceLifetime, factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        let erased: ErasedFactory = Arc::new(
            move |provider: &ServiceProvider| -> Result<ErasedInstance, BoxError> {
                let service = factory(provider)?;
                Ok(Arc::new(service) as ErasedInstance)
            },
        );
        Self {
            key: ServiceKey::of::<T>(),
            lifetime,
            strategy: Strategy::Factory(erased),
        }
    }

    pub fn singleton<T, F>(factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        Self::from_factory(ServiceLifetime::Singleton, factory)
    }

    pub fn scoped<T, F>(factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        Self::from_factory(ServiceLifetime::Scoped, factory)
    }

    pub fn transient<T, F>(factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        Self::from_factory(ServiceLifetime::Transient, factory)
    }

    /// 预建实例，生命周期固定为单例
    pub fn instance<T>(instance: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self {
            key: ServiceKey::of::<T>(),
            lifetime: ServiceLifetime::Singleton,
            strategy: Strategy::Instance(Arc::new(instance)),
        }
    }

    pub fn key(&self) -> ServiceKey {
        self.key
    }

    pub fn lifetime(&self) -> ServiceLifetime {
        self.lifetime
    }

    pub fn is_instance(&self) -> bool {
        matches!(self.strategy, Strategy::Instance(_))
    }

    pub(crate) fn strategy(&self) -> &Strategy {
        &self.strategy
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("key", &self.key)
            .field("lifetime", &self.lifetime)
            .field("instance", &self.is_instance())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {}

    #[test]
    fn test_key_equality_ignores_name_and_supports_unsized() {
        assert_eq!(ServiceKey::of::<String>(), ServiceKey::of::<String>());
        assert_ne!(ServiceKey::of::<String>(), ServiceKey::of::<str>());
        assert_ne!(ServiceKey::of::<dyn Greeter>(), ServiceKey::of::<String>());
        assert!(ServiceKey::of::<dyn Greeter>().type_name().contains("Greeter"));
    }

    #[test]
    fn test_instance_descriptor_is_singleton() {
        let descriptor = ServiceDescriptor::instance(Arc::new(7u32));
        assert_eq!(descriptor.lifetime(), ServiceLifetime::Singleton);
        assert!(descriptor.is_instance());
        assert_eq!(descriptor.key(), ServiceKey::of::<u32>());
    }

    #[test]
    fn test_factory_descriptor_keeps_lifetime() {
        let descriptor = ServiceDescriptor::transient(|_| Ok(Arc::new(String::from("x"))));
        assert_eq!(descriptor.lifetime(), ServiceLifetime::Transient);
        assert!(!descriptor.is_instance());
    }
}
