//! 服务注册集合
//!
//! 按插入顺序保存描述符。同一服务键可以注册多次，构建时以最后一次注册为准，
//! 这是有意的覆盖机制，不是错误。

use std::sync::Arc;

use super::descriptor::{BoxError, ServiceDescriptor, ServiceKey};
use super::{ServiceLifetime, ServiceProvider};

/// 服务注册集合
#[derive(Clone, Default)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加描述符；同键的后注册覆盖先注册
    pub fn add(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
        self.descriptors.push(descriptor);
        self
    }

    /// 仅当该服务键尚未注册时追加
    pub fn add_if_absent(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
        if !self.contains_key(descriptor.key()) {
            self.descriptors.push(descriptor);
        }
        self
    }

    /// 注册单例服务 - 便捷方法
    pub fn add_singleton<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Arc<T> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::singleton(infallible(factory)))
    }

    /// 注册作用域服务 - 便捷方法
    pub fn add_scoped<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Arc<T> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::scoped(infallible(factory)))
    }

    /// 注册瞬态服务 - 便捷方法
    pub fn add_transient<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Arc<T> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::transient(infallible(factory)))
    }

    /// 注册预建实例
    pub fn add_instance<T>(&mut self, instance: Arc<T>) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::instance(instance))
    }

    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.contains_key(ServiceKey::of::<T>())
    }

    pub fn contains_key(&self, key: ServiceKey) -> bool {
        self.descriptors.iter().any(|d| d.key() == key)
    }

    /// 当前生效的生命周期（最后一次注册）
    pub fn lifetime_of<T: ?Sized + 'static>(&self) -> Option<ServiceLifetime> {
        let key = ServiceKey::of::<T>();
        self.descriptors
            .iter()
            .rev()
            .find(|d| d.key() == key)
            .map(|d| d.lifetime())
    }

    /// 按插入顺序遍历所有描述符（包括被覆盖的）
    pub fn descriptors(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// 从当前注册集合构建新的容器，集合本身不受影响
    pub fn build(&self) -> ServiceProvider {
        ServiceProvider::from_descriptors(self.descriptors.iter().cloned())
    }
}

fn infallible<T, F>(
    factory: F,
) -> impl Fn(&ServiceProvider) -> Result<Arc<T>, BoxError> + Send + Sync + 'static
where
    T: ?Sized + Send + Sync + 'static,
    F: Fn(&ServiceProvider) -> Arc<T> + Send + Sync + 'static,
{
    move |provider: &ServiceProvider| -> Result<Arc<T>, BoxError> { Ok(factory(provider)) }
}
