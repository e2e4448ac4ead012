//! 服务容器（Service Provider）
//!
//! 构建后只读：描述符表不可变，唯一需要同步的是实例缓存。
//! 每个缓存项是一个 `OnceCell`，保证并发首次解析时工厂最多执行一次。

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use log::{debug, warn};
use once_cell::sync::OnceCell;

use super::descriptor::{ErasedInstance, ServiceDescriptor, ServiceKey, Strategy};
use super::error::ContainerError;
use super::stats::{ContainerStats, InnerStats};
use super::ServiceLifetime;

type InstanceCache = DashMap<ServiceKey, Arc<OnceCell<ErasedInstance>>>;

/// 解析栈中的一项：所属容器的描述符表地址 + 服务键
type StackEntry = (usize, ServiceKey);

thread_local! {
    /// 当前线程的解析栈，用于循环依赖检测
    static RESOLUTION_STACK: RefCell<Vec<StackEntry>> = RefCell::new(Vec::new());
}

/// 解析栈守卫，离开作用域时出栈（包括 panic 展开）
struct ResolutionGuard;

impl ResolutionGuard {
    /// 同一线程上可能交错解析多个容器，只有同一容器内的重复键才算循环
    fn enter(container: usize, key: ServiceKey) -> Result<Self, ContainerError> {
        RESOLUTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let entry = (container, key);
            if let Some(start) = stack.iter().position(|e| *e == entry) {
                let mut chain: Vec<&'static str> = stack[start..]
                    .iter()
                    .filter(|(owner, _)| *owner == container)
                    .map(|(_, k)| k.type_name())
                    .collect();
                chain.push(key.type_name());
                return Err(ContainerError::CircularDependency { chain });
            }
            stack.push(entry);
            Ok(ResolutionGuard)
        })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        RESOLUTION_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// 构建后共享的只读部分
struct Registry {
    descriptors: HashMap<ServiceKey, ServiceDescriptor>,
    /// 有效服务键，按首次注册顺序
    order: Vec<ServiceKey>,
    singletons: InstanceCache,
    root_scope: Arc<InstanceCache>,
    stats: InnerStats,
}

/// 服务容器
///
/// 克隆代价很低，克隆体共享同一份描述符表和缓存。
/// `create_scope` 产生的子容器共享单例缓存，但拥有独立的作用域缓存。
#[derive(Clone)]
pub struct ServiceProvider {
    registry: Arc<Registry>,
    scope: Arc<InstanceCache>,
}

impl ServiceProvider {
    /// 由描述符序列构建容器，同键后注册者覆盖先注册者
    pub(crate) fn from_descriptors(descriptors: impl IntoIterator<Item = ServiceDescriptor>) -> Self {
        let mut table = HashMap::new();
        let mut order = Vec::new();

        for descriptor in descriptors {
            let key = descriptor.key();
            if table.insert(key, descriptor).is_some() {
                debug!(
                    "Service '{}' registered more than once, last registration wins",
                    key.type_name()
                );
            } else {
                order.push(key);
            }
        }

        let root_scope = Arc::new(InstanceCache::new());
        let registry = Registry {
            descriptors: table,
            order,
            singletons: InstanceCache::new(),
            root_scope: root_scope.clone(),
            stats: InnerStats::default(),
        };

        Self {
            registry: Arc::new(registry),
            scope: root_scope,
        }
    }

    /// 解析服务 - 主要API
    pub fn resolve<T>(&self) -> Result<Arc<T>, ContainerError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let instance = self.resolve_key(ServiceKey::of::<T>())?;

        // 安全的类型转换
        instance
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or(ContainerError::TypeCastFailed {
                expected: std::any::type_name::<T>(),
            })
    }

    /// 解析服务，未注册时返回 `None`
    pub fn get<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        match self.resolve::<T>() {
            Ok(service) => Some(service),
            Err(e) if e.is_not_registered() => None,
            Err(e) => {
                warn!("Failed to resolve '{}': {}", std::any::type_name::<T>(), e);
                None
            }
        }
    }

    /// 创建子作用域
    pub fn create_scope(&self) -> ServiceProvider {
        ServiceProvider {
            registry: self.registry.clone(),
            scope: Arc::new(InstanceCache::new()),
        }
    }

    /// 是否为根作用域
    pub fn is_root(&self) -> bool {
        Arc::ptr_eq(&self.scope, &self.registry.root_scope)
    }

    /// 检查服务是否已注册
    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.registry
            .descriptors
            .contains_key(&ServiceKey::of::<T>())
    }

    /// 已注册服务的类型名称，按首次注册顺序
    pub fn registered_services(&self) -> Vec<&'static str> {
        self.registry.order.iter().map(|k| k.type_name()).collect()
    }

    /// 获取容器统计信息
    pub fn get_stats(&self) -> ContainerStats {
        self.registry.stats.snapshot()
    }

    fn root(&self) -> ServiceProvider {
        ServiceProvider {
            registry: self.registry.clone(),
            scope: self.registry.root_scope.clone(),
        }
    }

    /// 容器标识：作用域共享同一描述符表，因此也共享同一标识
    fn container_id(&self) -> usize {
        Arc::as_ptr(&self.registry) as usize
    }

    fn resolve_key(&self, key: ServiceKey) -> Result<ErasedInstance, ContainerError> {
        self.registry.stats.record_resolution();

        let descriptor = self
            .registry
            .descriptors
            .get(&key)
            .ok_or(ContainerError::ServiceNotRegistered {
                type_name: key.type_name(),
            })?;

        // 必须在触碰缓存之前检查，否则重入 OnceCell 会死锁
        let _guard = ResolutionGuard::enter(self.container_id(), key)?;

        match descriptor.lifetime() {
            // 单例工厂总是拿到根容器，避免捕获子作用域的实例
            ServiceLifetime::Singleton => self.root().cached(&self.registry.singletons, descriptor),
            ServiceLifetime::Scoped => self.cached(&self.scope, descriptor),
            ServiceLifetime::Transient => {
                self.registry.stats.record_transient();
                self.create(descriptor)
            }
        }
    }

    fn cached(
        &self,
        cache: &InstanceCache,
        descriptor: &ServiceDescriptor,
    ) -> Result<ErasedInstance, ContainerError> {
        // 先取出 cell 再初始化，不在持有分片锁时执行工厂
        let cell = cache.entry(descriptor.key()).or_default().clone();

        let mut created = false;
        let instance = cell.get_or_try_init(|| {
            created = true;
            self.create(descriptor)
        })?;

        let stats = &self.registry.stats;
        if created {
            stats.record_miss();
            if descriptor.lifetime() == ServiceLifetime::Scoped {
                stats.record_scoped();
            }
        } else {
            stats.record_hit();
        }

        Ok(instance.clone())
    }

    fn create(&self, descriptor: &ServiceDescriptor) -> Result<ErasedInstance, ContainerError> {
        match descriptor.strategy() {
            Strategy::Instance(instance) => Ok(instance.clone()),
            Strategy::Factory(factory) => {
                let type_name = descriptor.key().type_name();
                debug!("Creating {:?} service '{}'", descriptor.lifetime(), type_name);
                (**factory)(self).map_err(|source| ContainerError::CreationFailed { type_name, source })
            }
        }
    }
}

impl fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("services", &self.registered_services())
            .field("root", &self.is_root())
            .finish()
    }
}
