use std::sync::atomic::{AtomicUsize, Ordering};

/// 内部容器统计信息（原子计数器）
#[derive(Default)]
pub(crate) struct InnerStats {
    total_resolutions: AtomicUsize,
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
    transient_creations: AtomicUsize,
    scoped_creations: AtomicUsize,
}

impl InnerStats {
    pub(crate) fn record_resolution(&self) {
        self.total_resolutions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_transient(&self) {
        self.transient_creations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_scoped(&self) {
        self.scoped_creations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> ContainerStats {
        ContainerStats {
            total_resolutions: self.total_resolutions.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            transient_creations: self.transient_creations.load(Ordering::Relaxed),
            scoped_creations: self.scoped_creations.load(Ordering::Relaxed),
        }
    }
}

/// 容器统计信息
///
/// 缓存命中/未命中只统计单例与作用域服务；`scoped_creations` 是作用域实例的实际创建次数。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerStats {
    pub total_resolutions: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub transient_creations: usize,
    pub scoped_creations: usize,
}

impl ContainerStats {
    /// 获取总解析次数
    pub fn total(&self) -> usize {
        self.total_resolutions
    }

    /// 获取缓存命中率
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / lookups as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_without_lookups_is_zero() {
        assert_eq!(ContainerStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_snapshot_reflects_counters() {
        let stats = InnerStats::default();
        stats.record_resolution();
        stats.record_resolution();
        stats.record_miss();
        stats.record_hit();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total(), 2);
        assert_eq!(snapshot.hit_rate(), 0.5);
    }
}
