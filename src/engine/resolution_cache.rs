// ==========================================
// MFA→LCI 过程图构建 - 外部引用解析缓存
// ==========================================
// 外部目录为线性扫描，同一节点在数百个组合中被重复解析，故缓存结果
// 容量固定；溢出时淘汰最早插入的条目（命中不刷新顺序）
// 缓存为显式协作对象，每个解析器/测试可注入全新实例
// ==========================================

use crate::domain::process::ProcessKey;
use std::collections::{HashMap, VecDeque};

/// 默认缓存容量
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// 缓存键 (库标识, 规范化名称, 地点/类别, 参考产品)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub store: String,
    pub name: String,
    /// 常规库: 地点；基本流库: 类别元组拼接
    pub locator: String,
    pub reference_product: Option<String>,
}

/// 缓存统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

#[derive(Debug, Clone)]
pub struct ResolutionCache {
    capacity: usize,
    entries: HashMap<CacheKey, ProcessKey>,
    insertion_order: VecDeque<CacheKey>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl ResolutionCache {
    /// 创建缓存
    ///
    /// capacity 为 0 时按 1 处理
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            insertion_order: VecDeque::with_capacity(capacity),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<ProcessKey> {
        match self.entries.get(key) {
            Some(value) => {
                self.hits += 1;
                Some(value.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: CacheKey, value: ProcessKey) {
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = value;
            return;
        }

        while self.entries.len() >= self.capacity {
            match self.insertion_order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                    self.evictions += 1;
                }
                None => break,
            }
        }

        self.insertion_order.push_back(key.clone());
        self.entries.insert(key, value);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            entries: self.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> CacheKey {
        CacheKey {
            store: "ecoinvent".to_string(),
            name: name.to_string(),
            locator: "RER".to_string(),
            reference_product: None,
        }
    }

    fn value(code: &str) -> ProcessKey {
        ProcessKey::new("ecoinvent", code)
    }

    #[test]
    fn test_evicts_oldest_on_overflow() {
        let mut cache = ResolutionCache::new(2);
        cache.insert(key("a"), value("1"));
        cache.insert(key("b"), value("2"));

        // 命中不改变淘汰顺序
        assert_eq!(cache.get(&key("a")), Some(value("1")));

        cache.insert(key("c"), value("3"));
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&key("a")));
        assert!(cache.contains(&key("b")));
        assert!(cache.contains(&key("c")));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_reinsert_existing_key_does_not_evict() {
        let mut cache = ResolutionCache::new(2);
        cache.insert(key("a"), value("1"));
        cache.insert(key("b"), value("2"));
        cache.insert(key("a"), value("9"));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&key("a")), Some(value("9")));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_hit_and_miss_counters() {
        let mut cache = ResolutionCache::new(4);
        assert_eq!(cache.get(&key("a")), None);
        cache.insert(key("a"), value("1"));
        assert!(cache.get(&key("a")).is_some());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut cache = ResolutionCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.insert(key("a"), value("1"));
        cache.insert(key("b"), value("2"));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&key("b")));
    }
}
