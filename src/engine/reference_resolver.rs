// ==========================================
// MFA→LCI 过程图构建 - 外部引用解析器
// ==========================================
// 常规库:   名称 + 地点 精确匹配；多条命中时用参考产品消歧
// 基本流库: 名称 + 类别元组 精确匹配，取第一条，无消歧步骤
// 只缓存成功结果；失败每次重新扫描并报错
// ==========================================

use crate::domain::catalog::{CatalogEntry, ReferenceStore};
use crate::domain::process::ProcessKey;
use crate::domain::types::StoreKind;
use crate::engine::error::{BuildError, BuildResult};
use crate::engine::resolution_cache::{CacheKey, CacheStats, ResolutionCache};
use std::collections::BTreeSet;
use tracing::debug;

/// 类别元组在缓存键中的分隔符
const CATEGORY_SEPARATOR: &str = "::";

/// 解析请求
#[derive(Debug, Clone, Copy)]
pub struct ReferenceQuery<'a> {
    pub kind: StoreKind,
    pub name: &'a str,
    /// 常规库使用
    pub location: &'a str,
    pub reference_product: Option<&'a str>,
    /// 基本流库使用
    pub categories: &'a [String],
}

impl<'a> ReferenceQuery<'a> {
    pub fn technosphere(name: &'a str, location: &'a str, reference_product: Option<&'a str>) -> Self {
        Self {
            kind: StoreKind::Technosphere,
            name,
            location,
            reference_product,
            categories: &[],
        }
    }

    pub fn biosphere(name: &'a str, categories: &'a [String]) -> Self {
        Self {
            kind: StoreKind::Biosphere,
            name,
            location: "",
            reference_product: None,
            categories,
        }
    }

    fn locator(&self) -> String {
        match self.kind {
            StoreKind::Technosphere => self.location.trim().to_string(),
            StoreKind::Biosphere => self
                .categories
                .iter()
                .map(|c| c.trim())
                .collect::<Vec<_>>()
                .join(CATEGORY_SEPARATOR),
        }
    }
}

pub struct ReferenceResolver {
    stores: Vec<ReferenceStore>,
    cache: ResolutionCache,
}

impl ReferenceResolver {
    /// 创建解析器
    ///
    /// # 参数
    /// - stores: 外部目录库；每种类型取第一个
    /// - cache: 注入的缓存实例
    pub fn new(stores: Vec<ReferenceStore>, cache: ResolutionCache) -> Self {
        Self { stores, cache }
    }

    pub fn store(&self, kind: StoreKind) -> Option<&ReferenceStore> {
        self.stores.iter().find(|s| s.kind == kind)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// 解析外部引用
    ///
    /// # 错误
    /// - StoreUnavailable: 未配置该类型的库
    /// - ReferenceNotFound: 无匹配
    /// - AmbiguousReference: 多条匹配且未提供参考产品，或参考产品仍无法区分
    /// - ReferenceProductMismatch: 提供的参考产品不在候选中
    pub fn resolve(&mut self, query: &ReferenceQuery<'_>) -> BuildResult<ProcessKey> {
        let store = self
            .stores
            .iter()
            .find(|s| s.kind == query.kind)
            .ok_or_else(|| BuildError::StoreUnavailable(query.kind.to_string()))?;

        let cache_key = CacheKey {
            store: store.name.clone(),
            name: query.name.trim().to_string(),
            locator: query.locator(),
            reference_product: query
                .reference_product
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
        };

        if let Some(hit) = self.cache.get(&cache_key) {
            debug!(store = %cache_key.store, name = %cache_key.name, locator = %cache_key.locator, "引用解析缓存命中");
            return Ok(hit);
        }

        let entry = match query.kind {
            StoreKind::Technosphere => find_technosphere(store, &cache_key)?,
            StoreKind::Biosphere => find_biosphere(store, &cache_key, query.categories)?,
        };

        let resolved = ProcessKey::new(store.name.clone(), entry.code.clone());
        debug!(store = %store.name, name = %cache_key.name, code = %entry.code, "引用解析完成");
        self.cache.insert(cache_key, resolved.clone());
        Ok(resolved)
    }
}

fn find_technosphere<'s>(store: &'s ReferenceStore, key: &CacheKey) -> BuildResult<&'s CatalogEntry> {
    let matches: Vec<&CatalogEntry> = store
        .entries
        .iter()
        .filter(|e| e.name.trim() == key.name && e.location.trim() == key.locator)
        .collect();

    match matches.as_slice() {
        [] => Err(BuildError::ReferenceNotFound {
            store: store.name.clone(),
            name: key.name.clone(),
            locator: key.locator.clone(),
        }),
        [single] => Ok(*single),
        _ => {
            let candidates = candidate_products(&matches);
            let Some(reference_product) = key.reference_product.as_deref() else {
                return Err(BuildError::AmbiguousReference {
                    store: store.name.clone(),
                    name: key.name.clone(),
                    location: key.locator.clone(),
                    candidates,
                });
            };

            let narrowed: Vec<&CatalogEntry> = matches
                .iter()
                .copied()
                .filter(|e| e.reference_product.trim() == reference_product)
                .collect();

            match narrowed.as_slice() {
                [single] => Ok(*single),
                [] => Err(BuildError::ReferenceProductMismatch {
                    store: store.name.clone(),
                    name: key.name.clone(),
                    location: key.locator.clone(),
                    reference_product: reference_product.to_string(),
                    candidates,
                }),
                _ => Err(BuildError::AmbiguousReference {
                    store: store.name.clone(),
                    name: key.name.clone(),
                    location: key.locator.clone(),
                    candidates,
                }),
            }
        }
    }
}

fn find_biosphere<'s>(
    store: &'s ReferenceStore,
    key: &CacheKey,
    categories: &[String],
) -> BuildResult<&'s CatalogEntry> {
    store
        .entries
        .iter()
        .find(|e| {
            e.name.trim() == key.name
                && e.categories.len() == categories.len()
                && e
                    .categories
                    .iter()
                    .zip(categories)
                    .all(|(a, b)| a.trim() == b.trim())
        })
        .ok_or_else(|| BuildError::ReferenceNotFound {
            store: store.name.clone(),
            name: key.name.clone(),
            locator: key.locator.clone(),
        })
}

/// 候选参考产品（去重排序，逗号拼接）
fn candidate_products(entries: &[&CatalogEntry]) -> String {
    entries
        .iter()
        .map(|e| e.reference_product.trim())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(", ")
}
