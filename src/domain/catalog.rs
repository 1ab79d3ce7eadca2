// ==========================================
// MFA→LCI 过程图构建 - 外部目录库
// ==========================================
// 大型外部目录（背景数据库导出），按名称解析交换目标
// 常规库: {name, location, reference product, code}
// 基本流库: {name, categories, code}
// ==========================================

use crate::domain::types::StoreKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub reference_product: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceStore {
    /// 库名（同时作为解析结果 ProcessKey.database）
    pub name: String,
    pub kind: StoreKind,
    pub entries: Vec<CatalogEntry>,
}

impl ReferenceStore {
    pub fn new(name: impl Into<String>, kind: StoreKind, entries: Vec<CatalogEntry>) -> Self {
        Self {
            name: name.into(),
            kind,
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
