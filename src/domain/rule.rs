// ==========================================
// MFA→LCI 过程图构建 - LCI 构建规则
// ==========================================
// 每个产品一张规则表，每行描述一个交换
// 规则行在加载时一次性解析为强类型 ExchangeSpecRow
// ==========================================

use crate::domain::types::{FlowDirection, FlowKind, LayerLevel, StoreKind};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 层级说明 (Layer Spec)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerSpec {
    /// 未指定：只统计完全解析到最深层的叶子行
    Unspecified,
    /// 所有材料位于同一层
    Single(LayerLevel),
    /// 逐材料指定层级（与材料列表按位置对齐）
    PerMaterial(Vec<LayerLevel>),
}

impl LayerSpec {
    /// 第 i 个材料所在层级
    ///
    /// Unspecified 返回 None
    pub fn level_for(&self, material_index: usize) -> Option<LayerLevel> {
        match self {
            LayerSpec::Unspecified => None,
            LayerSpec::Single(level) => Some(*level),
            LayerSpec::PerMaterial(levels) => levels.get(material_index).copied(),
        }
    }
}

impl fmt::Display for LayerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerSpec::Unspecified => write!(f, ""),
            LayerSpec::Single(level) => write!(f, "{}", level.index() + 1),
            LayerSpec::PerMaterial(levels) => {
                let parts: Vec<String> = levels.iter().map(|l| (l.index() + 1).to_string()).collect();
                write!(f, "{}", parts.join(","))
            }
        }
    }
}

// ==========================================
// 外部过程引用 (`store:name`)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkedProcess {
    pub store: StoreKind,
    pub name: String,
}

impl LinkedProcess {
    /// 解析 `store:name`
    ///
    /// 只在第一个冒号处切分，过程名本身允许包含冒号
    pub fn parse(raw: &str) -> Option<Self> {
        let (store, name) = raw.split_once(':')?;
        let store = StoreKind::parse(store)?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            store,
            name: name.to_string(),
        })
    }
}

impl fmt::Display for LinkedProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.store, self.name)
    }
}

// ==========================================
// 交换规则行 (Exchange Spec Row)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeSpecRow {
    pub kind: FlowKind,
    pub flow_name: String,
    pub flow_ids: Vec<String>,
    pub materials: Vec<String>,
    pub layer: LayerSpec,
    pub linked_process: Option<LinkedProcess>,
    pub region: Option<String>,
    /// 同名同地点过程存在多个时用于消歧
    pub reference_product: Option<String>,
    pub categories: Vec<String>,
    pub unit: String,
    /// 字面量数量（无流 ID 时的兜底）
    pub amount: Option<f64>,
    /// "按流缩放" 引用的流 ID
    pub scaled_by: Vec<String>,
    pub element_to_compound_ratio: Option<f64>,
    /// 单位重量换算因子（回收量除以该值）
    pub unit_weight: Option<f64>,
    /// 回收效率（回收量乘以该值）
    pub recovery_efficiency: Option<f64>,
    pub direction: FlowDirection,
    /// 源表行号（用于报错定位）
    pub source_row: usize,
}

impl ExchangeSpecRow {
    /// 空白规则行，供加载器与测试逐字段填充
    pub fn new(kind: FlowKind, flow_name: impl Into<String>) -> Self {
        Self {
            kind,
            flow_name: flow_name.into(),
            flow_ids: Vec::new(),
            materials: Vec::new(),
            layer: LayerSpec::Unspecified,
            linked_process: None,
            region: None,
            reference_product: None,
            categories: Vec::new(),
            unit: "kilogram".to_string(),
            amount: None,
            scaled_by: Vec::new(),
            element_to_compound_ratio: None,
            unit_weight: None,
            recovery_efficiency: None,
            direction: match kind {
                FlowKind::Recovered => FlowDirection::Output,
                _ => FlowDirection::Input,
            },
            source_row: 0,
        }
    }
}

// ==========================================
// 规则表 (Rule Sheet)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSheet {
    pub product: String,
    pub rows: Vec<ExchangeSpecRow>,
}

impl RuleSheet {
    pub fn new(product: impl Into<String>, rows: Vec<ExchangeSpecRow>) -> Self {
        Self {
            product: product.into(),
            rows,
        }
    }

    /// 生产行（主活动），取第一条
    pub fn production_row(&self) -> Option<&ExchangeSpecRow> {
        self.rows.iter().find(|r| r.kind == FlowKind::Production)
    }

    pub fn recovered_rows(&self) -> impl Iterator<Item = &ExchangeSpecRow> {
        self.rows.iter().filter(|r| r.kind == FlowKind::Recovered)
    }

    /// 带外部过程引用的非回收行
    pub fn external_rows(&self) -> impl Iterator<Item = &ExchangeSpecRow> {
        self.rows
            .iter()
            .filter(|r| r.kind == FlowKind::External && r.linked_process.is_some())
    }
}
