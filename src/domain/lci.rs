// ==========================================
// MFA→LCI 过程图构建 - 单组合 LCI
// ==========================================
// 生命周期: 每个请求组合创建一次，并入全局图后只读移交计算器
// ==========================================

use crate::domain::process::{ProcessGraph, ProcessKey};
use crate::domain::types::Scenario;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 组合键 (route, product, year, scenario, location)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombinationKey {
    pub route: String,
    pub product: String,
    pub year: i32,
    pub scenario: Scenario,
    pub location: String,
}

impl fmt::Display for CombinationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "route={}, product={}, year={}, scenario={}, location={}",
            self.route, self.product, self.year, self.scenario, self.location
        )
    }
}

/// 背景数据库快照（情景解析结果）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackgroundSnapshot {
    pub scenario: Scenario,
    pub year: i32,
}

/// 单组合 LCI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleLci {
    pub key: CombinationKey,
    pub main_activity: ProcessKey,
    pub main_activity_name: String,
    pub avoided_activity: ProcessKey,
    pub avoided_activity_name: String,
    /// 总流入量（过程图中的量均按此归一化）
    pub total_inflow_amount: f64,
    pub background: BackgroundSnapshot,
    /// 按回收流名称汇总的回收量（已归一化）
    pub recovered_by_flow: BTreeMap<String, f64>,
    /// 按元素/材料汇总的回收量（已归一化）
    pub recovered_by_material: BTreeMap<String, f64>,
    pub graph: ProcessGraph,
}

/// 交给下游计算器的组合元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LciMetadata {
    pub route: String,
    pub product: String,
    pub scenario: Scenario,
    pub year: i32,
    pub location: String,
    pub main_activity: ProcessKey,
    pub main_activity_name: String,
    pub avoided_activity: ProcessKey,
    pub avoided_activity_name: String,
    pub total_inflow_amount: f64,
    pub background: BackgroundSnapshot,
    pub recovered_by_material: BTreeMap<String, f64>,
}

impl SingleLci {
    pub fn metadata(&self) -> LciMetadata {
        LciMetadata {
            route: self.key.route.clone(),
            product: self.key.product.clone(),
            scenario: self.key.scenario,
            year: self.key.year,
            location: self.key.location.clone(),
            main_activity: self.main_activity.clone(),
            main_activity_name: self.main_activity_name.clone(),
            avoided_activity: self.avoided_activity.clone(),
            avoided_activity_name: self.avoided_activity_name.clone(),
            total_inflow_amount: self.total_inflow_amount,
            background: self.background,
            recovered_by_material: self.recovered_by_material.clone(),
        }
    }
}
