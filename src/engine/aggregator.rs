// ==========================================
// MFA→LCI 过程图构建 - 流量聚合器
// ==========================================
// 纯函数: 在 流ID / 材料 / 顶层产品 / 层级 过滤下对 Value 求和
//
// 层级规则:
// - 未指定: 只统计最深层非空的叶子行（总流入量）
// - 单层:   指定层等于材料之一；若该层不是最深层，要求最深层为空，
//           避免把已继续细分的行重复计入
// - 多层:   每个材料在各自声明的层独立计算后相加
// ==========================================

use crate::domain::flow::{FlowRecord, FlowTable};
use crate::domain::rule::LayerSpec;
use crate::domain::types::LayerLevel;
use crate::engine::error::{BuildError, BuildResult};

/// 聚合查询
#[derive(Debug, Clone, Copy)]
pub struct FlowQuery<'a> {
    pub flow_ids: &'a [String],
    /// 允许的顶层产品（Layer 1）
    pub products: &'a [String],
    /// 材料过滤，空 = 不过滤
    pub materials: &'a [String],
    pub layer: &'a LayerSpec,
}

pub struct FlowAggregator;

impl FlowAggregator {
    /// 按查询求和
    ///
    /// # 错误
    /// - LayerMaterialMismatch: 多层说明的层级数与材料数不一致
    pub fn calculate(table: &FlowTable, query: &FlowQuery<'_>) -> BuildResult<f64> {
        match query.layer {
            LayerSpec::Unspecified => Ok(Self::sum_leaf_rows(table, query.flow_ids, query.products)),
            LayerSpec::Single(level) => Ok(Self::sum_in_layer(
                table,
                query.flow_ids,
                query.products,
                *level,
                |value| query.materials.is_empty() || query.materials.iter().any(|m| m == value),
            )),
            LayerSpec::PerMaterial(levels) => {
                if levels.len() != query.materials.len() {
                    return Err(BuildError::LayerMaterialMismatch {
                        layers: levels.len(),
                        materials: query.materials.len(),
                    });
                }
                Ok(levels
                    .iter()
                    .zip(query.materials.iter())
                    .map(|(level, material)| {
                        Self::sum_in_layer(table, query.flow_ids, query.products, *level, |value| {
                            value == material
                        })
                    })
                    .sum())
            }
        }
    }

    /// 总流入量（层级未指定）
    pub fn total_inflow(table: &FlowTable, flow_ids: &[String], products: &[String]) -> f64 {
        Self::sum_leaf_rows(table, flow_ids, products)
    }

    fn sum_leaf_rows(table: &FlowTable, flow_ids: &[String], products: &[String]) -> f64 {
        table
            .iter()
            .filter(|r| in_flow_set(r, flow_ids))
            .filter(|r| !r.is_deepest_blank())
            .filter(|r| in_products(r, products))
            .map(|r| r.value)
            .sum()
    }

    fn sum_in_layer<F>(
        table: &FlowTable,
        flow_ids: &[String],
        products: &[String],
        level: LayerLevel,
        material_filter: F,
    ) -> f64
    where
        F: Fn(&str) -> bool,
    {
        table
            .iter()
            .filter(|r| material_filter(r.layer(level)))
            .filter(|r| in_flow_set(r, flow_ids))
            .filter(|r| level.is_deepest() || r.is_deepest_blank())
            .filter(|r| in_products(r, products))
            .map(|r| r.value)
            .sum()
    }
}

fn in_flow_set(record: &FlowRecord, flow_ids: &[String]) -> bool {
    flow_ids.iter().any(|id| *id == record.flow_id)
}

fn in_products(record: &FlowRecord, products: &[String]) -> bool {
    products.iter().any(|p| p == record.top_layer())
}
