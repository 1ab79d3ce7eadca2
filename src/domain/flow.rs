// ==========================================
// MFA→LCI 过程图构建 - 流表实体
// ==========================================
// 流表: 每条路线一份的 MFA 质量流数据（四级层级分类）
// 空白单元格统一为空字符串哨兵值，不转为 0 或 None
// ==========================================

use crate::domain::types::LayerLevel;
use serde::{Deserialize, Serialize};

/// 层级列数量
pub const LAYER_COUNT: usize = 4;

/// 流表记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub flow_id: String,
    /// Layer 1..Layer 4，空字符串 = 此层未再细分
    pub layers: [String; LAYER_COUNT],
    pub value: f64,
    pub year: i32,
    pub scenario: String,
    pub location: String,
}

impl FlowRecord {
    pub fn layer(&self, level: LayerLevel) -> &str {
        &self.layers[level.index()]
    }

    /// 顶层产品（Layer 1）
    pub fn top_layer(&self) -> &str {
        self.layer(LayerLevel::L1)
    }

    /// 最深层（Layer 4）是否为空
    pub fn is_deepest_blank(&self) -> bool {
        self.layer(LayerLevel::DEEPEST).is_empty()
    }
}

/// 流表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowTable {
    pub records: Vec<FlowRecord>,
}

impl FlowTable {
    pub fn new(records: Vec<FlowRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlowRecord> {
        self.records.iter()
    }

    /// 按 年份 + 情景 过滤
    ///
    /// 地点不参与过滤，仅作为组合元数据
    pub fn filter_year_scenario(&self, year: i32, scenario: &str) -> FlowTable {
        FlowTable {
            records: self
                .records
                .iter()
                .filter(|r| r.year == year && r.scenario == scenario)
                .cloned()
                .collect(),
        }
    }
}

impl FromIterator<FlowRecord> for FlowTable {
    fn from_iter<I: IntoIterator<Item = FlowRecord>>(iter: I) -> Self {
        FlowTable {
            records: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(flow_id: &str, year: i32, scenario: &str) -> FlowRecord {
        FlowRecord {
            flow_id: flow_id.to_string(),
            layers: [
                "battNiMH".to_string(),
                String::new(),
                String::new(),
                String::new(),
            ],
            value: 1.0,
            year,
            scenario: scenario.to_string(),
            location: "EU27+4".to_string(),
        }
    }

    #[test]
    fn test_filter_year_scenario() {
        let table: FlowTable = vec![
            record("A", 2020, "OBS"),
            record("A", 2030, "OBS"),
            record("A", 2020, "BAU"),
        ]
        .into_iter()
        .collect();

        let filtered = table.filter_year_scenario(2020, "OBS");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.records[0].year, 2020);
        assert_eq!(filtered.records[0].scenario, "OBS");
    }

    #[test]
    fn test_blank_deepest_layer() {
        let r = record("A", 2020, "OBS");
        assert!(r.is_deepest_blank());
        assert_eq!(r.top_layer(), "battNiMH");
    }
}
