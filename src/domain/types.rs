// ==========================================
// MFA→LCI 过程图构建 - 领域类型定义
// ==========================================
// 规则表中的自由文本在加载时一次性解析为以下闭合枚举，
// 聚合与建图逻辑中不再出现字符串分派
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 规则行类型 (Flow Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowKind {
    Production, // 主活动（回收过程本身）
    External,   // 外部技术圈/生物圈交换
    Recovered,  // 回收材料（计入避免影响）
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowKind::Production => write!(f, "PRODUCTION"),
            FlowKind::External => write!(f, "EXTERNAL"),
            FlowKind::Recovered => write!(f, "RECOVERED"),
        }
    }
}

// ==========================================
// 流向 (Flow Direction)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowDirection {
    Input,
    Output,
}

impl FlowDirection {
    /// 从规则表文本解析（大小写不敏感）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "input" => Some(FlowDirection::Input),
            "output" => Some(FlowDirection::Output),
            _ => None,
        }
    }
}

impl fmt::Display for FlowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowDirection::Input => write!(f, "input"),
            FlowDirection::Output => write!(f, "output"),
        }
    }
}

// ==========================================
// 外部目录库类型 (Store Kind)
// ==========================================
// Technosphere: 常规过程库（按 名称+地点 匹配）
// Biosphere: 基本流库（按 名称+类别元组 匹配）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreKind {
    Technosphere,
    Biosphere,
}

impl StoreKind {
    /// 解析 `store:name` 中的 store 部分
    ///
    /// 兼容背景库常用名称（ECOINVENT / BIOSPHERE / BIOSPHERE3）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ECOINVENT" | "TECHNOSPHERE" => Some(StoreKind::Technosphere),
            "BIOSPHERE" | "BIOSPHERE3" => Some(StoreKind::Biosphere),
            _ => None,
        }
    }

    /// 该库产生的交换类型
    pub fn exchange_type(&self) -> ExchangeType {
        match self {
            StoreKind::Technosphere => ExchangeType::Technosphere,
            StoreKind::Biosphere => ExchangeType::Biosphere,
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Technosphere => write!(f, "TECHNOSPHERE"),
            StoreKind::Biosphere => write!(f, "BIOSPHERE"),
        }
    }
}

// ==========================================
// 交换类型 (Exchange Type)
// ==========================================
// 序列化格式与下游清单计算器一致（小写）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeType {
    Production,
    Technosphere,
    Biosphere,
}

impl fmt::Display for ExchangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeType::Production => write!(f, "production"),
            ExchangeType::Technosphere => write!(f, "technosphere"),
            ExchangeType::Biosphere => write!(f, "biosphere"),
        }
    }
}

// ==========================================
// 情景 (Scenario)
// ==========================================
// OBS: 历史观测; BAU/REC/CIR: 预测情景
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scenario {
    Obs, // 观测
    Bau, // 基准
    Rec, // 回收强化
    Cir, // 循环经济
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [Scenario::Obs, Scenario::Bau, Scenario::Rec, Scenario::Cir];

    /// 流表中使用的情景标签
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Obs => "OBS",
            Scenario::Bau => "BAU",
            Scenario::Rec => "REC",
            Scenario::Cir => "CIR",
        }
    }

    /// 从字符串解析情景（大小写不敏感）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "OBS" => Some(Scenario::Obs),
            "BAU" => Some(Scenario::Bau),
            "REC" => Some(Scenario::Rec),
            "CIR" => Some(Scenario::Cir),
            _ => None,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 层级 (Layer Level)
// ==========================================
// L1 = 顶层产品 ... L4 = 元素材料（最深层）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LayerLevel {
    L1,
    L2,
    L3,
    L4,
}

impl LayerLevel {
    pub const DEEPEST: LayerLevel = LayerLevel::L4;

    /// 流表记录中 layers 数组的下标
    pub fn index(&self) -> usize {
        match self {
            LayerLevel::L1 => 0,
            LayerLevel::L2 => 1,
            LayerLevel::L3 => 2,
            LayerLevel::L4 => 3,
        }
    }

    pub fn is_deepest(&self) -> bool {
        *self == LayerLevel::DEEPEST
    }

    /// 解析层级编号
    ///
    /// Excel 数字单元格可能读成 "4" 或 "4.0"，两者均接受
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        let number = trimmed.parse::<u8>().ok().or_else(|| {
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.fract() == 0.0 && *v >= 1.0 && *v <= 4.0)
                .map(|v| v as u8)
        })?;
        match number {
            1 => Some(LayerLevel::L1),
            2 => Some(LayerLevel::L2),
            3 => Some(LayerLevel::L3),
            4 => Some(LayerLevel::L4),
            _ => None,
        }
    }
}

impl fmt::Display for LayerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Layer {}", self.index() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_level_parse() {
        assert_eq!(LayerLevel::parse("3"), Some(LayerLevel::L3));
        assert_eq!(LayerLevel::parse(" 4.0 "), Some(LayerLevel::L4));
        assert_eq!(LayerLevel::parse("5"), None);
        assert_eq!(LayerLevel::parse("0"), None);
        assert_eq!(LayerLevel::parse("x"), None);
    }

    #[test]
    fn test_store_kind_parse() {
        assert_eq!(StoreKind::parse("ecoinvent"), Some(StoreKind::Technosphere));
        assert_eq!(StoreKind::parse("BIOSPHERE"), Some(StoreKind::Biosphere));
        assert_eq!(StoreKind::parse("premise"), None);
    }

    #[test]
    fn test_scenario_roundtrip_label() {
        for scenario in Scenario::ALL {
            assert_eq!(Scenario::parse(scenario.as_str()), Some(scenario));
        }
        assert_eq!(Scenario::parse("cir"), Some(Scenario::Cir));
    }
}
