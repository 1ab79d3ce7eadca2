// ==========================================
// MFA→LCI 过程图构建 - LCI 构建规则表加载器
// ==========================================
// 输入: lci_builder.xlsx（每个产品一张工作表）或 lci_builder/<product>.csv
// 职责: 每行一次性解析为强类型 ExchangeSpecRow
// 红线: 聚合/建图逻辑中不再解析原始字符串
// ==========================================

use crate::domain::rule::{ExchangeSpecRow, LayerSpec, LinkedProcess, RuleSheet};
use crate::domain::types::{FlowDirection, FlowKind, LayerLevel};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{CsvParser, ExcelParser, FileParser, RawRecord};
use std::path::Path;
use tracing::debug;

// ==========================================
// 列名常量
// ==========================================
pub mod columns {
    pub const FLOW_TYPE: &str = "LCI Flow Type";
    pub const FLOW_NAME: &str = "LCI Flow Name";
    pub const FLOW_IDS: &str = "Stock/Flow IDs";
    pub const MATERIALS: &str = "Materials";
    pub const LAYER: &str = "Layer";
    pub const LINKED_PROCESS: &str = "Linked process";
    pub const REGION: &str = "Region";
    pub const REFERENCE_PRODUCT: &str = "Reference product";
    pub const CATEGORIES: &str = "Categories";
    pub const UNIT: &str = "Unit";
    pub const AMOUNT: &str = "Amount";
    pub const SCALED_BY: &str = "Scaled by flows";
    pub const ELEMENT_TO_COMPOUND_RATIO: &str = "Element to compound ratio";
    pub const UNIT_WEIGHT: &str = "Unit weight";
    pub const RECOVERY_EFFICIENCY: &str = "Recovery efficiency";
    pub const FLOW_DIRECTION: &str = "Flow Direction";
}

const PRODUCTION: &str = "production";
const RECOVERED: &str = "recovered";

pub struct RuleSheetLoader;

impl RuleSheetLoader {
    /// 从工作簿读取产品规则表
    ///
    /// # 返回
    /// - Ok(None): 工作簿中没有该产品的工作表（组合不适用，跳过）
    pub fn load_from_workbook(
        &self,
        workbook_path: &Path,
        product: &str,
    ) -> ImportResult<Option<RuleSheet>> {
        let parser = ExcelParser;
        let sheet_names = parser.sheet_names(workbook_path)?;
        if !sheet_names.iter().any(|s| s == product) {
            debug!(product, path = %workbook_path.display(), "工作簿中无该产品工作表");
            return Ok(None);
        }

        let (_, raw_records) = parser.parse_sheet(workbook_path, product)?;
        self.map_sheet(product, &raw_records).map(Some)
    }

    /// 从单产品 CSV 读取规则表
    pub fn load_from_csv(&self, csv_path: &Path, product: &str) -> ImportResult<Option<RuleSheet>> {
        if !csv_path.exists() {
            return Ok(None);
        }
        let (_, raw_records) = CsvParser.parse_to_raw_records(csv_path)?;
        self.map_sheet(product, &raw_records).map(Some)
    }

    /// 原始行 → RuleSheet
    pub fn map_sheet(&self, product: &str, raw_records: &[RawRecord]) -> ImportResult<RuleSheet> {
        let mut rows = Vec::with_capacity(raw_records.len());
        for raw in raw_records {
            match map_rule_row(raw)? {
                Some(row) => rows.push(row),
                None => debug!(product, row = raw.row_number, "跳过说明行（无外部过程引用）"),
            }
        }
        Ok(RuleSheet::new(product, rows))
    }
}

/// 单行解析
///
/// # 返回
/// - Ok(None): 既非生产/回收行、又无外部过程引用的说明行
pub fn map_rule_row(raw: &RawRecord) -> ImportResult<Option<ExchangeSpecRow>> {
    let row = raw.row_number;
    let flow_type = raw.get(columns::FLOW_TYPE).to_lowercase();
    let direction_text = raw.get(columns::FLOW_DIRECTION).to_lowercase();

    // 行类型只在这里判定一次
    let kind = if flow_type == PRODUCTION {
        FlowKind::Production
    } else if flow_type == RECOVERED || direction_text == RECOVERED {
        FlowKind::Recovered
    } else {
        FlowKind::External
    };

    let linked_process = match raw.get(columns::LINKED_PROCESS) {
        "" => None,
        text => Some(LinkedProcess::parse(text).ok_or_else(|| {
            ImportError::InvalidLinkedProcess {
                row,
                value: text.to_string(),
            }
        })?),
    };

    if kind == FlowKind::External && linked_process.is_none() {
        return Ok(None);
    }

    let direction = match kind {
        FlowKind::Recovered => FlowDirection::Output,
        FlowKind::Production => FlowDirection::parse(&direction_text).unwrap_or(FlowDirection::Input),
        FlowKind::External => {
            FlowDirection::parse(&direction_text).ok_or_else(|| ImportError::UnknownLiteral {
                row,
                field: columns::FLOW_DIRECTION.to_string(),
                value: raw.get(columns::FLOW_DIRECTION).to_string(),
            })?
        }
    };

    let mut spec = ExchangeSpecRow::new(kind, raw.get(columns::FLOW_NAME));
    spec.flow_ids = split_list(raw.get(columns::FLOW_IDS));
    spec.materials = split_list(raw.get(columns::MATERIALS));
    spec.layer = parse_layer_spec(raw.get(columns::LAYER), row)?;
    spec.linked_process = linked_process;
    spec.region = Some(raw.get(columns::REGION))
        .filter(|r| !r.is_empty())
        .map(String::from);
    spec.reference_product = Some(raw.get(columns::REFERENCE_PRODUCT))
        .filter(|r| !r.is_empty())
        .map(String::from);
    spec.categories = split_list(raw.get(columns::CATEGORIES));
    if !raw.get(columns::UNIT).is_empty() {
        spec.unit = raw.get(columns::UNIT).to_string();
    }
    spec.amount = parse_optional_number(raw, columns::AMOUNT)?;
    spec.scaled_by = split_list(raw.get(columns::SCALED_BY));
    spec.element_to_compound_ratio = parse_optional_number(raw, columns::ELEMENT_TO_COMPOUND_RATIO)?;
    spec.unit_weight = parse_optional_number(raw, columns::UNIT_WEIGHT)?;
    spec.recovery_efficiency = parse_optional_number(raw, columns::RECOVERY_EFFICIENCY)?;
    spec.direction = direction;
    spec.source_row = row;

    Ok(Some(spec))
}

/// 逗号分隔列表（去空白，丢弃空项）
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// 层级说明: "" / "4" / "3,4"
pub fn parse_layer_spec(text: &str, row: usize) -> ImportResult<LayerSpec> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(LayerSpec::Unspecified);
    }

    let parse_one = |part: &str| {
        LayerLevel::parse(part).ok_or_else(|| ImportError::TypeConversionError {
            row,
            field: columns::LAYER.to_string(),
            value: text.to_string(),
        })
    };

    if trimmed.contains(',') {
        let levels = trimmed
            .split(',')
            .map(parse_one)
            .collect::<ImportResult<Vec<_>>>()?;
        Ok(LayerSpec::PerMaterial(levels))
    } else {
        Ok(LayerSpec::Single(parse_one(trimmed)?))
    }
}

/// 可选数值列：空白 → None，非法或非有限值 (NaN/inf) → 报错并给出原值
fn parse_optional_number(raw: &RawRecord, column: &str) -> ImportResult<Option<f64>> {
    let text = raw.get(column);
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| ImportError::TypeConversionError {
            row: raw.row_number,
            field: column.to_string(),
            value: text.to_string(),
        })
}
