// ==========================================
// MFA→LCI 过程图构建 - 流表加载器
// ==========================================
// 输入: rm_output.csv（MFA 模型输出）
// 列: Stock/Flow ID, Year, Scenario, Location, Layer 1..4, Value
// ==========================================

use crate::domain::flow::{FlowRecord, FlowTable, LAYER_COUNT};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{RawRecord, UniversalFileParser};
use std::path::Path;
use tracing::debug;

// ==========================================
// 列名常量
// ==========================================
pub mod columns {
    pub const FLOW_ID: &str = "Stock/Flow ID";
    pub const YEAR: &str = "Year";
    pub const SCENARIO: &str = "Scenario";
    pub const LOCATION: &str = "Location";
    pub const VALUE: &str = "Value";
    pub const LAYERS: [&str; 4] = ["Layer 1", "Layer 2", "Layer 3", "Layer 4"];
}

/// 必需列（缺一不可）
pub fn required_columns() -> Vec<&'static str> {
    let mut cols = vec![
        columns::YEAR,
        columns::SCENARIO,
        columns::LOCATION,
        columns::FLOW_ID,
        columns::VALUE,
    ];
    cols.extend_from_slice(&columns::LAYERS);
    cols
}

/// 校验表头包含全部必需列
///
/// 缺失列按字母序列出
pub fn validate_columns(source_name: &str, headers: &[String]) -> ImportResult<()> {
    let mut missing: Vec<&str> = required_columns()
        .into_iter()
        .filter(|c| !headers.iter().any(|h| h == c))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    missing.sort_unstable();
    Err(ImportError::MissingColumns {
        source_name: source_name.to_string(),
        columns: missing.join(", "),
    })
}

pub struct FlowTableLoader;

impl FlowTableLoader {
    /// 从文件加载流表（CSV 或 Excel 第一个工作表）
    pub fn load<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<FlowTable> {
        let path = file_path.as_ref();
        let (headers, raw_records) = UniversalFileParser.parse(path)?;
        validate_columns(&path.display().to_string(), &headers)?;

        let records = raw_records
            .iter()
            .map(map_flow_record)
            .collect::<ImportResult<Vec<_>>>()?;

        debug!(path = %path.display(), rows = records.len(), "流表加载完成");
        Ok(FlowTable::new(records))
    }
}

/// 原始行 → FlowRecord
///
/// 空白 Value 记为 0，NaN/inf 视为非法数值；层级列保持空字符串
pub fn map_flow_record(raw: &RawRecord) -> ImportResult<FlowRecord> {
    let row = raw.row_number;

    let year_text = raw.get(columns::YEAR);
    let year = parse_year(year_text).ok_or_else(|| ImportError::TypeConversionError {
        row,
        field: columns::YEAR.to_string(),
        value: year_text.to_string(),
    })?;

    let value_text = raw.get(columns::VALUE);
    let value = if value_text.is_empty() {
        0.0
    } else {
        value_text
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ImportError::TypeConversionError {
                row,
                field: columns::VALUE.to_string(),
                value: value_text.to_string(),
            })?
    };

    let mut layers: [String; LAYER_COUNT] = Default::default();
    for (slot, column) in layers.iter_mut().zip(columns::LAYERS.iter()) {
        *slot = raw.get(column).to_string();
    }

    Ok(FlowRecord {
        flow_id: raw.get(columns::FLOW_ID).to_string(),
        layers,
        value,
        year,
        scenario: raw.get(columns::SCENARIO).to_string(),
        location: raw.get(columns::LOCATION).to_string(),
    })
}

/// 年份允许写成 "2030" 或 "2030.0"
fn parse_year(text: &str) -> Option<i32> {
    text.parse::<i32>().ok().or_else(|| {
        text.parse::<f64>()
            .ok()
            .filter(|v| v.fract() == 0.0)
            .map(|v| v as i32)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn raw(pairs: &[(&str, &str)]) -> RawRecord {
        RawRecord {
            row_number: 2,
            cells: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn test_map_flow_record() {
        let record = map_flow_record(&raw(&[
            ("Stock/Flow ID", "BATT_IN"),
            ("Year", "2030.0"),
            ("Scenario", "CIR"),
            ("Location", "EU27+4"),
            ("Layer 1", "battNiMH"),
            ("Layer 4", "Ni"),
            ("Value", "12.5"),
        ]))
        .unwrap();

        assert_eq!(record.year, 2030);
        assert_eq!(record.value, 12.5);
        assert_eq!(record.layers[0], "battNiMH");
        assert_eq!(record.layers[1], "");
        assert_eq!(record.layers[3], "Ni");
    }

    #[test]
    fn test_blank_value_is_zero() {
        let record = map_flow_record(&raw(&[("Year", "2020"), ("Value", "")])).unwrap();
        assert_eq!(record.value, 0.0);
    }

    #[test]
    fn test_malformed_value_names_offending_text() {
        let err = map_flow_record(&raw(&[("Year", "2020"), ("Value", "n/a")])).unwrap_err();
        assert!(err.to_string().contains("n/a"));
    }

    #[test]
    fn test_non_finite_value_rejected() {
        for text in ["nan", "inf", "-infinity"] {
            let err = map_flow_record(&raw(&[("Year", "2030"), ("Value", text)])).unwrap_err();
            match err {
                ImportError::TypeConversionError { row, field, value } => {
                    assert_eq!(row, 2);
                    assert_eq!(field, "Value");
                    assert_eq!(value, text);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_validate_columns_lists_missing_sorted() {
        let headers: Vec<String> = vec!["Year", "Value", "Layer 1"]
            .into_iter()
            .map(String::from)
            .collect();
        let err = validate_columns("rm_output.csv", &headers).unwrap_err();
        match err {
            ImportError::MissingColumns { columns, .. } => {
                assert_eq!(
                    columns,
                    "Layer 2, Layer 3, Layer 4, Location, Scenario, Stock/Flow ID"
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
