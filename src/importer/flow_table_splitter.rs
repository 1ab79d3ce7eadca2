// ==========================================
// MFA→LCI 过程图构建 - 流表拆分
// ==========================================
// 按 Layer 1 + Stock/Flow ID 组合把一份完整流表拆成若干子表
// 保留全部年份/情景/地点，输出 rm_output_<name>.csv
// ==========================================

use crate::domain::flow::{FlowRecord, FlowTable};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::flow_table_loader::columns;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// 一个拆分输出的定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitDefinition {
    pub name: String,
    pub layer1_values: Vec<String>,
    pub stockflow_ids: Vec<String>,
}

impl SplitDefinition {
    pub fn matches(&self, record: &FlowRecord) -> bool {
        self.layer1_values.iter().any(|v| v == record.top_layer())
            && self.stockflow_ids.iter().any(|id| *id == record.flow_id)
    }

    pub fn select<'a>(&self, table: &'a FlowTable) -> Vec<&'a FlowRecord> {
        table.iter().filter(|r| self.matches(r)).collect()
    }

    pub fn output_file_name(&self) -> String {
        format!("rm_output_{}.csv", self.name)
    }
}

/// 写出所有拆分定义
///
/// # 返回
/// - 每个定义对应的 (输出路径, 行数)
pub fn write_splits(
    definitions: &[SplitDefinition],
    table: &FlowTable,
    output_dir: &Path,
) -> ImportResult<Vec<(PathBuf, usize)>> {
    std::fs::create_dir_all(output_dir)
        .map_err(|e| ImportError::FileWriteError(format!("{}: {}", output_dir.display(), e)))?;

    let mut written = Vec::with_capacity(definitions.len());
    for definition in definitions {
        let selection = definition.select(table);
        let path = output_dir.join(definition.output_file_name());
        write_records(&path, &selection)?;
        info!(
            path = %path.display(),
            rows = selection.len(),
            layer1 = ?definition.layer1_values,
            flow_ids = ?definition.stockflow_ids,
            "拆分流表已写出"
        );
        written.push((path, selection.len()));
    }
    Ok(written)
}

fn write_records(path: &Path, records: &[&FlowRecord]) -> ImportResult<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| ImportError::FileWriteError(e.to_string()))?;

    let mut header = vec![columns::YEAR, columns::SCENARIO, columns::LOCATION, columns::FLOW_ID];
    header.extend_from_slice(&columns::LAYERS);
    header.push(columns::VALUE);
    writer.write_record(&header)?;

    for record in records {
        let year = record.year.to_string();
        let value = record.value.to_string();
        let mut row: Vec<&str> = vec![
            year.as_str(),
            record.scenario.as_str(),
            record.location.as_str(),
            record.flow_id.as_str(),
        ];
        row.extend(record.layers.iter().map(|l| l.as_str()));
        row.push(value.as_str());
        writer.write_record(&row)?;
    }
    writer
        .flush()
        .map_err(|e| ImportError::FileWriteError(e.to_string()))?;
    Ok(())
}
