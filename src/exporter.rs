// ==========================================
// MFA→LCI 过程图构建 - 结果导出
// ==========================================
// 全局过程图 + 组合元数据 → JSON，交给下游清单/影响计算器
// 文件名: lci_run_<YYYYmmdd_HHMMSS>.json
// ==========================================

use crate::domain::lci::LciMetadata;
use crate::domain::process::ProcessGraph;
use crate::engine::orchestrator::BatchResult;
use crate::importer::error::{ImportError, ImportResult};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const FILE_PREFIX: &str = "lci_run_";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    pub generated_at: DateTime<Local>,
    pub crate_version: String,
    pub graph: ProcessGraph,
    pub combinations: Vec<LciMetadata>,
}

impl GraphExport {
    pub fn from_batch(result: &BatchResult, generated_at: DateTime<Local>) -> Self {
        Self {
            generated_at,
            crate_version: crate::VERSION.to_string(),
            graph: result.graph.clone(),
            combinations: result.metadata(),
        }
    }

    pub fn file_name(&self) -> String {
        format!(
            "{}{}.json",
            FILE_PREFIX,
            self.generated_at.format(TIMESTAMP_FORMAT)
        )
    }

    /// 写入输出目录（不存在则创建）
    pub fn write_to_dir(&self, output_dir: &Path) -> ImportResult<PathBuf> {
        fs::create_dir_all(output_dir)
            .map_err(|e| ImportError::FileWriteError(format!("{}: {}", output_dir.display(), e)))?;

        let path = output_dir.join(self.file_name());
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)
            .map_err(|e| ImportError::FileWriteError(format!("{}: {}", path.display(), e)))?;

        info!(
            path = %path.display(),
            processes = self.graph.len(),
            combinations = self.combinations.len(),
            "LCI 结果已导出"
        );
        Ok(path)
    }

    pub fn read_from(path: &Path) -> ImportResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| ImportError::FileReadError(format!("{}: {}", path.display(), e)))?;
        Ok(serde_json::from_str(&text)?)
    }
}
