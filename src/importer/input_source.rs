// ==========================================
// MFA→LCI 过程图构建 - 输入数据源
// ==========================================
// 目录约定: <input_dir>/<route>/rm_output.csv
//           <input_dir>/<route>/lci_builder.xlsx（每个产品一张工作表）
//           <input_dir>/<route>/lci_builder/<product>.csv（可选替代）
// ==========================================

use crate::domain::flow::FlowTable;
use crate::domain::rule::RuleSheet;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::flow_table_loader::FlowTableLoader;
use crate::importer::rule_sheet_loader::RuleSheetLoader;
use std::collections::HashMap;
use std::path::PathBuf;

pub const FLOW_TABLE_FILE: &str = "rm_output.csv";
pub const RULE_WORKBOOK_FILE: &str = "lci_builder.xlsx";
pub const RULE_CSV_DIR: &str = "lci_builder";

// ==========================================
// InputSource Trait
// ==========================================
// 实现者: FileInputSource（按目录约定读取）, InMemoryInputSource（测试）
pub trait InputSource {
    /// 读取路线的完整流表（未按年份/情景过滤）
    fn load_flow_table(&self, route: &str) -> ImportResult<FlowTable>;

    /// 读取路线下某产品的规则表
    ///
    /// # 返回
    /// - Ok(None): 该产品无规则表（组合不适用）
    fn load_rule_sheet(&self, route: &str, product: &str) -> ImportResult<Option<RuleSheet>>;
}

// ==========================================
// FileInputSource
// ==========================================
pub struct FileInputSource {
    input_dir: PathBuf,
}

impl FileInputSource {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
        }
    }

    fn route_dir(&self, route: &str) -> PathBuf {
        self.input_dir.join(route)
    }
}

impl InputSource for FileInputSource {
    fn load_flow_table(&self, route: &str) -> ImportResult<FlowTable> {
        let path = self.route_dir(route).join(FLOW_TABLE_FILE);
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        FlowTableLoader.load(&path)
    }

    fn load_rule_sheet(&self, route: &str, product: &str) -> ImportResult<Option<RuleSheet>> {
        let route_dir = self.route_dir(route);
        let loader = RuleSheetLoader;

        let workbook = route_dir.join(RULE_WORKBOOK_FILE);
        if workbook.exists() {
            if let Some(sheet) = loader.load_from_workbook(&workbook, product)? {
                return Ok(Some(sheet));
            }
        }

        let csv_path = route_dir.join(RULE_CSV_DIR).join(format!("{}.csv", product));
        loader.load_from_csv(&csv_path, product)
    }
}

// ==========================================
// InMemoryInputSource
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct InMemoryInputSource {
    flow_tables: HashMap<String, FlowTable>,
    rule_sheets: HashMap<(String, String), RuleSheet>,
}

impl InMemoryInputSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flow_table(mut self, route: &str, table: FlowTable) -> Self {
        self.flow_tables.insert(route.to_string(), table);
        self
    }

    pub fn with_rule_sheet(mut self, route: &str, sheet: RuleSheet) -> Self {
        self.rule_sheets
            .insert((route.to_string(), sheet.product.clone()), sheet);
        self
    }
}

impl InputSource for InMemoryInputSource {
    fn load_flow_table(&self, route: &str) -> ImportResult<FlowTable> {
        self.flow_tables
            .get(route)
            .cloned()
            .ok_or_else(|| ImportError::FileNotFound(format!("{}/{}", route, FLOW_TABLE_FILE)))
    }

    fn load_rule_sheet(&self, route: &str, product: &str) -> ImportResult<Option<RuleSheet>> {
        Ok(self
            .rule_sheets
            .get(&(route.to_string(), product.to_string()))
            .cloned())
    }
}
