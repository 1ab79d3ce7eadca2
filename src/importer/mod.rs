// ==========================================
// MFA→LCI 过程图构建 - 导入层
// ==========================================
// 职责: 外部文件 → 强类型领域数据
// 支持: Excel, CSV, SQLite 目录库, JSON 价格表
// ==========================================

// 模块声明
pub mod catalog_loader;
pub mod error;
pub mod file_parser;
pub mod flow_table_loader;
pub mod flow_table_splitter;
pub mod input_source;
pub mod price_loader;
pub mod rule_sheet_loader;

// 重导出核心类型
pub use catalog_loader::{CsvCatalogLoader, SqliteCatalogLoader};
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRecord, UniversalFileParser};
pub use flow_table_loader::FlowTableLoader;
pub use flow_table_splitter::{write_splits, SplitDefinition};
pub use input_source::{FileInputSource, InMemoryInputSource, InputSource};
pub use price_loader::load_price_table;
pub use rule_sheet_loader::RuleSheetLoader;
