// ==========================================
// MFA→LCI 过程图构建 - 领域模型层
// ==========================================
// 职责: 定义流表、规则表、过程图等领域实体与类型
// 红线: 不含文件读取逻辑,不含聚合/建图逻辑
// ==========================================

pub mod catalog;
pub mod flow;
pub mod lci;
pub mod price;
pub mod process;
pub mod rule;
pub mod types;

// 重导出核心类型
pub use catalog::{CatalogEntry, ReferenceStore};
pub use flow::{FlowRecord, FlowTable, LAYER_COUNT};
pub use lci::{BackgroundSnapshot, CombinationKey, LciMetadata, SingleLci};
pub use price::PriceTable;
pub use process::{Exchange, Process, ProcessGraph, ProcessKey, DEFAULT_LOCATION, DEFAULT_UNIT};
pub use rule::{ExchangeSpecRow, LayerSpec, LinkedProcess, RuleSheet};
pub use types::{ExchangeType, FlowDirection, FlowKind, LayerLevel, Scenario, StoreKind};
