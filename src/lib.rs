// ==========================================
// MFA→LCI 过程图构建 - 核心库
// ==========================================
// 输入: 路线 MFA 流表 (rm_output.csv) + 产品 LCI 构建规则表 (lci_builder.xlsx)
// 输出: 带符号、带类型的交换过程图 + 组合元数据，交给下游清单/影响计算器
// 运行方式: 单线程同步批处理
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 导入层 - 外部数据
pub mod importer;

// 引擎层 - 聚合/建图/解析
pub mod engine;

// 配置层 - 批处理配置
pub mod config;

// 外部目录库 SQLite 连接
pub mod db;

// 日志系统
pub mod logging;

// 结果导出
pub mod exporter;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    ExchangeType, FlowDirection, FlowKind, LayerLevel, Scenario, StoreKind,
};

// 领域实体
pub use domain::{
    CombinationKey, Exchange, ExchangeSpecRow, FlowRecord, FlowTable, LayerSpec, Process,
    ProcessGraph, ProcessKey, RuleSheet, SingleLci,
};

// 引擎
pub use engine::{
    BatchOrchestrator, BuildError, FlowAggregator, ProcessGraphBuilder, ReferenceResolver,
    ResolutionCache, ScenarioResolver,
};

// 配置
pub use config::BuilderConfig;

// ==========================================
// 常量定义
// ==========================================

// 版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 名称
pub const APP_NAME: &str = "MFA→LCI 过程图构建器";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
