// ==========================================
// MFA→LCI 过程图构建 - 引擎错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 所有硬错误中止当前组合，不输出半成品过程图
// ==========================================

use crate::domain::lci::CombinationKey;
use crate::importer::error::ImportError;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum BuildError {
    // ===== 配置不匹配 =====
    #[error("未找到有效流入量，规则表与流表不匹配: {0}。请检查 rm_output.csv 与 lci_builder.xlsx")]
    ZeroInflow(CombinationKey),

    #[error("规则表缺少 production 行 (route={route}, product={product})")]
    MissingProductionRow { route: String, product: String },

    #[error("规则行缺少外部过程引用 (行 {row}): {flow_name}")]
    MissingLinkedProcess { row: usize, flow_name: String },

    // ===== 数值配置错误 =====
    #[error("数值配置非法 (行 {row}, 字段 {field}): '{value}'")]
    MalformedNumber {
        row: usize,
        field: String,
        value: String,
    },

    #[error("层级数与材料数不一致: {layers} 个层级, {materials} 个材料")]
    LayerMaterialMismatch { layers: usize, materials: usize },

    // ===== 外部引用解析错误 =====
    #[error("外部过程未找到: {name} @ {locator} (库 {store})")]
    ReferenceNotFound {
        store: String,
        name: String,
        locator: String,
    },

    #[error("存在多个同名同地点过程: {name} @ {location} (库 {store})，需要参考产品消歧；可选参考产品: {candidates}")]
    AmbiguousReference {
        store: String,
        name: String,
        location: String,
        candidates: String,
    },

    #[error("参考产品 '{reference_product}' 无匹配: {name} @ {location} (库 {store})；可选参考产品: {candidates}")]
    ReferenceProductMismatch {
        store: String,
        name: String,
        location: String,
        reference_product: String,
        candidates: String,
    },

    #[error("未配置外部目录库: {0}")]
    StoreUnavailable(String),

    // ===== 情景解析错误 =====
    #[error("背景数据库快照年份列表为空")]
    EmptySnapshotYears,

    // ===== 图合并错误 =====
    #[error("过程键冲突: {0}")]
    DuplicateProcess(String),

    // ===== 导入错误 =====
    #[error(transparent)]
    Import(#[from] ImportError),
}

/// Result 类型别名
pub type BuildResult<T> = Result<T, BuildError>;
