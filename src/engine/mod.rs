// ==========================================
// MFA→LCI 过程图构建 - 引擎层
// ==========================================
// 职责: 流量聚合、过程图构建、外部引用解析、情景/年份解析、批处理编排
// 红线: 引擎不读文件、不解析原始字符串；输入均为强类型领域对象
// ==========================================

pub mod aggregator;
pub mod error;
pub mod graph_builder;
pub mod orchestrator;
pub mod reference_resolver;
pub mod resolution_cache;
pub mod scenario_resolver;
pub mod sign;

// 重导出核心引擎
pub use aggregator::{FlowAggregator, FlowQuery};
pub use error::{BuildError, BuildResult};
pub use graph_builder::{activity_name, LciRequest, LocalProcessIndex, ProcessGraphBuilder};
pub use orchestrator::{BatchOrchestrator, BatchRequest, BatchResult, RouteSelection, SkipReason};
pub use reference_resolver::{ReferenceQuery, ReferenceResolver};
pub use resolution_cache::{CacheKey, CacheStats, ResolutionCache};
pub use scenario_resolver::ScenarioResolver;
pub use sign::exchange_sign;
