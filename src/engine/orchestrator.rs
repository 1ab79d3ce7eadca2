// ==========================================
// MFA→LCI 过程图构建 - 批处理编排器
// ==========================================
// 用途: 遍历 路线 × 产品 × 年份 × 情景 × 地点 的笛卡尔积，逐组合调用构建器
// 单线程同步执行；首个硬错误中止整个批次
// 组合片段键空间互不相交，并入全局图为不相交并集
// ==========================================

use crate::domain::flow::FlowTable;
use crate::domain::lci::{CombinationKey, LciMetadata, SingleLci};
use crate::domain::price::PriceTable;
use crate::domain::process::ProcessGraph;
use crate::domain::rule::RuleSheet;
use crate::domain::types::Scenario;
use crate::engine::error::{BuildError, BuildResult};
use crate::engine::graph_builder::{LciRequest, LocalProcessIndex, ProcessGraphBuilder};
use crate::engine::reference_resolver::ReferenceResolver;
use crate::engine::resolution_cache::CacheStats;
use crate::engine::scenario_resolver::ScenarioResolver;
use crate::importer::input_source::InputSource;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

// ==========================================
// 批次请求
// ==========================================

/// 路线选择（路线标识 + 活动名称前缀）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSelection {
    pub id: String,
    pub display_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub routes: Vec<RouteSelection>,
    pub products: Vec<String>,
    pub years: Vec<i32>,
    pub scenarios: Vec<Scenario>,
    pub locations: Vec<String>,
}

impl BatchRequest {
    /// 笛卡尔积规模（含将被跳过的组合）
    pub fn combination_count(&self) -> usize {
        self.routes.len()
            * self.products.len()
            * self.years.len()
            * self.scenarios.len()
            * self.locations.len()
    }
}

// ==========================================
// 批次结果
// ==========================================

/// 跳过原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 情景在该年份无数据
    UnsupportedYear,
    /// 产品无规则表
    RuleSheetAbsent,
}

#[derive(Debug, Clone)]
pub struct BatchResult {
    /// 全局过程图（所有组合片段的并集）
    pub graph: ProcessGraph,
    pub lcis: Vec<SingleLci>,
    pub skipped: Vec<(CombinationKey, SkipReason)>,
    pub cache_stats: CacheStats,
}

impl BatchResult {
    pub fn metadata(&self) -> Vec<LciMetadata> {
        self.lcis.iter().map(SingleLci::metadata).collect()
    }

    /// 回收材料中缺少价格的条目（去重排序）
    pub fn materials_without_price(&self, prices: &PriceTable) -> Vec<String> {
        let materials: BTreeSet<&str> = self
            .lcis
            .iter()
            .flat_map(|lci| lci.recovered_by_material.keys())
            .map(String::as_str)
            .collect();
        prices.missing(materials)
    }
}

// ==========================================
// BatchOrchestrator - 批处理编排器
// ==========================================

pub struct BatchOrchestrator<S>
where
    S: InputSource,
{
    source: S,
    builder: ProcessGraphBuilder,
    resolver: ReferenceResolver,
    scenarios: ScenarioResolver,
    local_index: LocalProcessIndex,
    flow_tables: HashMap<String, FlowTable>,
    rule_sheets: HashMap<(String, String), Option<RuleSheet>>,
}

impl<S> BatchOrchestrator<S>
where
    S: InputSource,
{
    /// 创建编排器
    ///
    /// # 参数
    /// - source: 流表/规则表来源
    /// - builder: 单组合构建器
    /// - resolver: 外部引用解析器（含缓存）
    /// - scenarios: 情景/年份解析器
    pub fn new(
        source: S,
        builder: ProcessGraphBuilder,
        resolver: ReferenceResolver,
        scenarios: ScenarioResolver,
    ) -> Self {
        Self {
            source,
            builder,
            resolver,
            scenarios,
            local_index: LocalProcessIndex::new(),
            flow_tables: HashMap::new(),
            rule_sheets: HashMap::new(),
        }
    }

    /// 执行整个批次
    pub fn run(&mut self, request: &BatchRequest) -> BuildResult<BatchResult> {
        info!(
            routes = request.routes.len(),
            products = request.products.len(),
            years = request.years.len(),
            scenarios = request.scenarios.len(),
            locations = request.locations.len(),
            combinations = request.combination_count(),
            "开始批量构建 LCI"
        );

        let mut graph = ProcessGraph::new();
        let mut lcis = Vec::new();
        let mut skipped = Vec::new();

        for route in &request.routes {
            for product in &request.products {
                for &year in &request.years {
                    for &scenario in &request.scenarios {
                        for location in &request.locations {
                            let key = CombinationKey {
                                route: route.id.clone(),
                                product: product.clone(),
                                year,
                                scenario,
                                location: location.clone(),
                            };

                            // 不支持的组合在读取任何输入前跳过
                            if !self.scenarios.supports(scenario, year) {
                                debug!(combination = %key, "情景不覆盖该年份，跳过");
                                skipped.push((key, SkipReason::UnsupportedYear));
                                continue;
                            }

                            match self.build_one(&key, &route.display_prefix)? {
                                Some(lci) => {
                                    graph
                                        .absorb(&lci.graph)
                                        .map_err(|k| BuildError::DuplicateProcess(k.to_string()))?;
                                    info!(
                                        combination = %key,
                                        total_inflow = lci.total_inflow_amount,
                                        main_activity = %lci.main_activity_name,
                                        "组合构建完成"
                                    );
                                    lcis.push(lci);
                                }
                                None => {
                                    warn!(combination = %key, "产品无规则表，跳过");
                                    skipped.push((key, SkipReason::RuleSheetAbsent));
                                }
                            }
                        }
                    }
                }
            }
        }

        let cache_stats = self.resolver.cache_stats();
        info!(
            built = lcis.len(),
            skipped = skipped.len(),
            processes = graph.len(),
            cache_hits = cache_stats.hits,
            cache_misses = cache_stats.misses,
            cache_evictions = cache_stats.evictions,
            "批量构建完成"
        );

        Ok(BatchResult {
            graph,
            lcis,
            skipped,
            cache_stats,
        })
    }

    /// 单组合: 先读规则表（缺失即跳过），再读路线流表
    fn build_one(&mut self, key: &CombinationKey, route_prefix: &str) -> BuildResult<Option<SingleLci>> {
        let sheet_key = (key.route.clone(), key.product.clone());
        if !self.rule_sheets.contains_key(&sheet_key) {
            let sheet = self.source.load_rule_sheet(&key.route, &key.product)?;
            self.rule_sheets.insert(sheet_key.clone(), sheet);
        }
        let Some(Some(rule_sheet)) = self.rule_sheets.get(&sheet_key) else {
            return Ok(None);
        };

        if !self.flow_tables.contains_key(&key.route) {
            let table = self.source.load_flow_table(&key.route)?;
            debug!(route = %key.route, rows = table.len(), "路线流表已加载");
            self.flow_tables.insert(key.route.clone(), table);
        }
        let Some(flow_table) = self.flow_tables.get(&key.route) else {
            return Ok(None);
        };

        let request = LciRequest {
            key,
            route_prefix,
            flow_table,
            rule_sheet,
        };
        self.builder
            .build_lci(&request, &mut self.resolver, &self.scenarios, &mut self.local_index)
            .map(Some)
    }
}
