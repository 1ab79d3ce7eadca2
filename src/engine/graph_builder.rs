// ==========================================
// MFA→LCI 过程图构建 - 过程图构建器
// ==========================================
// 每个 (route, product, year, scenario, location) 组合产出一个 SingleLci:
// 1. 按年份/情景过滤流表，定位 production 行，计算总流入量 X
// 2. 主活动（接收废物，生产交换 -1）与避免影响活动（+1）
// 3. 回收行: 主活动 → 本地回收材料过程 -Y/X；避免影响活动 → 外部过程 Y/X（output）
// 4. 其余外部行: 按 流ID / 按流缩放 / 字面量 三种规则计算后挂到主活动
// 所有交换通过 merge_exchange 写入，同 (name, input) 累加
// 红线: 任一硬错误中止组合，不返回半成品
// ==========================================

use crate::domain::flow::FlowTable;
use crate::domain::lci::{CombinationKey, SingleLci};
use crate::domain::process::{Exchange, Process, ProcessGraph, ProcessKey, DEFAULT_LOCATION, DEFAULT_UNIT};
use crate::domain::rule::{ExchangeSpecRow, LayerSpec, LinkedProcess, RuleSheet};
use crate::domain::types::{ExchangeType, FlowDirection, LayerLevel, StoreKind};
use crate::engine::aggregator::{FlowAggregator, FlowQuery};
use crate::engine::error::{BuildError, BuildResult};
use crate::engine::reference_resolver::{ReferenceQuery, ReferenceResolver};
use crate::engine::scenario_resolver::ScenarioResolver;
use crate::engine::sign::exchange_sign;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// 默认本地库名
pub const DEFAULT_LOCAL_DATABASE: &str = "batt_lci";

const AVOIDED_PREFIX: &str = "avoided impacts for";

// ==========================================
// 本地回收材料过程索引
// ==========================================
// 按名称在整个批次内共享；只在组合成功后登记
#[derive(Debug, Clone, Default)]
pub struct LocalProcessIndex {
    by_name: HashMap<String, ProcessKey>,
}

impl LocalProcessIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ProcessKey> {
        self.by_name.get(&normalize_key(name))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    fn register(&mut self, name: &str, key: ProcessKey) {
        self.by_name.entry(normalize_key(name)).or_insert(key);
    }
}

fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// 单组合构建输入
#[derive(Debug, Clone, Copy)]
pub struct LciRequest<'a> {
    pub key: &'a CombinationKey,
    /// 路线显示前缀（活动名称用）
    pub route_prefix: &'a str,
    /// 路线完整流表（构建器内部按年份/情景过滤）
    pub flow_table: &'a FlowTable,
    pub rule_sheet: &'a RuleSheet,
}

// ==========================================
// ProcessGraphBuilder
// ==========================================
#[derive(Debug, Clone)]
pub struct ProcessGraphBuilder {
    database: String,
    default_region: String,
}

impl Default for ProcessGraphBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_LOCAL_DATABASE, DEFAULT_LOCATION)
    }
}

impl ProcessGraphBuilder {
    pub fn new(database: impl Into<String>, default_region: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            default_region: default_region.into(),
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// 构建单组合 LCI
    ///
    /// # 错误
    /// - MissingProductionRow: 规则表无 production 行
    /// - ZeroInflow: 过滤后总流入量为 0
    /// - MalformedNumber / LayerMaterialMismatch: 数值或层级配置非法
    /// - 引用解析错误: 见 ReferenceResolver::resolve
    pub fn build_lci(
        &self,
        request: &LciRequest<'_>,
        resolver: &mut ReferenceResolver,
        scenarios: &ScenarioResolver,
        local_index: &mut LocalProcessIndex,
    ) -> BuildResult<SingleLci> {
        let key = request.key;
        let production = request
            .rule_sheet
            .production_row()
            .ok_or_else(|| BuildError::MissingProductionRow {
                route: key.route.clone(),
                product: key.product.clone(),
            })?;

        let table = request
            .flow_table
            .filter_year_scenario(key.year, key.scenario.as_str());
        let products = production.materials.clone();

        let total_inflow = FlowAggregator::total_inflow(&table, &production.flow_ids, &products);
        // NaN/inf 流入量与零流入同样无法归一化
        if !total_inflow.is_finite() || total_inflow == 0.0 {
            return Err(BuildError::ZeroInflow(key.clone()));
        }

        let background = scenarios.resolve(key.scenario, key.year)?;

        let main_name = activity_name(request.route_prefix, &production.flow_name, key);
        let avoided_name = format!("{} {}", AVOIDED_PREFIX, main_name);
        let (main_key, main) = Process::new_local(&self.database, &main_name, true);
        let (avoided_key, avoided) = Process::new_local(&self.database, &avoided_name, false);

        let mut draft = LciDraft {
            table: &table,
            products: &products,
            total_inflow,
            main,
            avoided,
            new_locals: Vec::new(),
            recovered_by_flow: BTreeMap::new(),
            recovered_by_material: BTreeMap::new(),
        };

        for row in request.rule_sheet.recovered_rows() {
            self.add_recovered(&mut draft, row, resolver, local_index)?;
        }
        for row in request.rule_sheet.external_rows() {
            self.add_external(&mut draft, row, resolver)?;
        }

        // 组合成功后才登记新建的本地过程
        let mut graph = ProcessGraph::new();
        for (name, local_key, process) in draft.new_locals {
            local_index.register(&name, local_key.clone());
            graph.insert(local_key, process);
        }
        graph.insert(main_key.clone(), draft.main);
        graph.insert(avoided_key.clone(), draft.avoided);

        debug!(
            combination = %key,
            total_inflow,
            processes = graph.len(),
            "组合过程图构建完成"
        );

        Ok(SingleLci {
            key: key.clone(),
            main_activity: main_key,
            main_activity_name: main_name,
            avoided_activity: avoided_key,
            avoided_activity_name: avoided_name,
            total_inflow_amount: total_inflow,
            background,
            recovered_by_flow: draft.recovered_by_flow,
            recovered_by_material: draft.recovered_by_material,
            graph,
        })
    }

    // ==========================================
    // 回收行
    // ==========================================
    fn add_recovered(
        &self,
        draft: &mut LciDraft<'_>,
        row: &ExchangeSpecRow,
        resolver: &mut ReferenceResolver,
        local_index: &LocalProcessIndex,
    ) -> BuildResult<()> {
        let linked = required_link(row)?;
        let multiplier = recovery_multiplier(row)?;

        let recovered = FlowAggregator::calculate(
            draft.table,
            &FlowQuery {
                flow_ids: &row.flow_ids,
                products: draft.products,
                materials: &row.materials,
                layer: &row.layer,
            },
        )? * multiplier;
        let normalized = recovered / draft.total_inflow;

        let local_key = self.recovered_process_key(draft, &row.flow_name, local_index);
        draft.main.merge_exchange(Exchange {
            name: row.flow_name.clone(),
            input: local_key,
            amount: -normalized,
            unit: DEFAULT_UNIT.to_string(),
            exchange_type: ExchangeType::Technosphere,
            location: Some(DEFAULT_LOCATION.to_string()),
        });

        *draft
            .recovered_by_flow
            .entry(row.flow_name.clone())
            .or_insert(0.0) += normalized;

        for (i, material) in row.materials.iter().enumerate() {
            let layer = row
                .layer
                .level_for(i)
                .map_or(LayerSpec::Unspecified, LayerSpec::Single);
            let amount = FlowAggregator::calculate(
                draft.table,
                &FlowQuery {
                    flow_ids: &row.flow_ids,
                    products: draft.products,
                    materials: std::slice::from_ref(material),
                    layer: &layer,
                },
            )? * multiplier;
            *draft
                .recovered_by_material
                .entry(material.clone())
                .or_insert(0.0) += amount / draft.total_inflow;
        }

        let exchange = self.external_exchange(row, linked, normalized, FlowDirection::Output, resolver)?;
        debug!(flow = %row.flow_name, amount = exchange.amount, "回收材料抵扣交换");
        draft.avoided.merge_exchange(exchange);
        Ok(())
    }

    /// 回收材料本地过程：批次内已存在则复用，否则本组合新建
    fn recovered_process_key(
        &self,
        draft: &mut LciDraft<'_>,
        name: &str,
        local_index: &LocalProcessIndex,
    ) -> ProcessKey {
        if let Some(existing) = local_index.get(name) {
            return existing.clone();
        }
        let normalized = normalize_key(name);
        if let Some((_, key, _)) = draft
            .new_locals
            .iter()
            .find(|(n, _, _)| normalize_key(n) == normalized)
        {
            return key.clone();
        }
        let (key, process) = Process::new_local(&self.database, name.trim(), false);
        draft.new_locals.push((name.to_string(), key.clone(), process));
        key
    }

    // ==========================================
    // 外部行
    // ==========================================
    fn add_external(
        &self,
        draft: &mut LciDraft<'_>,
        row: &ExchangeSpecRow,
        resolver: &mut ReferenceResolver,
    ) -> BuildResult<()> {
        let linked = required_link(row)?;
        let amount = external_amount(draft, row)?;
        let exchange = self.external_exchange(row, linked, amount, row.direction, resolver)?;
        debug!(flow = %linked.name, amount = exchange.amount, direction = %row.direction, "外部交换");
        draft.main.merge_exchange(exchange);
        Ok(())
    }

    fn external_exchange(
        &self,
        row: &ExchangeSpecRow,
        linked: &LinkedProcess,
        amount: f64,
        direction: FlowDirection,
        resolver: &mut ReferenceResolver,
    ) -> BuildResult<Exchange> {
        let region = row.region.as_deref().unwrap_or(&self.default_region);
        let query = match linked.store {
            StoreKind::Technosphere => {
                ReferenceQuery::technosphere(&linked.name, region, row.reference_product.as_deref())
            }
            StoreKind::Biosphere => ReferenceQuery::biosphere(&linked.name, &row.categories),
        };
        let input = resolver.resolve(&query)?;

        Ok(Exchange {
            name: linked.name.clone(),
            input,
            amount: amount * exchange_sign(linked.store, direction),
            unit: row.unit.clone(),
            exchange_type: linked.store.exchange_type(),
            location: Some(region.to_string()),
        })
    }
}

/// 构建过程中的可变状态
struct LciDraft<'a> {
    table: &'a FlowTable,
    products: &'a [String],
    total_inflow: f64,
    main: Process,
    avoided: Process,
    new_locals: Vec<(String, ProcessKey, Process)>,
    recovered_by_flow: BTreeMap<String, f64>,
    recovered_by_material: BTreeMap<String, f64>,
}

/// 主活动名称: "<前缀> <产品流名> - <年份> - <情景>"，小写，空白规范化
pub fn activity_name(route_prefix: &str, flow_name: &str, key: &CombinationKey) -> String {
    let raw = format!(
        "{} {} - {} - {}",
        route_prefix.trim(),
        flow_name.trim(),
        key.year,
        key.scenario
    );
    raw.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

fn required_link(row: &ExchangeSpecRow) -> BuildResult<&LinkedProcess> {
    row.linked_process
        .as_ref()
        .ok_or_else(|| BuildError::MissingLinkedProcess {
            row: row.source_row,
            flow_name: row.flow_name.clone(),
        })
}

/// 回收乘子 = 回收效率 ÷ 单位重量（空白按 1）
fn recovery_multiplier(row: &ExchangeSpecRow) -> BuildResult<f64> {
    let efficiency = row.recovery_efficiency.unwrap_or(1.0);
    let unit_weight = row.unit_weight.unwrap_or(1.0);
    if unit_weight == 0.0 {
        return Err(BuildError::MalformedNumber {
            row: row.source_row,
            field: "Unit weight".to_string(),
            value: unit_weight.to_string(),
        });
    }
    Ok(efficiency / unit_weight)
}

/// 外部行数量（已归一化，未乘符号）
///
/// 优先级: 流ID 直接聚合 > 按流缩放 > 字面量
fn external_amount(draft: &LciDraft<'_>, row: &ExchangeSpecRow) -> BuildResult<f64> {
    if !row.flow_ids.is_empty() {
        let total = FlowAggregator::calculate(
            draft.table,
            &FlowQuery {
                flow_ids: &row.flow_ids,
                products: draft.products,
                materials: &row.materials,
                layer: &row.layer,
            },
        )?;
        return Ok(total / draft.total_inflow);
    }

    if !row.scaled_by.is_empty() {
        let scaling = FlowAggregator::calculate(
            draft.table,
            &FlowQuery {
                flow_ids: &row.scaled_by,
                products: draft.products,
                materials: &[],
                layer: &LayerSpec::Single(LayerLevel::DEEPEST),
            },
        )? / draft.total_inflow;

        let ratio = row.element_to_compound_ratio.unwrap_or(1.0);
        if ratio == 0.0 {
            return Err(BuildError::MalformedNumber {
                row: row.source_row,
                field: "Element to compound ratio".to_string(),
                value: ratio.to_string(),
            });
        }
        return Ok(row.amount.unwrap_or(1.0) * scaling / ratio);
    }

    row.amount.ok_or_else(|| BuildError::MalformedNumber {
        row: row.source_row,
        field: "Amount".to_string(),
        value: String::new(),
    })
}
