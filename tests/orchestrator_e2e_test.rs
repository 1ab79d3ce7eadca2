// ==========================================
// 批处理编排 端到端测试
// ==========================================
// 测试目标: 组合遍历、跳过规则、全局图不相交合并、本地回收过程共享
// ==========================================

mod helpers;

use helpers::{sheet, standard_stores, FlowRecordBuilder, RuleRowBuilder};
use mfa_lci_builder::domain::types::{LayerLevel, Scenario};
use mfa_lci_builder::domain::{FlowRecord, FlowTable, PriceTable};
use mfa_lci_builder::engine::{
    BatchOrchestrator, BatchRequest, BuildError, ProcessGraphBuilder, ReferenceResolver,
    ResolutionCache, RouteSelection, ScenarioResolver, SkipReason,
};
use mfa_lci_builder::importer::InMemoryInputSource;
use mfa_lci_builder::logging;

const ROUTE: &str = "BATT_NiMHToMat";

fn record(flow_id: &str, layers: [&str; 4], value: f64, year: i32, scenario: &str) -> FlowRecord {
    FlowRecordBuilder::new(flow_id)
        .layers(layers)
        .value(value)
        .year(year)
        .scenario(scenario)
        .build()
}

/// 2020/OBS 与 2030/BAU 两个年份情景的流表
fn route_table() -> FlowTable {
    let mut records = Vec::new();
    for (year, scenario, inflow, recovered) in [(2020, "OBS", 10.0, 2.0), (2030, "BAU", 40.0, 20.0)] {
        records.push(record("F_in", ["battNiMH", "cell", "cathode", "Ni"], inflow, year, scenario));
        records.push(record("F_rec", ["battNiMH", "cell", "cathode", "Ni"], recovered, year, scenario));
    }
    FlowTable::new(records)
}

fn source() -> InMemoryInputSource {
    let rules = sheet(
        "battNiMH",
        vec![
            RuleRowBuilder::production("NiMH batteries", &["F_in"], &["battNiMH"]).build(),
            RuleRowBuilder::recovered("recovered nickel", "ECOINVENT:market for cobalt")
                .flow_ids(&["F_rec"])
                .materials(&["Ni"])
                .layer(LayerLevel::L4)
                .region("GLO")
                .build(),
        ],
    );
    InMemoryInputSource::new()
        .with_flow_table(ROUTE, route_table())
        .with_rule_sheet(ROUTE, rules)
}

fn request(products: &[&str], years: &[i32], scenarios: &[Scenario]) -> BatchRequest {
    BatchRequest {
        routes: vec![RouteSelection {
            id: ROUTE.to_string(),
            display_prefix: "NiMH recycling".to_string(),
        }],
        products: products.iter().map(|p| p.to_string()).collect(),
        years: years.to_vec(),
        scenarios: scenarios.to_vec(),
        locations: vec!["EU27+4".to_string()],
    }
}

fn orchestrator(source: InMemoryInputSource) -> BatchOrchestrator<InMemoryInputSource> {
    BatchOrchestrator::new(
        source,
        ProcessGraphBuilder::default(),
        ReferenceResolver::new(standard_stores(), ResolutionCache::new(64)),
        ScenarioResolver::default(),
    )
}

#[test]
fn test_batch_builds_supported_combinations() {
    logging::init_test();

    let mut orchestrator = orchestrator(source());
    let result = orchestrator
        .run(&request(&["battNiMH"], &[2020, 2030], &[Scenario::Obs, Scenario::Bau]))
        .unwrap();

    // OBS/2030 与 BAU/2020 不在情景窗口内
    assert_eq!(result.lcis.len(), 2);
    assert_eq!(result.skipped.len(), 2);
    assert!(result
        .skipped
        .iter()
        .all(|(_, reason)| *reason == SkipReason::UnsupportedYear));

    // 两个组合各 2 个活动 + 共享的 1 个回收材料过程
    assert_eq!(result.graph.len(), 5);

    let metadata = result.metadata();
    assert_eq!(metadata[0].year, 2020);
    assert_eq!(metadata[0].total_inflow_amount, 10.0);
    assert_eq!(metadata[0].background.scenario, Scenario::Bau);
    assert_eq!(metadata[1].recovered_by_material["Ni"], 0.5);

    // 两个主活动指向同一个回收材料过程
    let target = |i: usize| {
        let lci = &result.lcis[i];
        lci.graph
            .get(&lci.main_activity)
            .and_then(|p| p.find_exchange("recovered nickel"))
            .map(|e| e.input.clone())
    };
    assert!(target(0).is_some());
    assert_eq!(target(0), target(1));
    assert_eq!(result.cache_stats.hits, 1);
}

#[test]
fn test_missing_rule_sheet_is_skipped() {
    let mut orchestrator = orchestrator(source());
    let result = orchestrator
        .run(&request(&["battNiMH", "battPb"], &[2030], &[Scenario::Bau]))
        .unwrap();

    assert_eq!(result.lcis.len(), 1);
    assert_eq!(result.skipped.len(), 1);
    let (key, reason) = &result.skipped[0];
    assert_eq!(key.product, "battPb");
    assert_eq!(*reason, SkipReason::RuleSheetAbsent);
}

#[test]
fn test_zero_inflow_aborts_batch() {
    let mut orchestrator = orchestrator(source());
    // 2040/BAU 在窗口内，但流表没有该年份的数据
    let err = orchestrator
        .run(&request(&["battNiMH"], &[2030, 2040], &[Scenario::Bau]))
        .unwrap_err();
    match err {
        BuildError::ZeroInflow(key) => assert_eq!(key.year, 2040),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_missing_flow_table_is_import_error() {
    let rules = sheet(
        "battNiMH",
        vec![RuleRowBuilder::production("NiMH batteries", &["F_in"], &["battNiMH"]).build()],
    );
    let source = InMemoryInputSource::new().with_rule_sheet(ROUTE, rules);
    let err = orchestrator(source)
        .run(&request(&["battNiMH"], &[2030], &[Scenario::Bau]))
        .unwrap_err();
    assert!(matches!(err, BuildError::Import(_)));
}

#[test]
fn test_price_preflight_lists_unpriced_materials() {
    let mut orchestrator = orchestrator(source());
    let result = orchestrator
        .run(&request(&["battNiMH"], &[2030], &[Scenario::Bau]))
        .unwrap();

    let priced: PriceTable = [("ni", 15.5)].into_iter().collect();
    assert!(result.materials_without_price(&priced).is_empty());

    let unpriced: PriceTable = [("Co", 30.0)].into_iter().collect();
    assert_eq!(result.materials_without_price(&unpriced), vec!["Ni".to_string()]);
}
