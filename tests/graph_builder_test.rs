// ==========================================
// 过程图构建器集成测试
// ==========================================
// 测试目标: 回收抵扣 -Y/X、交换合并、零流入量、符号约定
// ==========================================

mod helpers;

use helpers::{flow, sheet, standard_stores, table, FlowRecordBuilder, RuleRowBuilder};
use mfa_lci_builder::domain::lci::CombinationKey;
use mfa_lci_builder::domain::types::{ExchangeType, FlowDirection, LayerLevel, Scenario};
use mfa_lci_builder::domain::{FlowTable, ProcessKey, RuleSheet, SingleLci};
use mfa_lci_builder::engine::{
    BuildError, BuildResult, LciRequest, LocalProcessIndex, ProcessGraphBuilder, ReferenceResolver,
    ResolutionCache, ScenarioResolver,
};

fn key(year: i32, scenario: Scenario) -> CombinationKey {
    CombinationKey {
        route: "BATT_NiMHToMat".to_string(),
        product: "battNiMH".to_string(),
        year,
        scenario,
        location: "EU27+4".to_string(),
    }
}

fn build(key: &CombinationKey, flow_table: &FlowTable, rule_sheet: &RuleSheet) -> BuildResult<SingleLci> {
    let mut resolver = ReferenceResolver::new(standard_stores(), ResolutionCache::new(32));
    ProcessGraphBuilder::default().build_lci(
        &LciRequest {
            key,
            route_prefix: "NiMH hydrometallurgy",
            flow_table,
            rule_sheet,
        },
        &mut resolver,
        &ScenarioResolver::default(),
        &mut LocalProcessIndex::new(),
    )
}

/// 总流入量 X = 20（两条叶子行），回收镍 Y = 5
fn nimh_table() -> FlowTable {
    table(vec![
        flow("F_in", ["battNiMH", "cell", "cathode", "Ni"], 12.0),
        flow("F_in", ["battNiMH", "cell", "anode", "La"], 8.0),
        flow("F_in", ["battNiMH", "cell", "", ""], 500.0),
        flow("F_rec", ["battNiMH", "cell", "cathode", "Ni"], 5.0),
        flow("F_slag", ["battNiMH", "cell", "anode", "La"], 2.0),
    ])
}

fn production() -> mfa_lci_builder::ExchangeSpecRow {
    RuleRowBuilder::production("NiMH batteries", &["F_in"], &["battNiMH"]).build()
}

fn recovered_nickel() -> mfa_lci_builder::ExchangeSpecRow {
    RuleRowBuilder::recovered("recovered nickel", "ECOINVENT:market for nickel")
        .flow_ids(&["F_rec"])
        .materials(&["Ni"])
        .layer(LayerLevel::L4)
        .region("GLO")
        .reference_product("nickel, class 1")
        .build()
}

#[test]
fn test_recovered_exchange_is_negative_y_over_x() {
    let rules = sheet("battNiMH", vec![production(), recovered_nickel()]);
    let lci = build(&key(2030, Scenario::Bau), &nimh_table(), &rules).unwrap();

    assert_eq!(lci.total_inflow_amount, 20.0);
    let main = lci.graph.get(&lci.main_activity).unwrap();
    let exchange = main.find_exchange("recovered nickel").unwrap();
    assert_eq!(exchange.amount, -5.0 / 20.0);
    assert_eq!(exchange.exchange_type, ExchangeType::Technosphere);

    // 抵扣交换挂在避免影响活动上，并解析到参考产品匹配的过程
    let avoided = lci.graph.get(&lci.avoided_activity).unwrap();
    let credit = avoided.find_exchange("market for nickel").unwrap();
    assert_eq!(credit.input, ProcessKey::new("ecoinvent", "ni-class1"));
    assert_eq!(credit.amount, -0.25);
    assert_eq!(credit.location.as_deref(), Some("GLO"));
}

#[test]
fn test_duplicate_exchanges_merge_into_one() {
    let electricity = |amount: f64| {
        RuleRowBuilder::external(
            "electricity",
            "ECOINVENT:market for electricity, medium voltage",
            FlowDirection::Input,
        )
        .amount(amount)
        .build()
    };
    let rules = sheet(
        "battNiMH",
        vec![production(), electricity(1.25), electricity(0.5)],
    );
    let lci = build(&key(2030, Scenario::Bau), &nimh_table(), &rules).unwrap();

    let main = lci.graph.get(&lci.main_activity).unwrap();
    let matching: Vec<_> = main
        .exchanges
        .iter()
        .filter(|e| e.name == "market for electricity, medium voltage")
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].amount, 1.75);
}

#[test]
fn test_sign_conventions_on_graph() {
    let rules = sheet(
        "battNiMH",
        vec![
            production(),
            // 常规库 input → +
            RuleRowBuilder::external(
                "electricity",
                "ECOINVENT:market for electricity, medium voltage",
                FlowDirection::Input,
            )
            .amount(2.0)
            .build(),
            // 常规库 output → -
            RuleRowBuilder::external("slag", "ECOINVENT:treatment of slag", FlowDirection::Output)
                .flow_ids(&["F_slag"])
                .materials(&["La"])
                .layer(LayerLevel::L4)
                .build(),
            // 基本流库 output → +
            RuleRowBuilder::external("co2", "BIOSPHERE:Carbon dioxide, fossil", FlowDirection::Output)
                .categories(&["air"])
                .amount(0.3)
                .build(),
            // 基本流库 input → -
            RuleRowBuilder::external("water", "BIOSPHERE:Water", FlowDirection::Input)
                .categories(&["natural resource", "in water"])
                .amount(4.0)
                .build(),
        ],
    );
    let lci = build(&key(2030, Scenario::Bau), &nimh_table(), &rules).unwrap();
    let main = lci.graph.get(&lci.main_activity).unwrap();

    assert_eq!(main.find_exchange("market for electricity, medium voltage").unwrap().amount, 2.0);
    assert_eq!(main.find_exchange("treatment of slag").unwrap().amount, -0.1);

    let co2 = main.find_exchange("Carbon dioxide, fossil").unwrap();
    assert_eq!(co2.amount, 0.3);
    assert_eq!(co2.exchange_type, ExchangeType::Biosphere);
    assert_eq!(co2.input, ProcessKey::new("biosphere3", "co2"));

    assert_eq!(main.find_exchange("Water").unwrap().amount, -4.0);
}

#[test]
fn test_scaled_by_flows_normalised_by_inflow() {
    let rules = sheet(
        "battNiMH",
        vec![
            production(),
            RuleRowBuilder::external(
                "electricity",
                "ECOINVENT:market for electricity, medium voltage",
                FlowDirection::Input,
            )
            .scaled_by(&["F_rec"])
            .amount(10.0)
            .build(),
        ],
    );
    let lci = build(&key(2030, Scenario::Bau), &nimh_table(), &rules).unwrap();
    let main = lci.graph.get(&lci.main_activity).unwrap();
    // 10 × (5 / 20)
    assert_eq!(
        main.find_exchange("market for electricity, medium voltage").unwrap().amount,
        2.5
    );
}

#[test]
fn test_filtered_out_inflow_is_configuration_mismatch() {
    let rules = sheet("battNiMH", vec![production(), recovered_nickel()]);
    let only_2020 = table(vec![FlowRecordBuilder::new("F_in")
        .layers(["battNiMH", "cell", "cathode", "Ni"])
        .value(12.0)
        .year(2020)
        .scenario("OBS")
        .build()]);

    let err = build(&key(2030, Scenario::Bau), &only_2020, &rules).unwrap_err();
    match &err {
        BuildError::ZeroInflow(k) => {
            assert_eq!(k.year, 2030);
            assert_eq!(k.scenario, Scenario::Bau);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("product=battNiMH"));
}

#[test]
fn test_ambiguous_reference_aborts_combination() {
    let mut row = recovered_nickel();
    row.reference_product = None;
    let rules = sheet("battNiMH", vec![production(), row]);
    let mut index = LocalProcessIndex::new();
    let mut resolver = ReferenceResolver::new(standard_stores(), ResolutionCache::new(8));
    let key = key(2030, Scenario::Bau);
    let table = nimh_table();

    let err = ProcessGraphBuilder::default()
        .build_lci(
            &LciRequest {
                key: &key,
                route_prefix: "NiMH hydrometallurgy",
                flow_table: &table,
                rule_sheet: &rules,
            },
            &mut resolver,
            &ScenarioResolver::default(),
            &mut index,
        )
        .unwrap_err();

    assert!(matches!(err, BuildError::AmbiguousReference { .. }));
    assert!(err.to_string().contains("nickel sulfate"));
    // 失败组合不登记本地过程
    assert!(index.is_empty());
}

#[test]
fn test_background_snapshot_recorded() {
    let rules = sheet("battNiMH", vec![production()]);
    let records: FlowTable = nimh_table()
        .iter()
        .cloned()
        .map(|mut r| {
            r.year = 2032;
            r.scenario = "REC".to_string();
            r
        })
        .collect();
    let lci = build(&key(2032, Scenario::Rec), &records, &rules).unwrap();
    assert_eq!(lci.background.year, 2030);
    assert_eq!(lci.background.scenario, Scenario::Rec);
    assert_eq!(lci.metadata().main_activity_name, "nimh hydrometallurgy nimh batteries - 2032 - rec");
}
