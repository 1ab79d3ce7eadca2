// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

#![allow(dead_code)]

use mfa_lci_builder::domain::catalog::{CatalogEntry, ReferenceStore};
use mfa_lci_builder::domain::flow::{FlowRecord, FlowTable};
use mfa_lci_builder::domain::rule::{ExchangeSpecRow, LayerSpec, LinkedProcess, RuleSheet};
use mfa_lci_builder::domain::types::{FlowDirection, FlowKind, LayerLevel, StoreKind};

// ==========================================
// FlowRecord 构建器
// ==========================================

pub struct FlowRecordBuilder {
    flow_id: String,
    layers: [String; 4],
    value: f64,
    year: i32,
    scenario: String,
    location: String,
}

impl FlowRecordBuilder {
    pub fn new(flow_id: &str) -> Self {
        Self {
            flow_id: flow_id.to_string(),
            layers: Default::default(),
            value: 0.0,
            year: 2030,
            scenario: "BAU".to_string(),
            location: "EU27+4".to_string(),
        }
    }

    pub fn layers(mut self, layers: [&str; 4]) -> Self {
        self.layers = layers.map(String::from);
        self
    }

    pub fn value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    pub fn scenario(mut self, scenario: &str) -> Self {
        self.scenario = scenario.to_string();
        self
    }

    pub fn build(self) -> FlowRecord {
        FlowRecord {
            flow_id: self.flow_id,
            layers: self.layers,
            value: self.value,
            year: self.year,
            scenario: self.scenario,
            location: self.location,
        }
    }
}

/// 快捷方式: (flow_id, layers, value)，年份 2030，情景 BAU
pub fn flow(flow_id: &str, layers: [&str; 4], value: f64) -> FlowRecord {
    FlowRecordBuilder::new(flow_id).layers(layers).value(value).build()
}

pub fn table(records: Vec<FlowRecord>) -> FlowTable {
    FlowTable::new(records)
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ==========================================
// ExchangeSpecRow 构建器
// ==========================================

pub struct RuleRowBuilder {
    row: ExchangeSpecRow,
}

impl RuleRowBuilder {
    pub fn production(name: &str, flow_ids: &[&str], products: &[&str]) -> Self {
        let mut row = ExchangeSpecRow::new(FlowKind::Production, name);
        row.flow_ids = strings(flow_ids);
        row.materials = strings(products);
        Self { row }
    }

    pub fn recovered(name: &str, linked: &str) -> Self {
        let mut row = ExchangeSpecRow::new(FlowKind::Recovered, name);
        row.linked_process = LinkedProcess::parse(linked);
        Self { row }
    }

    pub fn external(name: &str, linked: &str, direction: FlowDirection) -> Self {
        let mut row = ExchangeSpecRow::new(FlowKind::External, name);
        row.linked_process = LinkedProcess::parse(linked);
        row.direction = direction;
        Self { row }
    }

    pub fn flow_ids(mut self, ids: &[&str]) -> Self {
        self.row.flow_ids = strings(ids);
        self
    }

    pub fn materials(mut self, materials: &[&str]) -> Self {
        self.row.materials = strings(materials);
        self
    }

    pub fn layer(mut self, level: LayerLevel) -> Self {
        self.row.layer = LayerSpec::Single(level);
        self
    }

    pub fn layers(mut self, levels: &[LayerLevel]) -> Self {
        self.row.layer = LayerSpec::PerMaterial(levels.to_vec());
        self
    }

    pub fn region(mut self, region: &str) -> Self {
        self.row.region = Some(region.to_string());
        self
    }

    pub fn reference_product(mut self, product: &str) -> Self {
        self.row.reference_product = Some(product.to_string());
        self
    }

    pub fn categories(mut self, categories: &[&str]) -> Self {
        self.row.categories = strings(categories);
        self
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.row.amount = Some(amount);
        self
    }

    pub fn scaled_by(mut self, ids: &[&str]) -> Self {
        self.row.scaled_by = strings(ids);
        self
    }

    pub fn build(self) -> ExchangeSpecRow {
        self.row
    }
}

pub fn sheet(product: &str, rows: Vec<ExchangeSpecRow>) -> RuleSheet {
    RuleSheet::new(product, rows)
}

// ==========================================
// 外部目录库构建器
// ==========================================

pub fn process_entry(code: &str, name: &str, location: &str, product: &str) -> CatalogEntry {
    CatalogEntry {
        code: code.to_string(),
        name: name.to_string(),
        location: location.to_string(),
        reference_product: product.to_string(),
        categories: Vec::new(),
    }
}

pub fn biosphere_entry(code: &str, name: &str, categories: &[&str]) -> CatalogEntry {
    CatalogEntry {
        code: code.to_string(),
        name: name.to_string(),
        location: String::new(),
        reference_product: String::new(),
        categories: strings(categories),
    }
}

/// 常规库 + 基本流库（覆盖镍、钴、电力、二氧化碳）
pub fn standard_stores() -> Vec<ReferenceStore> {
    vec![
        ReferenceStore::new(
            "ecoinvent",
            StoreKind::Technosphere,
            vec![
                process_entry("ni-class1", "market for nickel", "GLO", "nickel, class 1"),
                process_entry("ni-sulfate", "market for nickel", "GLO", "nickel sulfate"),
                process_entry("co", "market for cobalt", "GLO", "cobalt"),
                process_entry("elec", "market for electricity, medium voltage", "RER", "electricity, medium voltage"),
                process_entry("slag", "treatment of slag", "RER", "slag"),
            ],
        ),
        ReferenceStore::new(
            "biosphere3",
            StoreKind::Biosphere,
            vec![
                biosphere_entry("co2", "Carbon dioxide, fossil", &["air"]),
                biosphere_entry("water", "Water", &["natural resource", "in water"]),
            ],
        ),
    ]
}
