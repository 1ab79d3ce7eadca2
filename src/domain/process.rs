// ==========================================
// MFA→LCI 过程图构建 - 过程与交换
// ==========================================
// 不变量:
// - 每个过程恰有一条生产交换，数量 ±1（接收废物的过程为 -1）
// - 同一过程内 (name, input) 相同的交换原地累加，不重复出现
// ==========================================

use crate::domain::types::ExchangeType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// 本地过程默认单位
pub const DEFAULT_UNIT: &str = "kilogram";

/// 本地过程默认地点
pub const DEFAULT_LOCATION: &str = "RER";

// ==========================================
// 过程键 (store, id)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcessKey {
    pub database: String,
    pub code: String,
}

impl ProcessKey {
    pub fn new(database: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            code: code.into(),
        }
    }
}

impl fmt::Display for ProcessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.database, self.code)
    }
}

// ==========================================
// 交换 (Exchange)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub name: String,
    pub input: ProcessKey,
    pub amount: f64,
    pub unit: String,
    #[serde(rename = "type")]
    pub exchange_type: ExchangeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Exchange {
    /// 是否与另一交换指向同一 (name, input)
    pub fn same_target(&self, other: &Exchange) -> bool {
        self.name == other.name && self.input == other.input
    }
}

// ==========================================
// 过程 (Process)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    pub name: String,
    pub unit: String,
    pub location: String,
    #[serde(rename = "reference product")]
    pub reference_product: String,
    pub exchanges: Vec<Exchange>,
}

impl Process {
    /// 创建带生产交换的本地过程
    ///
    /// # 参数
    /// - database: 本地库名
    /// - name: 过程名（同时作为参考产品）
    /// - is_waste: 接收废物的过程生产交换为 -1，否则 +1
    pub fn new_local(database: &str, name: &str, is_waste: bool) -> (ProcessKey, Process) {
        let key = ProcessKey::new(database, Uuid::new_v4().to_string());
        let production = Exchange {
            name: name.to_string(),
            input: key.clone(),
            amount: if is_waste { -1.0 } else { 1.0 },
            unit: DEFAULT_UNIT.to_string(),
            exchange_type: ExchangeType::Production,
            location: None,
        };
        let process = Process {
            name: name.to_string(),
            unit: DEFAULT_UNIT.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            reference_product: name.to_string(),
            exchanges: vec![production],
        };
        (key, process)
    }

    /// 合并交换：(name, input) 已存在则累加数量，否则追加
    pub fn merge_exchange(&mut self, exchange: Exchange) {
        if let Some(existing) = self.exchanges.iter_mut().find(|e| e.same_target(&exchange)) {
            existing.amount += exchange.amount;
            return;
        }
        self.exchanges.push(exchange);
    }

    pub fn production_exchange(&self) -> Option<&Exchange> {
        self.exchanges
            .iter()
            .find(|e| e.exchange_type == ExchangeType::Production)
    }

    /// 按名称查找交换（测试与导出校验使用）
    pub fn find_exchange(&self, name: &str) -> Option<&Exchange> {
        self.exchanges
            .iter()
            .find(|e| e.name == name && e.exchange_type != ExchangeType::Production)
    }
}

// ==========================================
// 过程图 (Process Graph)
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessGraph {
    /// JSON 对象键只能是字符串，序列化为 [[key, process], ...]
    #[serde(with = "graph_entries")]
    pub processes: BTreeMap<ProcessKey, Process>,
}

mod graph_entries {
    use super::{Process, ProcessKey};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S>(map: &BTreeMap<ProcessKey, Process>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<ProcessKey, Process>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries: Vec<(ProcessKey, Process)> = Vec::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

impl ProcessGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ProcessKey, process: Process) {
        self.processes.insert(key, process);
    }

    pub fn get(&self, key: &ProcessKey) -> Option<&Process> {
        self.processes.get(key)
    }

    pub fn get_mut(&mut self, key: &ProcessKey) -> Option<&mut Process> {
        self.processes.get_mut(key)
    }

    pub fn contains(&self, key: &ProcessKey) -> bool {
        self.processes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProcessKey, &Process)> {
        self.processes.iter()
    }

    /// 不相交并入另一片段
    ///
    /// # 返回
    /// - Err(key): 键冲突（片段键空间应互不相交）
    pub fn absorb(&mut self, fragment: &ProcessGraph) -> Result<(), ProcessKey> {
        if let Some(key) = fragment.processes.keys().find(|k| self.processes.contains_key(*k)) {
            return Err(key.clone());
        }
        for (key, process) in &fragment.processes {
            self.processes.insert(key.clone(), process.clone());
        }
        Ok(())
    }
}
