// ==========================================
// MFA→LCI 过程图构建 - 批处理配置
// ==========================================
// 格式: JSON（serde，缺省字段取默认值）
// 查找顺序: 命令行 --config > 环境变量 MFA_LCI_CONFIG > ./mfa_lci_config.json
// 输出目录: 配置项 > 环境变量 MFA_LCI_OUTPUT_DIR > 用户数据目录/mfa-lci-builder
// ==========================================

use crate::domain::catalog::ReferenceStore;
use crate::domain::process::DEFAULT_LOCATION;
use crate::domain::types::{Scenario, StoreKind};
use crate::engine::graph_builder::{ProcessGraphBuilder, DEFAULT_LOCAL_DATABASE};
use crate::engine::orchestrator::{BatchRequest, RouteSelection};
use crate::engine::resolution_cache::DEFAULT_CACHE_CAPACITY;
use crate::engine::scenario_resolver::{ScenarioResolver, DEFAULT_SNAPSHOT_YEARS};
use crate::importer::catalog_loader::{CsvCatalogLoader, SqliteCatalogLoader};
use crate::importer::error::ImportResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "MFA_LCI_CONFIG";

/// 输出目录环境变量
pub const OUTPUT_DIR_ENV: &str = "MFA_LCI_OUTPUT_DIR";

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "mfa_lci_config.json";

const APP_DIR: &str = "mfa-lci-builder";

// ==========================================
// 配置错误
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件解析失败 {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("配置校验失败: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// 子配置
// ==========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// 路线标识（输入目录名）
    pub id: String,
    /// 活动名称前缀
    pub display_prefix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogFormat {
    Csv,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSource {
    /// 库名（同时作为解析结果的库标识）
    pub name: String,
    pub kind: StoreKind,
    pub path: PathBuf,
    pub format: CatalogFormat,
}

impl CatalogSource {
    pub fn load(&self) -> ImportResult<ReferenceStore> {
        match self.format {
            CatalogFormat::Csv => CsvCatalogLoader.load(&self.path, &self.name, self.kind),
            CatalogFormat::Sqlite => SqliteCatalogLoader.load(&self.path, &self.name, self.kind),
        }
    }
}

/// 闭区间年份窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearWindow {
    pub start: i32,
    pub end: i32,
}

impl YearWindow {
    pub fn range(&self) -> RangeInclusive<i32> {
        self.start..=self.end
    }
}

// ==========================================
// BuilderConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub input_dir: PathBuf,
    pub output_dir: Option<PathBuf>,
    /// 本地过程所在库名
    pub local_database: String,
    pub routes: Vec<RouteConfig>,
    pub products: Vec<String>,
    pub years: Vec<i32>,
    pub scenarios: Vec<Scenario>,
    pub locations: Vec<String>,
    pub snapshot_years: Vec<i32>,
    /// 情景别名，例如 {"OBS": "BAU"}
    pub scenario_aliases: BTreeMap<String, String>,
    /// 情景有效年份窗口
    pub scenario_windows: BTreeMap<String, YearWindow>,
    pub default_region: String,
    pub cache_capacity: usize,
    pub catalogs: Vec<CatalogSource>,
    pub price_table: Option<PathBuf>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data/input"),
            output_dir: None,
            local_database: DEFAULT_LOCAL_DATABASE.to_string(),
            routes: Vec::new(),
            products: Vec::new(),
            years: (2010..=2050).collect(),
            scenarios: Scenario::ALL.to_vec(),
            locations: vec!["EU27+4".to_string()],
            snapshot_years: DEFAULT_SNAPSHOT_YEARS.to_vec(),
            scenario_aliases: BTreeMap::from([("OBS".to_string(), "BAU".to_string())]),
            scenario_windows: BTreeMap::from([
                ("OBS".to_string(), YearWindow { start: 2010, end: 2024 }),
                ("BAU".to_string(), YearWindow { start: 2025, end: 2050 }),
                ("REC".to_string(), YearWindow { start: 2025, end: 2050 }),
                ("CIR".to_string(), YearWindow { start: 2025, end: 2050 }),
            ]),
            default_region: DEFAULT_LOCATION.to_string(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            catalogs: Vec::new(),
            price_table: None,
        }
    }
}

impl BuilderConfig {
    /// 从 JSON 文件加载
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_json(text: &str) -> ConfigResult<Self> {
        serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })
    }

    /// 配置文件路径: 显式参数 > 环境变量 > 当前目录默认文件
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// 输出目录: 配置项 > 环境变量 > 用户数据目录
    pub fn resolved_output_dir(&self) -> PathBuf {
        if let Some(dir) = &self.output_dir {
            return dir.clone();
        }
        if let Ok(dir) = std::env::var(OUTPUT_DIR_ENV) {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }
        match dirs::data_dir() {
            Some(data_dir) => data_dir.join(APP_DIR).join("output"),
            None => PathBuf::from("./output"),
        }
    }

    /// 校验配置
    ///
    /// 拒绝: 空选择、空快照年份、零缓存容量、非法情景名、倒置年份窗口
    pub fn validate(&self) -> ConfigResult<()> {
        let empty_selections = [
            ("routes", self.routes.is_empty()),
            ("products", self.products.is_empty()),
            ("years", self.years.is_empty()),
            ("scenarios", self.scenarios.is_empty()),
            ("locations", self.locations.is_empty()),
            ("snapshot_years", self.snapshot_years.is_empty()),
        ];
        if let Some((field, _)) = empty_selections.iter().find(|(_, empty)| *empty) {
            return Err(ConfigError::Invalid(format!("{} 不能为空", field)));
        }

        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid("cache_capacity 必须大于 0".to_string()));
        }

        if let Some(route) = self.routes.iter().find(|r| r.id.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "路线标识不能为空 (display_prefix={})",
                route.display_prefix
            )));
        }

        self.aliases()?;
        self.windows()?;
        Ok(())
    }

    pub fn aliases(&self) -> ConfigResult<BTreeMap<Scenario, Scenario>> {
        self.scenario_aliases
            .iter()
            .map(|(from, to)| Ok((parse_scenario(from)?, parse_scenario(to)?)))
            .collect()
    }

    pub fn windows(&self) -> ConfigResult<BTreeMap<Scenario, RangeInclusive<i32>>> {
        self.scenario_windows
            .iter()
            .map(|(scenario, window)| {
                if window.start > window.end {
                    return Err(ConfigError::Invalid(format!(
                        "情景 {} 的年份窗口倒置: {}..{}",
                        scenario, window.start, window.end
                    )));
                }
                Ok((parse_scenario(scenario)?, window.range()))
            })
            .collect()
    }

    pub fn batch_request(&self) -> BatchRequest {
        BatchRequest {
            routes: self
                .routes
                .iter()
                .map(|r| RouteSelection {
                    id: r.id.clone(),
                    display_prefix: r.display_prefix.clone(),
                })
                .collect(),
            products: self.products.clone(),
            years: self.years.clone(),
            scenarios: self.scenarios.clone(),
            locations: self.locations.clone(),
        }
    }

    pub fn graph_builder(&self) -> ProcessGraphBuilder {
        ProcessGraphBuilder::new(self.local_database.clone(), self.default_region.clone())
    }

    pub fn scenario_resolver(&self) -> ConfigResult<ScenarioResolver> {
        ScenarioResolver::new(
            self.snapshot_years.iter().copied(),
            self.aliases()?,
            self.windows()?,
        )
        .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

fn parse_scenario(text: &str) -> ConfigResult<Scenario> {
    Scenario::parse(text).ok_or_else(|| ConfigError::Invalid(format!("未知情景: {}", text)))
}
