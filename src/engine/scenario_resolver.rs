// ==========================================
// MFA→LCI 过程图构建 - 情景/年份解析器
// ==========================================
// 纯映射: (情景, 年份) → 最近的背景数据库快照
// - 年份取离散快照集合中最近者，等距时取较小年份
// - 情景先经别名映射（观测情景使用基准情景的背景库）
// 另负责组合过滤: 情景只在其支持的年份窗口内有效
// ==========================================

use crate::domain::lci::BackgroundSnapshot;
use crate::domain::types::Scenario;
use crate::engine::error::{BuildError, BuildResult};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

/// 默认背景快照年份
pub const DEFAULT_SNAPSHOT_YEARS: [i32; 4] = [2020, 2030, 2040, 2050];

/// 观测情景年份窗口
pub const OBSERVED_YEARS: RangeInclusive<i32> = 2010..=2024;

/// 预测情景年份窗口
pub const PROJECTED_YEARS: RangeInclusive<i32> = 2025..=2050;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioResolver {
    snapshot_years: BTreeSet<i32>,
    aliases: BTreeMap<Scenario, Scenario>,
    windows: BTreeMap<Scenario, RangeInclusive<i32>>,
}

impl Default for ScenarioResolver {
    fn default() -> Self {
        let windows = Scenario::ALL
            .iter()
            .map(|s| {
                let window = match s {
                    Scenario::Obs => OBSERVED_YEARS,
                    _ => PROJECTED_YEARS,
                };
                (*s, window)
            })
            .collect();

        Self {
            snapshot_years: DEFAULT_SNAPSHOT_YEARS.into_iter().collect(),
            aliases: BTreeMap::from([(Scenario::Obs, Scenario::Bau)]),
            windows,
        }
    }
}

impl ScenarioResolver {
    /// 创建解析器
    ///
    /// # 错误
    /// - EmptySnapshotYears: 快照年份集合为空
    pub fn new(
        snapshot_years: impl IntoIterator<Item = i32>,
        aliases: BTreeMap<Scenario, Scenario>,
        windows: BTreeMap<Scenario, RangeInclusive<i32>>,
    ) -> BuildResult<Self> {
        let snapshot_years: BTreeSet<i32> = snapshot_years.into_iter().collect();
        if snapshot_years.is_empty() {
            return Err(BuildError::EmptySnapshotYears);
        }
        Ok(Self {
            snapshot_years,
            aliases,
            windows,
        })
    }

    /// 保留默认别名与窗口，仅替换快照年份
    pub fn with_snapshot_years(snapshot_years: impl IntoIterator<Item = i32>) -> BuildResult<Self> {
        let defaults = Self::default();
        Self::new(snapshot_years, defaults.aliases, defaults.windows)
    }

    pub fn snapshot_years(&self) -> impl Iterator<Item = i32> + '_ {
        self.snapshot_years.iter().copied()
    }

    /// 情景别名（无别名时返回自身）
    pub fn canonical_scenario(&self, scenario: Scenario) -> Scenario {
        self.aliases.get(&scenario).copied().unwrap_or(scenario)
    }

    /// 最近快照年份，等距取较小者
    pub fn nearest_year(&self, year: i32) -> BuildResult<i32> {
        // 升序遍历 + 严格小于比较: 等距时保留先出现的较小年份
        let mut best: Option<(i32, i32)> = None;
        for &candidate in &self.snapshot_years {
            let distance = (candidate - year).abs();
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((candidate, distance)),
            }
        }
        best.map(|(y, _)| y).ok_or(BuildError::EmptySnapshotYears)
    }

    /// (情景, 年份) → 背景快照
    pub fn resolve(&self, scenario: Scenario, year: i32) -> BuildResult<BackgroundSnapshot> {
        Ok(BackgroundSnapshot {
            scenario: self.canonical_scenario(scenario),
            year: self.nearest_year(year)?,
        })
    }

    /// 组合是否有效（情景在该年份有数据）
    ///
    /// 未配置窗口的情景视为所有年份有效
    pub fn supports(&self, scenario: Scenario, year: i32) -> bool {
        self.windows
            .get(&scenario)
            .map_or(true, |window| window.contains(&year))
    }
}
