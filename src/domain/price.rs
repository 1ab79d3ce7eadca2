// ==========================================
// MFA→LCI 过程图构建 - 材料价格表
// ==========================================
// 下游按价格分摊影响时使用；材料名大小写不敏感
// ==========================================

use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    prices: HashMap<String, f64>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, material: &str, price: f64) {
        self.prices.insert(normalize(material), price);
    }

    pub fn price(&self, material: &str) -> Option<f64> {
        self.prices.get(&normalize(material)).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// 返回缺少价格的材料（按输入顺序，去重）
    pub fn missing<'a, I>(&self, materials: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut missing: Vec<String> = Vec::new();
        for material in materials {
            if self.price(material).is_none() && !missing.iter().any(|m| m == material) {
                missing.push(material.to_string());
            }
        }
        missing
    }
}

impl<S: AsRef<str>> FromIterator<(S, f64)> for PriceTable {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut table = PriceTable::new();
        for (material, price) in iter {
            table.insert(material.as_ref(), price);
        }
        table
    }
}

fn normalize(material: &str) -> String {
    material.trim().to_lowercase()
}
