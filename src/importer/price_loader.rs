// ==========================================
// MFA→LCI 过程图构建 - 价格表加载器
// ==========================================
// 输入: prices.json，形如 {"nickel": 16.5, "cobalt": 30.0}
// ==========================================

use crate::domain::price::PriceTable;
use crate::importer::error::{ImportError, ImportResult};
use std::collections::HashMap;
use std::path::Path;

pub fn load_price_table(path: &Path) -> ImportResult<PriceTable> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    let text = std::fs::read_to_string(path)?;
    parse_price_table(&text)
}

pub fn parse_price_table(text: &str) -> ImportResult<PriceTable> {
    let raw: HashMap<String, f64> = serde_json::from_str(text)?;
    Ok(raw.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_table() {
        let table = parse_price_table(r#"{"Nickel": 16.5, "cobalt": 30}"#).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.price("NICKEL"), Some(16.5));
    }

    #[test]
    fn test_parse_price_table_rejects_text_prices() {
        let err = parse_price_table(r#"{"nickel": "cheap"}"#).unwrap_err();
        assert!(matches!(err, ImportError::JsonParseError(_)));
    }
}
