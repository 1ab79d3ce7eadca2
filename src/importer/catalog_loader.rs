// ==========================================
// MFA→LCI 过程图构建 - 外部目录库加载器
// ==========================================
// 支持: CSV 导出 / SQLite 导出（catalog_entry 表）
// CSV 列: code, name, location, reference product, categories
// SQLite: 可选 database 列，存在时按库名过滤（多库合并导出）
// ==========================================

use crate::db::{has_column, has_table, open_catalog_connection, CATALOG_TABLE};
use crate::domain::catalog::{CatalogEntry, ReferenceStore};
use crate::domain::types::StoreKind;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{CsvParser, FileParser};
use crate::importer::rule_sheet_loader::split_list;
use std::path::Path;
use tracing::info;

pub mod columns {
    pub const CODE: &str = "code";
    pub const NAME: &str = "name";
    pub const LOCATION: &str = "location";
    pub const REFERENCE_PRODUCT: &str = "reference product";
    pub const CATEGORIES: &str = "categories";
}

// ==========================================
// CSV 目录库
// ==========================================
pub struct CsvCatalogLoader;

impl CsvCatalogLoader {
    pub fn load(&self, path: &Path, store_name: &str, kind: StoreKind) -> ImportResult<ReferenceStore> {
        let (headers, raw_records) = CsvParser.parse_to_raw_records(path)?;

        let missing: Vec<&str> = [columns::CODE, columns::NAME]
            .into_iter()
            .filter(|c| !headers.iter().any(|h| h == c))
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns {
                source_name: path.display().to_string(),
                columns: missing.join(", "),
            });
        }

        let entries: Vec<CatalogEntry> = raw_records
            .iter()
            .map(|raw| CatalogEntry {
                code: raw.get(columns::CODE).to_string(),
                name: raw.get(columns::NAME).to_string(),
                location: raw.get(columns::LOCATION).to_string(),
                reference_product: raw.get(columns::REFERENCE_PRODUCT).to_string(),
                categories: split_list(raw.get(columns::CATEGORIES)),
            })
            .collect();

        info!(store = store_name, %kind, entries = entries.len(), "CSV 目录库加载完成");
        Ok(ReferenceStore::new(store_name, kind, entries))
    }
}

// ==========================================
// SQLite 目录库
// ==========================================
// catalog_entry([database,] code, name, location, reference_product, categories)
pub struct SqliteCatalogLoader;

impl SqliteCatalogLoader {
    pub fn load(&self, path: &Path, store_name: &str, kind: StoreKind) -> ImportResult<ReferenceStore> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let conn = open_catalog_connection(&path.to_string_lossy())?;
        if !has_table(&conn, CATALOG_TABLE)? {
            return Err(ImportError::CatalogQueryError(format!(
                "{} 中缺少 {} 表",
                path.display(),
                CATALOG_TABLE
            )));
        }

        let columns = "SELECT code, name, COALESCE(location, ''), COALESCE(reference_product, ''), COALESCE(categories, '')
             FROM catalog_entry";
        let map_entry = |row: &rusqlite::Row<'_>| -> rusqlite::Result<CatalogEntry> {
            Ok(CatalogEntry {
                code: row.get::<_, String>(0)?,
                name: row.get::<_, String>(1)?,
                location: row.get::<_, String>(2)?,
                reference_product: row.get::<_, String>(3)?,
                categories: split_list(&row.get::<_, String>(4)?),
            })
        };

        // 单库导出没有 database 列，整表即为该库
        let entries = if has_column(&conn, CATALOG_TABLE, "database")? {
            let mut stmt = conn.prepare(&format!("{} WHERE database = ?1 ORDER BY rowid", columns))?;
            let rows = stmt.query_map([store_name], map_entry)?;
            rows.collect::<Result<Vec<_>, _>>()?
        } else {
            let mut stmt = conn.prepare(&format!("{} ORDER BY rowid", columns))?;
            let rows = stmt.query_map([], map_entry)?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        info!(store = store_name, %kind, entries = entries.len(), "SQLite 目录库加载完成");
        Ok(ReferenceStore::new(store_name, kind, entries))
    }
}
