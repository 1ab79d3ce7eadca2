// ==========================================
// MFA→LCI 过程图构建 - SQLite 连接初始化
// ==========================================
// 用途: 读取以 SQLite 导出的外部目录库（catalog_entry 表）
// 目录库只读打开，统一 busy_timeout
// ==========================================

use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 目录库表名
pub const CATALOG_TABLE: &str = "catalog_entry";

/// 配置 SQLite 连接的统一 PRAGMA
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 只读打开目录库并应用统一配置
pub fn open_catalog_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 表是否存在
pub fn has_table(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    let found: Option<bool> = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1 LIMIT 1",
            [table],
            |_row| Ok(true),
        )
        .optional()?;
    Ok(found.unwrap_or(false))
}

/// 表中是否存在某列
pub fn has_column(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let names = stmt.query_map([table], |row| row.get::<_, String>(0))?;
    for name in names {
        if name?.eq_ignore_ascii_case(column) {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_has_table() {
        let temp = NamedTempFile::new().unwrap();
        let path = temp.path().to_str().unwrap().to_string();
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE catalog_entry (code TEXT);").unwrap();
        }

        let conn = open_catalog_connection(&path).unwrap();
        assert!(has_table(&conn, CATALOG_TABLE).unwrap());
        assert!(!has_table(&conn, "schema_version").unwrap());
        assert!(has_column(&conn, CATALOG_TABLE, "code").unwrap());
        assert!(!has_column(&conn, CATALOG_TABLE, "database").unwrap());
    }
}
