// ==========================================
// MFA→LCI 过程图构建 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls，按工作表) / CSV (.csv)
// 输出: 原始行记录（列名 → 去首尾空白的文本），空白单元格为 ""
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

// ==========================================
// RawRecord - 原始行记录
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    /// 源文件中的行号（表头为第 1 行）
    pub row_number: usize,
    pub cells: HashMap<String, String>,
}

impl RawRecord {
    /// 读取单元格，列缺失时返回空字符串哨兵
    pub fn get(&self, column: &str) -> &str {
        self.cells.get(column).map(|v| v.as_str()).unwrap_or("")
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }
}

// ==========================================
// FileParser Trait
// ==========================================
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行记录
    ///
    /// # 返回
    /// - Ok((表头, 行记录)): 完全空白的行已跳过
    /// - Err: 文件不存在、格式错误
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<(Vec<String>, Vec<RawRecord>)>;
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<(Vec<String>, Vec<RawRecord>)> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        if let Some(ext) = path.extension() {
            if ext != "csv" {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        // 打开 CSV 文件
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        // 读取所有行
        let mut records = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let mut row_map = HashMap::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳过完全空白的行
            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(RawRecord {
                row_number: row_idx + 2,
                cells: row_map,
            });
        }

        Ok((headers, records))
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
// 规则表为 "每个产品一张工作表"，因此按工作表名读取
pub struct ExcelParser;

impl ExcelParser {
    fn check_path(path: &Path) -> ImportResult<()> {
        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext.to_string()));
        }
        Ok(())
    }

    /// 列出工作簿中的工作表名
    pub fn sheet_names(&self, file_path: &Path) -> ImportResult<Vec<String>> {
        Self::check_path(file_path)?;
        let workbook = open_workbook_auto(file_path)?;
        Ok(workbook.sheet_names().to_vec())
    }

    /// 读取指定工作表
    pub fn parse_sheet(
        &self,
        file_path: &Path,
        sheet_name: &str,
    ) -> ImportResult<(Vec<String>, Vec<RawRecord>)> {
        Self::check_path(file_path)?;
        let mut workbook = open_workbook_auto(file_path)?;

        if !workbook.sheet_names().iter().any(|s| s == sheet_name) {
            return Err(ImportError::SheetNotFound(sheet_name.to_string()));
        }

        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        // 区域从第一个非空单元格开始，行号需加上起始偏移
        let first_row = range.start().map_or(0, |(row, _)| row as usize);

        // 提取表头（区域第一行）
        let mut rows = range.rows();
        let header_row = match rows.next() {
            Some(row) => row,
            None => return Ok((Vec::new(), Vec::new())),
        };

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        // 读取数据行
        let mut records = Vec::new();
        for (row_idx, data_row) in rows.enumerate() {
            let mut row_map = HashMap::new();

            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    let value = cell.to_string().trim().to_string();
                    row_map.insert(header.clone(), value);
                }
            }

            // 跳过完全空白的行
            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(RawRecord {
                row_number: sheet_row_number(first_row, row_idx),
                cells: row_map,
            });
        }

        Ok((headers, records))
    }
}

/// 数据行在工作表中的行号（1 起）
///
/// first_row 为表头所在的 0 起行索引，data_idx 为表头之后的 0 起序号
fn sheet_row_number(first_row: usize, data_idx: usize) -> usize {
    first_row + data_idx + 2
}

impl FileParser for ExcelParser {
    /// 读取第一个工作表
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<(Vec<String>, Vec<RawRecord>)> {
        let sheet_names = self.sheet_names(file_path)?;
        let first = sheet_names
            .first()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        self.parse_sheet(file_path, first)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<(Vec<String>, Vec<RawRecord>)> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_to_raw_records(path),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_records(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn temp_csv() -> tempfile::NamedTempFile {
        Builder::new().suffix(".csv").tempfile().unwrap()
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let mut temp_file = temp_csv();
        writeln!(temp_file, "Stock/Flow ID,Layer 4,Value").unwrap();
        writeln!(temp_file, "BATT_IN, Ni ,2.5").unwrap();
        writeln!(temp_file, "BATT_IN,,3.0").unwrap();

        let (headers, records) = CsvParser.parse_to_raw_records(temp_file.path()).unwrap();

        assert_eq!(headers, vec!["Stock/Flow ID", "Layer 4", "Value"]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Layer 4"), "Ni");
        assert_eq!(records[1].get("Layer 4"), "");
        assert_eq!(records[1].row_number, 3);
        assert_eq!(records[0].get("Unknown"), "");
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_to_raw_records(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let mut temp_file = temp_csv();
        writeln!(temp_file, "Stock/Flow ID,Value").unwrap();
        writeln!(temp_file, "A,2.5").unwrap();
        writeln!(temp_file, ",").unwrap(); // 空行
        writeln!(temp_file, "B,3.0").unwrap();

        let (_, records) = CsvParser.parse_to_raw_records(temp_file.path()).unwrap();

        // 应跳过空行，行号保持源文件位置
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].row_number, 4);
    }

    #[test]
    fn test_sheet_row_number_includes_leading_blank_rows() {
        // 表头在 A1
        assert_eq!(sheet_row_number(0, 0), 2);
        // 表头前有 3 行空白：表头在第 4 行，第一条数据在第 5 行
        assert_eq!(sheet_row_number(3, 0), 5);
        assert_eq!(sheet_row_number(3, 4), 9);
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let result = UniversalFileParser.parse("flows.parquet");
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }
}
