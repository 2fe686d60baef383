// ==========================================
// 助教工作量分配系统 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析
// 支持: CSV (.csv)
// 输出: 保留表头顺序的原始表（问卷课程列依赖列顺序）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FileParser;
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

// ==========================================
// RawTable - 原始表
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

#[derive(Debug, Clone, Default)]
pub struct RawRow {
    pub row_number: usize,   // 文件行号（表头为第 1 行）
    pub values: Vec<String>, // 按列位置存放，与表头一一对应（同名表头各占一列）
}

impl RawRow {
    /// 按列位置读取单元格（已 trim；空串或越界视为缺失）
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values
            .get(index)
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 从任意 Reader 解析 CSV
    pub fn parse_reader<R: Read>(&self, reader: R) -> ImportResult<RawTable> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(reader);

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        // 读取所有行
        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            // 短行补空，长行截断到表头宽度
            let mut values: Vec<String> = record
                .iter()
                .take(headers.len())
                .map(|value| value.trim().to_string())
                .collect();
            values.resize(headers.len(), String::new());

            // 跳过完全空白的行
            if values.iter().all(|v| v.is_empty()) {
                continue;
            }

            rows.push(RawRow {
                row_number: row_idx + 2,
                values,
            });
        }

        Ok(RawTable { headers, rows })
    }
}

impl FileParser for CsvParser {
    fn parse_to_raw_table(&self, file_path: &Path) -> ImportResult<RawTable> {
        // 检查文件存在
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        // 检查扩展名
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        self.parse_reader(file)
    }
}
