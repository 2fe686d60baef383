// ==========================================
// 助教工作量分配系统 - 导入 Trait
// ==========================================
// 职责: 定义导入接口（不包含实现）
// ==========================================

use crate::importer::error::ImportResult;
use crate::importer::file_parser::RawTable;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始表（保留表头顺序）
    ///
    /// # 返回
    /// - Ok(RawTable): 表头 + 非空行
    /// - Err: 文件不存在、格式不支持、CSV 结构错误
    fn parse_to_raw_table(&self, file_path: &Path) -> ImportResult<RawTable>;
}
