// ==========================================
// 助教工作量分配系统 - 导入层
// ==========================================
// 职责: CSV 输入 → 类型化记录 + DQ 违规
// 输入: 课程目录 / 本科权重 / 合同 / 问卷
// ==========================================

pub mod data_cleaner;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;
pub mod schema;
pub mod table_loader;

// 重导出核心类型
pub use data_cleaner::DataCleaner;
pub use dq_validator::DqValidator;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{CsvParser, RawRow, RawTable};
pub use importer_trait::FileParser;
pub use schema::{ResolvedColumns, SurveySchema};
pub use table_loader::{InputPaths, InputTables, TableLoader};
