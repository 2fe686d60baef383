// ==========================================
// 助教工作量分配系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 致命: 文件级错误 + 必需列缺失；行级问题进入 DQ 报告
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 结构错误（致命）=====
    #[error("必需列缺失 (表 {table}): {column}")]
    MissingRequiredColumn { table: String, column: String },

    // ===== 行级错误 =====
    #[error("类型转换失败 (行 {row}, 字段 {field}): {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },

    #[error("必填值为空 (行 {row}, 字段 {field})")]
    EmptyRequiredValue { row: usize, field: String },

    // ===== 配置错误 =====
    #[error("配置读取失败: {0}")]
    ConfigError(#[from] crate::config::ConfigError),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 是否为致命错误（中止本次运行）
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ImportError::TypeConversionError { .. } | ImportError::EmptyRequiredValue { .. }
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
