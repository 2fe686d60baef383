// ==========================================
// 助教工作量分配系统 - 引擎错误类型
// ==========================================

use crate::config::ConfigError;
use crate::engine::capacity_ledger::LedgerError;
use crate::importer::ImportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("账本操作失败: {0}")]
    Ledger(#[from] LedgerError),

    #[error("配置读取失败: {0}")]
    Config(#[from] ConfigError),

    #[error("输入加载失败: {0}")]
    Import(#[from] ImportError),

    #[error("输入数据非法: {0}")]
    InvalidInput(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
