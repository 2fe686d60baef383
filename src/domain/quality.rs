// ==========================================
// 助教工作量分配系统 - 数据质量模型
// ==========================================
// 非致命问题统一累积为 DqViolation，不中断运行
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// DqLevel - 数据质量级别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DqLevel {
    Error,    // 错误（该行被排除）
    Warning,  // 警告（该值被忽略）
    Info,     // 提示（仅记录）
    Conflict, // 冲突（重复键，保留首条）
}

// ==========================================
// DqViolation - 数据质量违规
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DqViolation {
    pub table: String,      // 来源表
    pub row_number: usize,  // 原始文件行号
    pub key: Option<String>, // 行键（课程标签/助教邮箱）
    pub level: DqLevel,
    pub field: String,
    pub message: String,
}

// ==========================================
// DqSummary - 数据质量汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DqSummary {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
    pub conflict: usize,
}

impl DqSummary {
    pub fn from_violations(violations: &[DqViolation]) -> Self {
        let mut summary = Self::default();
        for v in violations {
            match v.level {
                DqLevel::Error => summary.error += 1,
                DqLevel::Warning => summary.warning += 1,
                DqLevel::Info => summary.info += 1,
                DqLevel::Conflict => summary.conflict += 1,
            }
        }
        summary
    }
}
