// ==========================================
// 助教工作量分配系统 - 分配日志
// ==========================================
// 红线: 只追加，不修改，不删除
// ==========================================

use crate::domain::course::CourseKey;
use crate::domain::types::Cycle;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Allocation - 单条分配
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub seq_no: usize,
    pub ta: String,
    pub course: CourseKey,
    pub cycle: Cycle,
    pub amount: f64, // > 0，占满额合同的比例
}

// ==========================================
// SkipReason - 未分配原因
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    RankNotAutoAllocated,
    CyclePreferenceMismatch,
    MasterStudentConflict,
    NeedUndefined,
    UnsupportedCycle,
    UnknownTa,
    CourseExhausted,
    TaExhausted,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            SkipReason::RankNotAutoAllocated => "RANK_NOT_AUTO_ALLOCATED",
            SkipReason::CyclePreferenceMismatch => "CYCLE_PREFERENCE_MISMATCH",
            SkipReason::MasterStudentConflict => "MASTER_STUDENT_CONFLICT",
            SkipReason::NeedUndefined => "NEED_UNDEFINED",
            SkipReason::UnsupportedCycle => "UNSUPPORTED_CYCLE",
            SkipReason::UnknownTa => "UNKNOWN_TA",
            SkipReason::CourseExhausted => "COURSE_EXHAUSTED",
            SkipReason::TaExhausted => "TA_EXHAUSTED",
        };
        write!(f, "{}", code)
    }
}

// ==========================================
// SkippedPreference - 未产生分配的偏好记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedPreference {
    pub ta: String,
    pub course: CourseKey,
    pub rank: u8,
    pub reason: SkipReason,
}
