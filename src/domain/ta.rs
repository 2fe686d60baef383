// ==========================================
// 助教工作量分配系统 - 助教领域模型
// ==========================================
// 职责: 合同行、问卷答卷、助教花名册条目
// 红线: capacity ∈ [0, 1]，分配过程中不得为负
// ==========================================

use crate::domain::course::CourseKey;
use crate::domain::types::{ContractChange, CyclePreference};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// ContractRow - 合同行
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractRow {
    pub ta: String,    // 小写邮箱
    pub contract: f64, // 合同比例
    pub row_number: usize,
}

// ==========================================
// SurveyRanking - 问卷中单门课程的排名
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRanking {
    pub course: CourseKey,
    pub rank: u8,
}

// ==========================================
// SurveyResponse - 问卷答卷（一行一位助教）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub ta: String,
    pub full_name: Option<String>,
    pub end_date: Option<NaiveDateTime>,

    // ===== 问卷问题 =====
    pub continues: bool,                  // 是否继续担任助教
    pub master_student_with_courses: bool, // 下学期仍修读硕士课程
    pub has_restriction: bool,            // 存在工作量限制（奖学金等）
    pub cycle_preference: CyclePreference,
    pub contract_change: ContractChange,
    pub decreased_load: Option<f64>,
    pub increased_load: Option<f64>,

    // ===== 课程排名（按问卷列顺序）=====
    pub rankings: Vec<SurveyRanking>,

    pub row_number: usize,
}

impl SurveyResponse {
    pub fn has_rankings(&self) -> bool {
        !self.rankings.is_empty()
    }

    /// 申请的工作量（减少/增加两个答案的均值）
    pub fn requested_load(&self) -> Option<f64> {
        match (self.decreased_load, self.increased_load) {
            (Some(a), Some(b)) => Some((a + b) / 2.0),
            (Some(a), None) | (None, Some(a)) => Some(a),
            (None, None) => None,
        }
    }
}

// ==========================================
// TeachingAssistant - 花名册条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeachingAssistant {
    pub id: String,
    pub full_name: Option<String>,
    pub contract: f64, // 原合同比例
    pub capacity: f64, // 本学期可分配比例（已应用合同变更）
    pub is_master_student: bool,
    pub left_program: bool,
    pub has_restriction: bool,
}
