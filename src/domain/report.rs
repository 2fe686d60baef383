// ==========================================
// 助教工作量分配系统 - 输出报表模型
// ==========================================
// 职责: 需求报表、偏好报表、分配结果、对账报告、花名册报告
// 说明: *Row 结构为扁平结构，可直接写为 CSV
// ==========================================

use crate::domain::course::CourseKey;
use crate::domain::types::{ContractChange, Cycle, CyclePreference, MatchStatus, ResolutionStep};
use serde::{Deserialize, Serialize};

// ==========================================
// 三张主输出表
// ==========================================

/// 课程需求报表行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedsReportRow {
    pub cycle: Cycle,
    pub course: String,
    pub term: String,
    pub class_count: u32,
    pub slot_count: u32,
    pub initial_need: Option<f64>,
    pub final_need: Option<f64>,
    // 仅 MST：折算为小时（展示用）
    pub initial_hours: Option<f64>,
    pub final_hours: Option<f64>,
    pub match_status: MatchStatus,
}

/// 清洗后偏好表行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceReportRow {
    pub cycle: Cycle,
    pub course: String,
    pub ta: String,
    pub cycle_preference: CyclePreference,
    pub rank: u8,
}

/// 分配结果行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationReportRow {
    pub cycle: Cycle,
    pub course: String,
    pub ta: String,
    pub amount: f64,
}

// ==========================================
// 对账报告
// ==========================================

/// 问卷课程 → 目录课程的解析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseResolution {
    pub survey_course: CourseKey,
    pub catalog_course: CourseKey,
    pub step: ResolutionStep,
}

/// 放宽键命中多条目录课程（取字典序最小者）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbiguousMatch {
    pub survey_course: CourseKey,
    pub step: ResolutionStep,
    pub chosen: CourseKey,
    pub candidates: Vec<CourseKey>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub needs: Vec<NeedsReportRow>,
    pub resolutions: Vec<CourseResolution>,
    pub ambiguous_matches: Vec<AmbiguousMatch>,
    pub unmatched_courses: Vec<CourseKey>,
    pub orphaned_tas: Vec<String>,
}

impl ReconciliationReport {
    pub fn count_by_status(&self, status: MatchStatus) -> usize {
        self.needs.iter().filter(|row| row.match_status == status).count()
    }
}

// ==========================================
// 花名册报告
// ==========================================

/// 问卷中的助教（离任/未知合同）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyTaRow {
    pub ta: String,
    pub full_name: Option<String>,
}

/// 合同变更申请
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractChangeRow {
    pub ta: String,
    pub master_student: bool,
    pub has_restriction: bool,
    pub change: ContractChange,
    pub load_requested: Option<f64>,
    pub contract: Option<f64>,
    pub new_capacity: Option<f64>,
}

/// 需要联系的助教（有合同、未填偏好、未离任）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRow {
    pub ta: String,
    pub contract: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterReport {
    pub zero_contract_tas: Vec<String>,
    pub leaving_tas: Vec<SurveyTaRow>,
    pub unknown_tas: Vec<SurveyTaRow>,
    pub contract_changes: Vec<ContractChangeRow>,
    pub tas_to_contact: Vec<ContactRow>,
}
