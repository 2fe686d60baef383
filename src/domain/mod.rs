// ==========================================
// 助教工作量分配系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、报表结构
// 红线: 不含 I/O 逻辑,不含引擎逻辑
// ==========================================

pub mod allocation;
pub mod course;
pub mod preference;
pub mod quality;
pub mod report;
pub mod ta;
pub mod types;

// 重导出核心类型
pub use allocation::{Allocation, SkipReason, SkippedPreference};
pub use course::{CatalogRow, CourseDemand, CourseKey, DemandModel, WeightRow};
pub use preference::PreferenceRecord;
pub use quality::{DqLevel, DqSummary, DqViolation};
pub use report::{
    AllocationReportRow, AmbiguousMatch, ContactRow, ContractChangeRow, CourseResolution,
    NeedsReportRow, PreferenceReportRow, ReconciliationReport, RosterReport, SurveyTaRow,
};
pub use ta::{ContractRow, SurveyRanking, SurveyResponse, TeachingAssistant};
pub use types::{ContractChange, Cycle, CyclePreference, MatchStatus, ResolutionStep, Semester};
