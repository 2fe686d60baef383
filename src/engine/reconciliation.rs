// ==========================================
// 助教工作量分配系统 - 对账报告
// ==========================================
// 职责: 分配结束后逐门课程判定满足程度 + 汇总报表行
// 判定顺序:
//   1) ME                        → UNSUPPORTED
//   2) 需求未定义                → UNDEFINED_NEED
//   3) initial == remaining      → NO_CHANGE（含需求为 0）
//   4) remaining == 0            → FULLY_MATCHED
//   5) 其他                      → PARTIALLY_MATCHED
// ==========================================

use crate::domain::allocation::Allocation;
use crate::domain::course::{CourseDemand, DemandModel};
use crate::domain::preference::PreferenceRecord;
use crate::domain::report::{
    AllocationReportRow, NeedsReportRow, PreferenceReportRow, ReconciliationReport,
};
use crate::domain::types::{Cycle, MatchStatus};
use crate::engine::identity_resolver::ResolutionOutcome;
use tracing::{info, instrument};

pub struct ReconciliationReporter {
    contract_hours: f64,
}

impl ReconciliationReporter {
    pub fn new(contract_hours: f64) -> Self {
        Self { contract_hours }
    }

    pub fn classify(&self, demand: &CourseDemand) -> MatchStatus {
        if demand.cycle == Cycle::Me {
            return MatchStatus::Unsupported;
        }
        let (Some(initial), Some(remaining)) = (demand.initial_need, demand.remaining_need) else {
            return MatchStatus::UndefinedNeed;
        };
        if initial == remaining {
            MatchStatus::NoChange
        } else if remaining == 0.0 {
            MatchStatus::FullyMatched
        } else {
            MatchStatus::PartiallyMatched
        }
    }

    /// 生成对账报告
    ///
    /// # 参数
    /// - `demand`: 分配结束后的需求模型
    /// - `resolution`: 课程身份解析结果
    /// - `orphaned_tas`: 偏好全部指向未解析课程的助教
    #[instrument(skip_all, fields(courses = demand.len()))]
    pub fn reconcile(
        &self,
        demand: &DemandModel,
        resolution: &ResolutionOutcome,
        orphaned_tas: Vec<String>,
    ) -> ReconciliationReport {
        let needs: Vec<NeedsReportRow> = demand.iter().map(|d| self.needs_row(d)).collect();

        let report = ReconciliationReport {
            needs,
            resolutions: resolution.resolutions(),
            ambiguous_matches: resolution.ambiguous.clone(),
            unmatched_courses: resolution.unmatched.clone(),
            orphaned_tas,
        };

        info!(
            fully_matched = report.count_by_status(MatchStatus::FullyMatched),
            partially_matched = report.count_by_status(MatchStatus::PartiallyMatched),
            no_change = report.count_by_status(MatchStatus::NoChange),
            undefined_need = report.count_by_status(MatchStatus::UndefinedNeed),
            unsupported = report.count_by_status(MatchStatus::Unsupported),
            unmatched_courses = report.unmatched_courses.len(),
            orphaned_tas = report.orphaned_tas.len(),
            "对账完成"
        );
        report
    }

    /// 需求报表行（MST 附带周工时换算，仅展示）
    pub fn needs_row(&self, demand: &CourseDemand) -> NeedsReportRow {
        let hours = |need: Option<f64>| match demand.cycle {
            Cycle::Mst => need.map(|n| n * self.contract_hours),
            _ => None,
        };
        NeedsReportRow {
            cycle: demand.cycle,
            course: demand.key.label(),
            term: demand.term.clone(),
            class_count: demand.class_count,
            slot_count: demand.student_count,
            initial_need: demand.initial_need,
            final_need: demand.remaining_need,
            initial_hours: hours(demand.initial_need),
            final_hours: hours(demand.remaining_need),
            match_status: self.classify(demand),
        }
    }
}

/// 清洗后的偏好表（全部排名）
pub fn preference_rows(records: &[PreferenceRecord], demand: &DemandModel) -> Vec<PreferenceReportRow> {
    records
        .iter()
        .filter_map(|record| {
            demand.get(&record.course).map(|course| PreferenceReportRow {
                cycle: course.cycle,
                course: record.course.label(),
                ta: record.ta.clone(),
                cycle_preference: record.cycle_preference,
                rank: record.rank,
            })
        })
        .collect()
}

pub fn allocation_rows(allocations: &[Allocation]) -> Vec<AllocationReportRow> {
    allocations
        .iter()
        .map(|a| AllocationReportRow {
            cycle: a.cycle,
            course: a.course.label(),
            ta: a.ta.clone(),
            amount: a.amount,
        })
        .collect()
}
