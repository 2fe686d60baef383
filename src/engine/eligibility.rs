// ==========================================
// 助教工作量分配系统 - 自动分配准入
// ==========================================
// 职责: 判定偏好记录是否进入自动分配队列
// 红线: 不修改偏好记录；每条被拒记录必须给出原因
// ==========================================
// 准入条件（全部满足）:
//   1) rank == 自动分配排名
//   2) 助教在花名册中（有合同）
//   3) 课程学制为 BSC / MST，且需求已定义
//   4) 学制偏好接受课程学制
//   5) MST 课程: 助教不是仍在修课的硕士生
// ==========================================

use crate::domain::allocation::{SkipReason, SkippedPreference};
use crate::domain::course::CourseDemand;
use crate::domain::preference::PreferenceRecord;
use crate::domain::ta::TeachingAssistant;
use crate::domain::types::Cycle;
use crate::engine::capacity_ledger::CapacityLedger;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

// ==========================================
// EligibilityFilter
// ==========================================
pub struct EligibilityFilter {
    auto_allocate_rank: u8,
}

/// 准入结果
#[derive(Debug, Clone, Default)]
pub struct EligibilityOutcome {
    pub bsc: Vec<PreferenceRecord>,
    pub mst: Vec<PreferenceRecord>,
    pub skipped: Vec<SkippedPreference>,
}

impl EligibilityFilter {
    pub fn new(auto_allocate_rank: u8) -> Self {
        Self { auto_allocate_rank }
    }

    /// 判定单条记录
    ///
    /// # 返回
    /// - Ok(Cycle): 进入该学制的队列
    /// - Err(SkipReason): 被拒原因
    pub fn check(
        &self,
        record: &PreferenceRecord,
        course: Option<&CourseDemand>,
        ta: Option<&TeachingAssistant>,
    ) -> Result<Cycle, SkipReason> {
        if record.rank != self.auto_allocate_rank {
            return Err(SkipReason::RankNotAutoAllocated);
        }

        let ta = ta.ok_or(SkipReason::UnknownTa)?;
        // 偏好只会指向已解析课程；目录中缺失视同需求未定义
        let course = course.ok_or(SkipReason::NeedUndefined)?;

        if course.cycle == Cycle::Me {
            return Err(SkipReason::UnsupportedCycle);
        }
        if course.initial_need.is_none() {
            return Err(SkipReason::NeedUndefined);
        }
        if !record.cycle_preference.accepts(course.cycle) {
            return Err(SkipReason::CyclePreferenceMismatch);
        }
        if course.cycle == Cycle::Mst && ta.is_master_student {
            return Err(SkipReason::MasterStudentConflict);
        }

        Ok(course.cycle)
    }

    /// 将偏好记录划分为 BSC / MST 队列与被拒列表（保持输入顺序）
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn partition(
        &self,
        records: &[PreferenceRecord],
        ledger: &CapacityLedger,
        tas: &BTreeMap<String, TeachingAssistant>,
    ) -> EligibilityOutcome {
        let mut outcome = EligibilityOutcome::default();

        for record in records {
            // 账本中没有的助教（离任/未知）按未知处理
            let ta = tas.get(&record.ta).filter(|_| ledger.has_ta(&record.ta));
            match self.check(record, ledger.course(&record.course), ta) {
                Ok(Cycle::Bsc) => outcome.bsc.push(record.clone()),
                Ok(_) => outcome.mst.push(record.clone()),
                Err(reason) => outcome.skipped.push(SkippedPreference {
                    ta: record.ta.clone(),
                    course: record.course.clone(),
                    rank: record.rank,
                    reason,
                }),
            }
        }

        debug!(
            bsc = outcome.bsc.len(),
            mst = outcome.mst.len(),
            skipped = outcome.skipped.len(),
            "准入判定完成"
        );
        outcome
    }
}
