// ==========================================
// 助教工作量分配系统 - 贪心分配引擎
// ==========================================
// 职责: 按排序后的队列逐条分配，成对扣减账本
// 红线: 单遍、不回溯；BSC 队列全部处理完才处理 MST 队列
// ==========================================
// 单步规则:
//   1) 课程剩余需求 <= 0 → 跳过 (COURSE_EXHAUSTED)
//   2) 助教剩余容量 <= 0 → 跳过 (TA_EXHAUSTED)
//   3) amount = min(need, capacity)，追加分配并提交账本
// 已耗尽的助教/课程不从队列移除，后续记录在检查时自然跳过
// ==========================================

use crate::domain::allocation::{Allocation, SkipReason, SkippedPreference};
use crate::domain::preference::PreferenceRecord;
use crate::domain::types::Cycle;
use crate::engine::capacity_ledger::{CapacityLedger, LedgerResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// 分配结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentOutcome {
    pub allocations: Vec<Allocation>,
    pub skipped: Vec<SkippedPreference>,
}

impl AssignmentOutcome {
    pub fn total_allocated(&self) -> f64 {
        self.allocations.iter().map(|a| a.amount).sum()
    }
}

pub struct AssignmentEngine {
    // 无状态引擎，账本由调用方持有
}

impl AssignmentEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// 依次处理 BSC 队列与 MST 队列
    ///
    /// # 参数
    /// - `bsc_queue` / `mst_queue`: 已排序的队列
    /// - `ledger`: 容量账本（会被修改）
    #[instrument(skip_all, fields(bsc = bsc_queue.len(), mst = mst_queue.len()))]
    pub fn assign(
        &self,
        bsc_queue: &[PreferenceRecord],
        mst_queue: &[PreferenceRecord],
        ledger: &mut CapacityLedger,
    ) -> LedgerResult<AssignmentOutcome> {
        let mut outcome = AssignmentOutcome::default();

        self.run_queue(Cycle::Bsc, bsc_queue, ledger, &mut outcome)?;
        self.run_queue(Cycle::Mst, mst_queue, ledger, &mut outcome)?;

        info!(
            allocations = outcome.allocations.len(),
            skipped = outcome.skipped.len(),
            total_allocated = outcome.total_allocated(),
            "贪心分配完成"
        );
        Ok(outcome)
    }

    /// 处理单个学制队列
    pub fn run_queue(
        &self,
        cycle: Cycle,
        queue: &[PreferenceRecord],
        ledger: &mut CapacityLedger,
        outcome: &mut AssignmentOutcome,
    ) -> LedgerResult<()> {
        for record in queue {
            let need = ledger.get_need(&record.course)?;
            if need <= 0.0 {
                outcome.skipped.push(skip(record, SkipReason::CourseExhausted));
                continue;
            }

            let capacity = ledger.get_capacity(&record.ta)?;
            if capacity <= 0.0 {
                outcome.skipped.push(skip(record, SkipReason::TaExhausted));
                continue;
            }

            let amount = need.min(capacity);
            ledger.commit(&record.ta, &record.course, amount)?;

            debug!(
                cycle = %cycle,
                ta = %record.ta,
                course = %record.course,
                amount,
                "分配"
            );
            outcome.allocations.push(Allocation {
                seq_no: outcome.allocations.len() + 1,
                ta: record.ta.clone(),
                course: record.course.clone(),
                cycle,
                amount,
            });
        }
        Ok(())
    }
}

impl Default for AssignmentEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn skip(record: &PreferenceRecord, reason: SkipReason) -> SkippedPreference {
    SkippedPreference {
        ta: record.ta.clone(),
        course: record.course.clone(),
        rank: record.rank,
        reason,
    }
}
