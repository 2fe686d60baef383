// ==========================================
// 助教工作量分配系统 - 容量账本
// ==========================================
// 职责: 持有助教剩余容量 + 课程剩余需求，成对扣减
// 红线: 单写者；只进不退（无回滚）；任何余额不得为负
// ==========================================

use crate::domain::course::{CourseDemand, CourseKey, DemandModel};
use crate::domain::ta::TeachingAssistant;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("账本中不存在助教: {0}")]
    UnknownTa(String),

    #[error("账本中不存在课程: {0}")]
    UnknownCourse(String),

    #[error("课程需求未定义: {0}")]
    NeedUndefined(String),

    #[error("分配量非法 (助教 {ta}, 课程 {course}): {amount}")]
    InvalidAmount {
        ta: String,
        course: String,
        amount: f64,
    },

    #[error("分配量超出余额 (助教 {ta}, 课程 {course}): 分配 {amount}, 容量 {capacity}, 需求 {need}")]
    Overdraw {
        ta: String,
        course: String,
        amount: f64,
        capacity: f64,
        need: f64,
    },
}

pub type LedgerResult<T> = Result<T, LedgerError>;

// ==========================================
// TaBalance - 助教余额
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaBalance {
    pub ta: String,
    pub initial_capacity: f64,
    pub remaining_capacity: f64,
}

impl TaBalance {
    pub fn allocated(&self) -> f64 {
        self.initial_capacity - self.remaining_capacity
    }
}

// ==========================================
// CapacityLedger
// ==========================================
#[derive(Debug, Clone)]
pub struct CapacityLedger {
    tas: BTreeMap<String, TaBalance>,
    demand: DemandModel,
}

impl CapacityLedger {
    /// 建账：助教容量取自花名册，课程剩余需求取自需求模型
    pub fn new<'a>(tas: impl IntoIterator<Item = &'a TeachingAssistant>, demand: DemandModel) -> Self {
        let tas = tas
            .into_iter()
            .map(|ta| {
                let capacity = ta.capacity.max(0.0);
                (
                    ta.id.clone(),
                    TaBalance {
                        ta: ta.id.clone(),
                        initial_capacity: capacity,
                        remaining_capacity: capacity,
                    },
                )
            })
            .collect();
        Self { tas, demand }
    }

    pub fn get_capacity(&self, ta: &str) -> LedgerResult<f64> {
        self.tas
            .get(ta)
            .map(|balance| balance.remaining_capacity)
            .ok_or_else(|| LedgerError::UnknownTa(ta.to_string()))
    }

    pub fn get_need(&self, course: &CourseKey) -> LedgerResult<f64> {
        let demand = self
            .demand
            .get(course)
            .ok_or_else(|| LedgerError::UnknownCourse(course.label()))?;
        demand
            .remaining_need
            .ok_or_else(|| LedgerError::NeedUndefined(course.label()))
    }

    pub fn has_ta(&self, ta: &str) -> bool {
        self.tas.contains_key(ta)
    }

    pub fn course(&self, course: &CourseKey) -> Option<&CourseDemand> {
        self.demand.get(course)
    }

    /// 成对扣减（一次逻辑操作）
    ///
    /// # 规则
    /// - amount 必须为正且有限
    /// - amount 不得超过任一方余额
    /// - 被耗尽的一方精确置 0.0（后续耗尽判定为精确比较）
    pub fn commit(&mut self, ta: &str, course: &CourseKey, amount: f64) -> LedgerResult<()> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(LedgerError::InvalidAmount {
                ta: ta.to_string(),
                course: course.label(),
                amount,
            });
        }

        let capacity = self.get_capacity(ta)?;
        let need = self.get_need(course)?;
        if amount > capacity || amount > need {
            return Err(LedgerError::Overdraw {
                ta: ta.to_string(),
                course: course.label(),
                amount,
                capacity,
                need,
            });
        }

        // 两侧余额均已校验，以下写入不会失败
        if let Some(balance) = self.tas.get_mut(ta) {
            balance.remaining_capacity = if amount >= capacity { 0.0 } else { capacity - amount };
        }
        if let Some(demand) = self.demand.get_mut(course) {
            demand.remaining_need = Some(if amount >= need { 0.0 } else { need - amount });
        }

        Ok(())
    }

    pub fn demand(&self) -> &DemandModel {
        &self.demand
    }

    /// 助教余额（按助教 id 升序）
    pub fn ta_balances(&self) -> Vec<TaBalance> {
        self.tas.values().cloned().collect()
    }

    pub fn into_parts(self) -> (DemandModel, Vec<TaBalance>) {
        let balances = self.tas.into_values().collect();
        (self.demand, balances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Cycle;

    fn ta(id: &str, capacity: f64) -> TeachingAssistant {
        TeachingAssistant {
            id: id.to_string(),
            full_name: None,
            contract: capacity,
            capacity,
            is_master_student: false,
            left_program: false,
            has_restriction: false,
        }
    }

    fn demand(code: &str, need: Option<f64>) -> CourseDemand {
        CourseDemand {
            key: CourseKey::new(code, "Course", "S1", "EN"),
            cycle: Cycle::Bsc,
            term: "S1".to_string(),
            class_count: 1,
            student_count: 10,
            initial_need: need,
            remaining_need: need,
        }
    }

    fn ledger() -> CapacityLedger {
        let mut model = DemandModel::new();
        model.insert(demand("1101", Some(0.3)));
        model.insert(demand("1102", None));
        CapacityLedger::new(&[ta("t1", 0.5)], model)
    }

    #[test]
    fn test_commit_paired_decrement() {
        let mut ledger = ledger();
        let c1 = CourseKey::new("1101", "Course", "S1", "EN");

        ledger.commit("t1", &c1, 0.3).unwrap();

        assert!((ledger.get_capacity("t1").unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(ledger.get_need(&c1).unwrap(), 0.0);
    }

    #[test]
    fn test_commit_rejects_overdraw_and_invalid_amount() {
        let mut ledger = ledger();
        let c1 = CourseKey::new("1101", "Course", "S1", "EN");

        assert!(matches!(
            ledger.commit("t1", &c1, 0.4),
            Err(LedgerError::Overdraw { .. })
        ));
        assert!(matches!(
            ledger.commit("t1", &c1, 0.0),
            Err(LedgerError::InvalidAmount { .. })
        ));
        assert!(matches!(
            ledger.commit("ghost", &c1, 0.1),
            Err(LedgerError::UnknownTa(_))
        ));
        // 失败的提交不改变余额
        assert_eq!(ledger.get_capacity("t1").unwrap(), 0.5);
        assert_eq!(ledger.get_need(&c1).unwrap(), 0.3);
    }

    #[test]
    fn test_undefined_need() {
        let ledger = ledger();
        let c2 = CourseKey::new("1102", "Course", "S1", "EN");
        assert!(matches!(ledger.get_need(&c2), Err(LedgerError::NeedUndefined(_))));
    }
}
