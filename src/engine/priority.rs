// ==========================================
// 助教工作量分配系统 - 队列内排序
// ==========================================
// 职责: 同一学制队列内的偏好记录排序
// 排序键:
//   1) 课程 CourseKey 升序
//   2) 学制偏好编码: BSC 队列升序，MST 队列降序（精确匹配优先于无所谓）
//   3) rank 升序
//   4) 生成顺序（稳定排序）
// ==========================================

use crate::domain::preference::PreferenceRecord;
use crate::domain::types::Cycle;
use std::cmp::Ordering;

pub struct PrioritySorter {
    // 无状态引擎
}

impl PrioritySorter {
    pub fn new() -> Self {
        Self {}
    }

    pub fn sort(&self, cycle: Cycle, mut records: Vec<PreferenceRecord>) -> Vec<PreferenceRecord> {
        records.sort_by(|a, b| self.compare(cycle, a, b));
        records
    }

    pub fn compare(&self, cycle: Cycle, a: &PreferenceRecord, b: &PreferenceRecord) -> Ordering {
        let preference = match cycle {
            Cycle::Mst => b.cycle_preference.code().cmp(&a.cycle_preference.code()),
            _ => a.cycle_preference.code().cmp(&b.cycle_preference.code()),
        };

        a.course
            .cmp(&b.course)
            .then(preference)
            .then_with(|| a.rank.cmp(&b.rank))
            .then_with(|| a.input_order.cmp(&b.input_order))
    }
}

impl Default for PrioritySorter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::course::CourseKey;
    use crate::domain::types::CyclePreference;

    fn record(ta: &str, code: &str, pref: CyclePreference, input_order: usize) -> PreferenceRecord {
        let course = CourseKey::new(code, "Course", "S1", "EN");
        PreferenceRecord {
            ta: ta.to_string(),
            course: course.clone(),
            survey_course: course,
            rank: 1,
            cycle_preference: pref,
            input_order,
        }
    }

    fn tas(records: &[PreferenceRecord]) -> Vec<&str> {
        records.iter().map(|r| r.ta.as_str()).collect()
    }

    #[test]
    fn test_bsc_exact_match_before_indifferent() {
        let sorted = PrioritySorter::new().sort(
            Cycle::Bsc,
            vec![
                record("indifferent", "1101", CyclePreference::Indifferent, 0),
                record("bsc", "1101", CyclePreference::Bsc, 1),
                record("other-course", "1100", CyclePreference::Indifferent, 2),
            ],
        );
        assert_eq!(tas(&sorted), vec!["other-course", "bsc", "indifferent"]);
    }

    #[test]
    fn test_mst_exact_match_before_indifferent() {
        let sorted = PrioritySorter::new().sort(
            Cycle::Mst,
            vec![
                record("indifferent", "2001", CyclePreference::Indifferent, 0),
                record("mst", "2001", CyclePreference::Mst, 1),
            ],
        );
        assert_eq!(tas(&sorted), vec!["mst", "indifferent"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let sorted = PrioritySorter::new().sort(
            Cycle::Bsc,
            vec![
                record("second", "1101", CyclePreference::Bsc, 5),
                record("first", "1101", CyclePreference::Bsc, 2),
            ],
        );
        assert_eq!(tas(&sorted), vec!["first", "second"]);
    }
}
