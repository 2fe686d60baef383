// ==========================================
// 助教工作量分配系统 - 偏好记录
// ==========================================
// 生命周期: 由规范化问卷生成一次，此后只读
// 约束: 同一助教对同一课程至多一条
// ==========================================

use crate::domain::course::CourseKey;
use crate::domain::types::CyclePreference;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    pub ta: String,
    pub course: CourseKey,        // 已解析的目录课程
    pub survey_course: CourseKey, // 问卷原始课程标签
    pub rank: u8,
    pub cycle_preference: CyclePreference,
    pub input_order: usize, // 生成顺序，稳定排序的最终依据
}
