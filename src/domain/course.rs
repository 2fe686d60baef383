// ==========================================
// 助教工作量分配系统 - 课程领域模型
// ==========================================
// 职责: 课程身份键、目录行、课程需求
// 红线: initial_need 计算后不可变; remaining_need ∈ [0, initial_need]
// ==========================================

use crate::domain::types::Cycle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 课程标签分隔符（目录与问卷共用）
pub const COURSE_LABEL_SEPARATOR: &str = " || ";

// ==========================================
// CourseKey - 课程身份键
// ==========================================
// 字段顺序即字典序比较顺序 (code, name, period, language)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CourseKey {
    pub code: String,
    pub name: String,
    pub period: String,
    pub language: String,
}

impl CourseKey {
    pub fn new(code: &str, name: &str, period: &str, language: &str) -> Self {
        Self {
            code: code.trim().to_string(),
            name: name.trim().to_string(),
            period: period.trim().to_string(),
            language: language.trim().to_string(),
        }
    }

    /// 解析 `CODE || NAME || PERIOD || LANGUAGE` 形式的课程标签
    ///
    /// 段数不为 4 时返回 None
    pub fn parse_label(label: &str) -> Option<Self> {
        let parts: Vec<&str> = label.split(COURSE_LABEL_SEPARATOR).collect();
        if parts.len() != 4 {
            return None;
        }
        if parts[0].trim().is_empty() {
            return None;
        }
        Some(Self::new(parts[0], parts[1], parts[2], parts[3]))
    }

    pub fn label(&self) -> String {
        [
            self.code.as_str(),
            self.name.as_str(),
            self.period.as_str(),
            self.language.as_str(),
        ]
        .join(COURSE_LABEL_SEPARATOR)
    }
}

impl fmt::Display for CourseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// CatalogRow - 课程目录行（班级粒度）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRow {
    pub code: String,
    pub name: String,
    pub term: String,
    pub language: String,
    pub cycle: Cycle,
    pub classes: u32,        // 班级数（班级粒度行为 1）
    pub slots: u32,          // 学生名额
    pub faculty_empty: bool, // 授课教师为空
    pub row_number: usize,
}

impl CatalogRow {
    pub fn key(&self) -> CourseKey {
        CourseKey::new(&self.code, &self.name, &self.term, &self.language)
    }
}

// ==========================================
// WeightRow - 本科课程人工权重
// ==========================================
// weight 已在导入时乘以 bsc_weight_scale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightRow {
    pub course: CourseKey,
    pub weight: Option<f64>,
    pub row_number: usize,
}

// ==========================================
// CourseDemand - 课程需求
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDemand {
    pub key: CourseKey,
    pub cycle: Cycle,
    pub term: String,
    pub class_count: u32,
    pub student_count: u32,

    // ===== 需求（占满额合同的比例）=====
    // None: 需求未定义（ME 或 BSC 缺权重），不参与分配
    pub initial_need: Option<f64>,
    pub remaining_need: Option<f64>,
}

impl CourseDemand {
    /// 是否参与自动分配
    pub fn is_allocatable(&self) -> bool {
        self.cycle != Cycle::Me && self.initial_need.is_some()
    }

    /// 已分配量 = initial - remaining
    pub fn allocated(&self) -> f64 {
        match (self.initial_need, self.remaining_need) {
            (Some(initial), Some(remaining)) => initial - remaining,
            _ => 0.0,
        }
    }
}

// ==========================================
// DemandModel - 需求模型
// ==========================================
// BTreeMap 保证按 CourseKey 字典序稳定遍历；序列化为课程列表（JSON 键只能是字符串）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<CourseDemand>", into = "Vec<CourseDemand>")]
pub struct DemandModel {
    courses: BTreeMap<CourseKey, CourseDemand>,
}

impl DemandModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, demand: CourseDemand) {
        self.courses.insert(demand.key.clone(), demand);
    }

    pub fn get(&self, key: &CourseKey) -> Option<&CourseDemand> {
        self.courses.get(key)
    }

    pub fn get_mut(&mut self, key: &CourseKey) -> Option<&mut CourseDemand> {
        self.courses.get_mut(key)
    }

    pub fn contains(&self, key: &CourseKey) -> bool {
        self.courses.contains_key(key)
    }

    /// 按 CourseKey 升序遍历
    pub fn iter(&self) -> impl Iterator<Item = &CourseDemand> {
        self.courses.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &CourseKey> {
        self.courses.keys()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

impl From<Vec<CourseDemand>> for DemandModel {
    fn from(courses: Vec<CourseDemand>) -> Self {
        let mut model = Self::new();
        for demand in courses {
            model.insert(demand);
        }
        model
    }
}

impl From<DemandModel> for Vec<CourseDemand> {
    fn from(model: DemandModel) -> Self {
        model.courses.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label() {
        let key = CourseKey::parse_label("1101 || Calculus I || S1 || EN").unwrap();
        assert_eq!(key.code, "1101");
        assert_eq!(key.name, "Calculus I");
        assert_eq!(key.period, "S1");
        assert_eq!(key.language, "EN");
        assert_eq!(key.label(), "1101 || Calculus I || S1 || EN");
    }

    #[test]
    fn test_parse_label_rejects_wrong_arity() {
        assert!(CourseKey::parse_label("1101 || Calculus I || S1").is_none());
        assert!(CourseKey::parse_label("Full Name").is_none());
        assert!(CourseKey::parse_label(" || a || b || c").is_none());
    }

    #[test]
    fn test_course_key_ordering_is_lexicographic() {
        let a = CourseKey::new("1101", "B", "S1", "EN");
        let b = CourseKey::new("1101", "A", "S1", "PT");
        let c = CourseKey::new("1001", "Z", "T1", "EN");
        let mut keys = vec![a.clone(), b.clone(), c.clone()];
        keys.sort();
        assert_eq!(keys, vec![c, b, a]);
    }

    #[test]
    fn test_demand_model_iterates_sorted() {
        let mut model = DemandModel::new();
        for code in ["2001", "1001", "1500"] {
            model.insert(CourseDemand {
                key: CourseKey::new(code, "X", "S1", "EN"),
                cycle: Cycle::infer_from_code(code),
                term: "S1".to_string(),
                class_count: 1,
                student_count: 10,
                initial_need: Some(0.1),
                remaining_need: Some(0.1),
            });
        }
        let codes: Vec<&str> = model.iter().map(|d| d.key.code.as_str()).collect();
        assert_eq!(codes, vec!["1001", "1500", "2001"]);
    }
}
