// ==========================================
// 助教工作量分配系统 - 课程身份解析器
// ==========================================
// 职责: 问卷课程标签 → 目录 CourseKey
// 流程: 完全匹配 → 放宽键级联（每步只处理上一步剩余的课程）
//   1) {code, period, language}  忽略课程名
//   2) {name, period, language}  忽略课程代码
//   3) {code, period}            忽略语言
// 红线: 多条目录课程命中时取字典序最小者，并记录歧义
// ==========================================

use crate::domain::course::{CourseKey, DemandModel};
use crate::domain::report::{AmbiguousMatch, CourseResolution};
use crate::domain::types::ResolutionStep;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

/// 放宽键的级联顺序
pub const CASCADE: [ResolutionStep; 3] = [
    ResolutionStep::CodePeriodLanguage,
    ResolutionStep::NamePeriodLanguage,
    ResolutionStep::CodePeriod,
];

// ==========================================
// ResolutionOutcome - 解析结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ResolutionOutcome {
    resolved: BTreeMap<CourseKey, CourseResolution>,
    pub ambiguous: Vec<AmbiguousMatch>,
    pub unmatched: Vec<CourseKey>, // 按输入顺序
}

impl ResolutionOutcome {
    /// 问卷课程对应的目录课程
    pub fn catalog_key(&self, survey_course: &CourseKey) -> Option<&CourseKey> {
        self.resolved.get(survey_course).map(|r| &r.catalog_course)
    }

    pub fn resolution(&self, survey_course: &CourseKey) -> Option<&CourseResolution> {
        self.resolved.get(survey_course)
    }

    /// 全部解析记录（按问卷课程升序）
    pub fn resolutions(&self) -> Vec<CourseResolution> {
        self.resolved.values().cloned().collect()
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }
}

// ==========================================
// IdentityResolver
// ==========================================
pub struct IdentityResolver {
    // 无状态引擎
}

impl IdentityResolver {
    pub fn new() -> Self {
        Self {}
    }

    /// 解析问卷课程
    ///
    /// # 参数
    /// - `survey_courses`: 问卷课程（重复项只处理一次）
    /// - `catalog`: 需求模型（包含全部目录课程）
    #[instrument(skip_all, fields(catalog_courses = catalog.len()))]
    pub fn resolve(&self, survey_courses: &[CourseKey], catalog: &DemandModel) -> ResolutionOutcome {
        let mut outcome = ResolutionOutcome::default();

        // 0. 完全匹配
        let mut remainder: Vec<CourseKey> = Vec::new();
        for course in survey_courses {
            if outcome.resolved.contains_key(course) || remainder.contains(course) {
                continue;
            }
            if catalog.contains(course) {
                outcome.resolved.insert(
                    course.clone(),
                    CourseResolution {
                        survey_course: course.clone(),
                        catalog_course: course.clone(),
                        step: ResolutionStep::Exact,
                    },
                );
            } else {
                remainder.push(course.clone());
            }
        }

        // 1~3. 级联（只处理剩余部分）
        for step in CASCADE {
            let mut next = Vec::new();
            for course in remainder {
                let candidates: Vec<&CourseKey> = catalog
                    .keys()
                    .filter(|candidate| relaxed_match(step, &course, candidate))
                    .collect();

                // DemandModel 按 CourseKey 升序遍历，首个即字典序最小
                let Some(chosen) = candidates.first().map(|c| (*c).clone()) else {
                    next.push(course);
                    continue;
                };

                if candidates.len() > 1 {
                    warn!(
                        survey_course = %course,
                        step = %step,
                        chosen = %chosen,
                        candidates = candidates.len(),
                        "放宽键命中多条目录课程，取字典序最小者"
                    );
                    outcome.ambiguous.push(AmbiguousMatch {
                        survey_course: course.clone(),
                        step,
                        chosen: chosen.clone(),
                        candidates: candidates.into_iter().cloned().collect(),
                    });
                }

                debug!(survey_course = %course, catalog_course = %chosen, step = %step, "课程身份已解析");
                outcome.resolved.insert(
                    course.clone(),
                    CourseResolution {
                        survey_course: course,
                        catalog_course: chosen,
                        step,
                    },
                );
            }
            remainder = next;
        }

        for course in &remainder {
            warn!(survey_course = %course, "问卷课程无法对应目录，相关偏好将被丢弃");
        }
        outcome.unmatched = remainder;
        outcome
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// 放宽键比较
fn relaxed_match(step: ResolutionStep, survey: &CourseKey, catalog: &CourseKey) -> bool {
    match step {
        ResolutionStep::Exact => survey == catalog,
        ResolutionStep::CodePeriodLanguage => {
            survey.code == catalog.code
                && survey.period == catalog.period
                && survey.language == catalog.language
        }
        ResolutionStep::NamePeriodLanguage => {
            survey.name == catalog.name
                && survey.period == catalog.period
                && survey.language == catalog.language
        }
        ResolutionStep::CodePeriod => {
            survey.code == catalog.code && survey.period == catalog.period
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::course::CourseDemand;
    use crate::domain::types::Cycle;

    fn model(keys: &[CourseKey]) -> DemandModel {
        let mut model = DemandModel::new();
        for key in keys {
            model.insert(CourseDemand {
                key: key.clone(),
                cycle: Cycle::Mst,
                term: key.period.clone(),
                class_count: 1,
                student_count: 10,
                initial_need: Some(0.1),
                remaining_need: Some(0.1),
            });
        }
        model
    }

    #[test]
    fn test_exact_match_first() {
        let key = CourseKey::new("2001", "Finance", "T1", "EN");
        let outcome = IdentityResolver::new().resolve(&[key.clone()], &model(&[key.clone()]));
        assert_eq!(outcome.resolution(&key).unwrap().step, ResolutionStep::Exact);
    }

    #[test]
    fn test_renamed_course_resolves_at_first_step() {
        let catalog_key = CourseKey::new("2001", "Corporate Finance", "T1", "EN");
        let survey_key = CourseKey::new("2001", "Finance", "T1", "EN");
        let outcome = IdentityResolver::new().resolve(&[survey_key.clone()], &model(&[catalog_key.clone()]));

        let resolution = outcome.resolution(&survey_key).unwrap();
        assert_eq!(resolution.step, ResolutionStep::CodePeriodLanguage);
        assert_eq!(resolution.catalog_course, catalog_key);
    }

    #[test]
    fn test_code_typo_resolves_at_second_step() {
        let catalog_key = CourseKey::new("2001", "Finance", "T1", "EN");
        let survey_key = CourseKey::new("2010", "Finance", "T1", "EN");
        let outcome = IdentityResolver::new().resolve(&[survey_key.clone()], &model(&[catalog_key]));
        assert_eq!(
            outcome.resolution(&survey_key).unwrap().step,
            ResolutionStep::NamePeriodLanguage
        );
    }

    #[test]
    fn test_language_drift_resolves_at_third_step() {
        let catalog_key = CourseKey::new("2001", "Finance", "T1", "EN");
        let survey_key = CourseKey::new("2001", "Financas", "T1", "PT");
        let name_only = CourseKey::new("2999", "Finance", "T1", "PT");
        let outcome = IdentityResolver::new()
            .resolve(&[survey_key.clone(), name_only.clone()], &model(&[catalog_key]));

        assert_eq!(outcome.resolution(&survey_key).unwrap().step, ResolutionStep::CodePeriod);
        assert_eq!(outcome.unmatched, vec![name_only]);
    }

    #[test]
    fn test_ambiguous_match_picks_smallest_key() {
        let a = CourseKey::new("2001", "Finance A", "T1", "EN");
        let b = CourseKey::new("2001", "Finance B", "T1", "EN");
        let survey_key = CourseKey::new("2001", "Finance", "T1", "EN");
        let outcome = IdentityResolver::new().resolve(&[survey_key.clone()], &model(&[b, a.clone()]));

        assert_eq!(outcome.catalog_key(&survey_key), Some(&a));
        assert_eq!(outcome.ambiguous.len(), 1);
        assert_eq!(outcome.ambiguous[0].candidates.len(), 2);
    }
}
