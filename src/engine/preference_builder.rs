// ==========================================
// 助教工作量分配系统 - 偏好记录生成
// ==========================================
// 职责: 有效答卷 × 已解析课程 → PreferenceRecord（只读）
// 顺序: 问卷课程列顺序 → 答卷顺序（最近完成者在前）
// 红线: 同一助教对同一目录课程只保留一条（排名最小者）
// ==========================================

use crate::domain::course::CourseKey;
use crate::domain::preference::PreferenceRecord;
use crate::domain::ta::SurveyResponse;
use crate::engine::identity_resolver::ResolutionOutcome;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// 生成偏好记录
///
/// # 参数
/// - `course_order`: 问卷课程列顺序
/// - `responses`: 有效答卷（已排序）
/// - `resolution`: 课程身份解析结果
///
/// # 返回
/// 已解析课程上的偏好记录；未解析课程的偏好被丢弃
pub fn build_preferences(
    course_order: &[CourseKey],
    responses: &[SurveyResponse],
    resolution: &ResolutionOutcome,
) -> Vec<PreferenceRecord> {
    let mut records: Vec<PreferenceRecord> = Vec::new();
    let mut index: BTreeMap<(String, CourseKey), usize> = BTreeMap::new();
    let mut dropped = 0usize;

    for survey_course in course_order {
        for response in responses {
            let Some(ranking) = response
                .rankings
                .iter()
                .find(|ranking| &ranking.course == survey_course)
            else {
                continue;
            };

            let Some(catalog_course) = resolution.catalog_key(survey_course) else {
                dropped += 1;
                continue;
            };

            // 两个问卷课程解析到同一目录课程: 保留排名较小者
            let slot = (response.ta.clone(), catalog_course.clone());
            if let Some(&existing) = index.get(&slot) {
                if ranking.rank < records[existing].rank {
                    records[existing].rank = ranking.rank;
                    records[existing].survey_course = survey_course.clone();
                }
                continue;
            }

            index.insert(slot, records.len());
            records.push(PreferenceRecord {
                ta: response.ta.clone(),
                course: catalog_course.clone(),
                survey_course: survey_course.clone(),
                rank: ranking.rank,
                cycle_preference: response.cycle_preference,
                input_order: records.len(),
            });
        }
    }

    debug!(records = records.len(), dropped, "偏好记录生成完成");
    records
}

/// 孤立助教: 有偏好、但偏好全部指向未解析课程
pub fn orphaned_tas(responses: &[SurveyResponse], records: &[PreferenceRecord]) -> Vec<String> {
    let with_preferences: BTreeSet<&str> = responses
        .iter()
        .filter(|r| r.has_rankings())
        .map(|r| r.ta.as_str())
        .collect();
    let resolved: BTreeSet<&str> = records.iter().map(|r| r.ta.as_str()).collect();

    with_preferences
        .difference(&resolved)
        .map(|ta| ta.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::course::{CourseDemand, DemandModel};
    use crate::domain::ta::SurveyRanking;
    use crate::domain::types::{ContractChange, Cycle, CyclePreference};
    use crate::engine::identity_resolver::IdentityResolver;

    fn response(ta: &str, rankings: Vec<(CourseKey, u8)>) -> SurveyResponse {
        SurveyResponse {
            ta: ta.to_string(),
            full_name: None,
            end_date: None,
            continues: true,
            master_student_with_courses: false,
            has_restriction: false,
            cycle_preference: CyclePreference::Indifferent,
            contract_change: ContractChange::Keep,
            decreased_load: None,
            increased_load: None,
            rankings: rankings
                .into_iter()
                .map(|(course, rank)| SurveyRanking { course, rank })
                .collect(),
            row_number: 2,
        }
    }

    fn catalog(keys: &[CourseKey]) -> DemandModel {
        let mut model = DemandModel::new();
        for key in keys {
            model.insert(CourseDemand {
                key: key.clone(),
                cycle: Cycle::Bsc,
                term: key.period.clone(),
                class_count: 1,
                student_count: 10,
                initial_need: Some(0.2),
                remaining_need: Some(0.2),
            });
        }
        model
    }

    #[test]
    fn test_course_order_then_response_order() {
        let c1 = CourseKey::new("1101", "Calculus", "S1", "EN");
        let c2 = CourseKey::new("1102", "Algebra", "S1", "EN");
        let ghost = CourseKey::new("9999", "Ghost", "S1", "EN");
        let responses = vec![
            response("b@uni.pt", vec![(c1.clone(), 1), (c2.clone(), 2)]),
            response("a@uni.pt", vec![(c2.clone(), 1)]),
            response("z@uni.pt", vec![(ghost.clone(), 1)]),
        ];
        let order = vec![c1.clone(), c2.clone(), ghost.clone()];
        let resolution = IdentityResolver::new().resolve(&order, &catalog(&[c1.clone(), c2.clone()]));

        let records = build_preferences(&order, &responses, &resolution);

        let summary: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.ta.as_str(), r.course.code.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![("b@uni.pt", "1101"), ("b@uni.pt", "1102"), ("a@uni.pt", "1102")]
        );
        assert_eq!(orphaned_tas(&responses, &records), vec!["z@uni.pt".to_string()]);
    }

    #[test]
    fn test_two_survey_labels_for_one_course_keep_best_rank() {
        let catalog_key = CourseKey::new("1101", "Calculus", "S1", "EN");
        let renamed = CourseKey::new("1101", "Calculus I", "S1", "EN");
        let responses = vec![response(
            "a@uni.pt",
            vec![(catalog_key.clone(), 3), (renamed.clone(), 1)],
        )];
        let order = vec![catalog_key.clone(), renamed];
        let resolution = IdentityResolver::new().resolve(&order, &catalog(&[catalog_key]));

        let records = build_preferences(&order, &responses, &resolution);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].rank, 1);
    }
}
