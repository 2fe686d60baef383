// ==========================================
// 助教工作量分配系统 - 助教花名册准备
// ==========================================
// 职责: 合同 + 问卷 → 花名册（含本学期容量）+ 有效答卷 + 花名册报告
// 流程:
//   1) 剔除零合同助教及其答卷
//   2) 同一助教多份答卷: 最近一份提供答案，排名取最近一份有排名的答卷
//   3) 同名答卷去重（保留最近）
//   4) 离任助教列出并移除其偏好
//   5) 合同变更: 减少 → 调整容量；增加 → 仅报告
// ==========================================

use crate::config::AllocationConfigReader;
use crate::domain::report::{ContactRow, ContractChangeRow, RosterReport, SurveyTaRow};
use crate::domain::ta::{ContractRow, SurveyResponse, TeachingAssistant};
use crate::domain::types::ContractChange;
use crate::engine::error::EngineResult;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// ==========================================
// RosterOutcome
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RosterOutcome {
    pub tas: BTreeMap<String, TeachingAssistant>,
    /// 有效答卷（最近完成者在前，同时间按助教 id）
    pub responses: Vec<SurveyResponse>,
    pub report: RosterReport,
}

impl RosterOutcome {
    pub fn ta(&self, id: &str) -> Option<&TeachingAssistant> {
        self.tas.get(id)
    }
}

pub struct RosterBuilder<C>
where
    C: AllocationConfigReader,
{
    config: Arc<C>,
}

impl<C> RosterBuilder<C>
where
    C: AllocationConfigReader,
{
    pub fn new(config: Arc<C>) -> Self {
        Self { config }
    }

    #[instrument(skip_all, fields(contracts = contracts.len(), responses = survey.len()))]
    pub fn build(&self, contracts: &[ContractRow], survey: Vec<SurveyResponse>) -> EngineResult<RosterOutcome> {
        let reduction_step = self.config.get_contract_reduction_step()?;
        let min_load = self.config.get_min_requested_load()?;
        let mut report = RosterReport::default();

        // 1. 零合同
        let zero_contract: HashSet<&str> = contracts
            .iter()
            .filter(|c| c.contract <= 0.0)
            .map(|c| c.ta.as_str())
            .collect();
        report.zero_contract_tas = contracts
            .iter()
            .filter(|c| zero_contract.contains(c.ta.as_str()))
            .map(|c| c.ta.clone())
            .collect();
        let active_contracts: BTreeMap<&str, f64> = contracts
            .iter()
            .filter(|c| !zero_contract.contains(c.ta.as_str()))
            .map(|c| (c.ta.as_str(), c.contract))
            .collect();

        let survey: Vec<SurveyResponse> = survey
            .into_iter()
            .filter(|r| !zero_contract.contains(r.ta.as_str()))
            .collect();

        // 2~3. 去重
        let responses = self.deduplicate(survey);

        // 4. 离任
        let (leaving, responses): (Vec<_>, Vec<_>) =
            responses.into_iter().partition(|r| !r.continues);
        report.leaving_tas = leaving.iter().map(survey_ta_row).collect();
        let leaving_ids: HashSet<&str> = leaving.iter().map(|r| r.ta.as_str()).collect();

        // 未知助教（答卷存在但无合同）
        report.unknown_tas = responses
            .iter()
            .filter(|r| !active_contracts.contains_key(r.ta.as_str()))
            .map(survey_ta_row)
            .collect();
        for row in &report.unknown_tas {
            warn!(ta = %row.ta, "问卷助教无合同，其偏好不参与分配");
        }

        // 5. 花名册 + 合同变更
        let by_ta: BTreeMap<&str, &SurveyResponse> =
            responses.iter().map(|r| (r.ta.as_str(), r)).collect();
        let mut tas = BTreeMap::new();
        for (&id, &contract) in &active_contracts {
            let response = by_ta.get(id).copied();
            let capacity = match response {
                Some(r) if r.contract_change == ContractChange::Reduce => {
                    reduced_capacity(contract, r.requested_load().map(|l| l.max(min_load)), reduction_step)
                }
                _ => contract,
            };
            tas.insert(
                id.to_string(),
                TeachingAssistant {
                    id: id.to_string(),
                    full_name: response.and_then(|r| r.full_name.clone()),
                    contract,
                    capacity: capacity.clamp(0.0, 1.0),
                    is_master_student: response.map_or(false, |r| r.master_student_with_courses),
                    left_program: leaving_ids.contains(id),
                    has_restriction: response.map_or(false, |r| r.has_restriction),
                },
            );
        }

        report.contract_changes = responses
            .iter()
            .filter(|r| r.contract_change != ContractChange::Keep)
            .map(|r| {
                let contract = active_contracts.get(r.ta.as_str()).copied();
                ContractChangeRow {
                    ta: r.ta.clone(),
                    master_student: r.master_student_with_courses,
                    has_restriction: r.has_restriction,
                    change: r.contract_change,
                    load_requested: r.requested_load().map(|l| l.max(min_load)),
                    contract,
                    new_capacity: tas.get(&r.ta).map(|ta| ta.capacity),
                }
            })
            .collect();

        // 需要联系: 有合同、无排名、未离任
        let ranked: BTreeSet<&str> = responses
            .iter()
            .filter(|r| r.has_rankings())
            .map(|r| r.ta.as_str())
            .collect();
        report.tas_to_contact = tas
            .values()
            .filter(|ta| !ta.left_program && !ranked.contains(ta.id.as_str()))
            .map(|ta| ContactRow {
                ta: ta.id.clone(),
                contract: ta.contract,
            })
            .collect();

        info!(
            tas = tas.len(),
            responses = responses.len(),
            zero_contract = report.zero_contract_tas.len(),
            leaving = report.leaving_tas.len(),
            unknown = report.unknown_tas.len(),
            contract_changes = report.contract_changes.len(),
            to_contact = report.tas_to_contact.len(),
            "花名册准备完成"
        );

        Ok(RosterOutcome {
            tas,
            responses,
            report,
        })
    }

    /// 答卷去重
    ///
    /// # 规则
    /// - 最近完成者在前（无完成时间视为最早；同时间行号大者在前）
    /// - 同一助教: 最近一份提供答案；若其无排名，排名取最近一份有排名的答卷
    /// - 同名（去首尾空白、忽略大小写）: 保留最近一份，即使助教 id 不同
    /// - 无姓名的答卷不参与同名去重
    /// - 输出按完成时间降序，同时间按助教 id 升序
    pub fn deduplicate(&self, mut survey: Vec<SurveyResponse>) -> Vec<SurveyResponse> {
        survey.sort_by(most_recent_first);

        let mut by_ta: Vec<SurveyResponse> = Vec::new();
        let mut index: BTreeMap<String, usize> = BTreeMap::new();
        for response in survey {
            match index.get(&response.ta).copied() {
                None => {
                    index.insert(response.ta.clone(), by_ta.len());
                    by_ta.push(response);
                }
                Some(i) => {
                    debug!(ta = %response.ta, row = response.row_number, "重复答卷");
                    let kept = &mut by_ta[i];
                    if !kept.has_rankings() && response.has_rankings() {
                        kept.rankings = response.rankings;
                    }
                }
            }
        }

        let mut seen_names = HashSet::new();
        let mut deduped: Vec<SurveyResponse> = by_ta
            .into_iter()
            .filter(|r| match &r.full_name {
                Some(name) => seen_names.insert(name.trim().to_lowercase()),
                None => true,
            })
            .collect();

        deduped.sort_by(|a, b| b.end_date.cmp(&a.end_date).then_with(|| a.ta.cmp(&b.ta)));
        deduped
    }
}

/// 减少合同后的容量
///
/// 指定了目标工作量 → 取目标；否则按默认降幅扣减（不低于 0）
pub fn reduced_capacity(contract: f64, requested_load: Option<f64>, reduction_step: f64) -> f64 {
    match requested_load {
        Some(load) => load,
        None => (contract - reduction_step).max(0.0),
    }
}

fn most_recent_first(a: &SurveyResponse, b: &SurveyResponse) -> Ordering {
    b.end_date
        .cmp(&a.end_date)
        .then_with(|| b.row_number.cmp(&a.row_number))
}

fn survey_ta_row(response: &SurveyResponse) -> SurveyTaRow {
    SurveyTaRow {
        ta: response.ta.clone(),
        full_name: response.full_name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use crate::domain::course::CourseKey;
    use crate::domain::ta::SurveyRanking;
    use crate::domain::types::CyclePreference;
    use chrono::NaiveDate;

    fn contract(ta: &str, value: f64) -> ContractRow {
        ContractRow {
            ta: ta.to_string(),
            contract: value,
            row_number: 2,
        }
    }

    fn response(ta: &str, day: u32, row_number: usize, ranked: bool) -> SurveyResponse {
        SurveyResponse {
            ta: ta.to_string(),
            full_name: Some(format!("Name {}", ta)),
            end_date: NaiveDate::from_ymd_opt(2024, 1, day).and_then(|d| d.and_hms_opt(9, 0, 0)),
            continues: true,
            master_student_with_courses: false,
            has_restriction: false,
            cycle_preference: CyclePreference::Indifferent,
            contract_change: ContractChange::Keep,
            decreased_load: None,
            increased_load: None,
            rankings: if ranked {
                vec![SurveyRanking {
                    course: CourseKey::new("1101", "Calculus", "S1", "EN"),
                    rank: 1,
                }]
            } else {
                vec![]
            },
            row_number,
        }
    }

    fn builder() -> RosterBuilder<ConfigManager> {
        RosterBuilder::new(Arc::new(ConfigManager::new()))
    }

    #[test]
    fn test_latest_answers_with_fallback_rankings() {
        let mut older = response("a@uni.pt", 1, 2, true);
        older.cycle_preference = CyclePreference::Bsc;
        let mut newer = response("a@uni.pt", 5, 3, false);
        newer.cycle_preference = CyclePreference::Mst;

        let deduped = builder().deduplicate(vec![older, newer]);

        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].cycle_preference, CyclePreference::Mst);
        assert_eq!(deduped[0].rankings.len(), 1);
    }

    #[test]
    fn test_same_name_across_ids_keeps_most_recent() {
        let mut old_email = response("ana.old@uni.pt", 1, 2, true);
        old_email.full_name = Some("Ana Silva".to_string());
        let mut new_email = response("ana@uni.pt", 4, 3, true);
        new_email.full_name = Some("  ana SILVA ".to_string());
        let mut nameless_a = response("x@uni.pt", 2, 4, true);
        nameless_a.full_name = None;
        let mut nameless_b = response("y@uni.pt", 3, 5, true);
        nameless_b.full_name = None;

        let deduped = builder().deduplicate(vec![old_email, nameless_a, new_email, nameless_b]);

        let ids: Vec<&str> = deduped.iter().map(|r| r.ta.as_str()).collect();
        assert_eq!(ids, vec!["ana@uni.pt", "y@uni.pt", "x@uni.pt"]);
    }

    #[test]
    fn test_zero_contract_and_leaving_and_unknown() {
        let mut leaving = response("b@uni.pt", 2, 3, true);
        leaving.continues = false;

        let outcome = builder()
            .build(
                &[contract("a@uni.pt", 0.0), contract("b@uni.pt", 0.5), contract("c@uni.pt", 0.5)],
                vec![
                    response("a@uni.pt", 1, 2, true),
                    leaving,
                    response("x@uni.pt", 3, 4, true),
                ],
            )
            .unwrap();

        assert_eq!(outcome.report.zero_contract_tas, vec!["a@uni.pt".to_string()]);
        assert!(!outcome.tas.contains_key("a@uni.pt"));
        assert_eq!(outcome.report.leaving_tas.len(), 1);
        assert!(outcome.ta("b@uni.pt").unwrap().left_program);
        assert_eq!(outcome.report.unknown_tas[0].ta, "x@uni.pt");
        assert_eq!(outcome.responses.len(), 1);
        // c 有合同但没有答卷；b 已离任
        assert_eq!(outcome.report.tas_to_contact.len(), 1);
        assert_eq!(outcome.report.tas_to_contact[0].ta, "c@uni.pt");
    }

    #[test]
    fn test_contract_reduction() {
        let mut with_load = response("a@uni.pt", 1, 2, true);
        with_load.contract_change = ContractChange::Reduce;
        with_load.decreased_load = Some(0.05);
        let mut without_load = response("b@uni.pt", 1, 3, true);
        without_load.contract_change = ContractChange::Reduce;
        let mut increase = response("c@uni.pt", 1, 4, true);
        increase.contract_change = ContractChange::Increase;
        increase.increased_load = Some(0.75);

        let outcome = builder()
            .build(
                &[contract("a@uni.pt", 0.5), contract("b@uni.pt", 0.5), contract("c@uni.pt", 0.5)],
                vec![with_load, without_load, increase],
            )
            .unwrap();

        // 申请量低于下限 0.1 时取下限
        assert!((outcome.ta("a@uni.pt").unwrap().capacity - 0.1).abs() < 1e-12);
        assert!((outcome.ta("b@uni.pt").unwrap().capacity - 0.375).abs() < 1e-12);
        assert_eq!(outcome.ta("c@uni.pt").unwrap().capacity, 0.5);
        assert_eq!(outcome.report.contract_changes.len(), 3);
    }
}
