// ==========================================
// 助教工作量分配系统 - 需求模型构建器
// ==========================================
// 职责: 课程目录（班级粒度）→ 每门课程的需求（占满额合同的比例）
// 输入: 目录行 + 本科人工权重（已缩放）
// 输出: DemandModel（remaining_need = initial_need）
// ==========================================
// MST: students × factor / weeks / hours，factor 按学期课/季度课区分
// BSC: class_count × weight；缺权重 → 需求未定义
// ME : 需求未定义
// ==========================================

use crate::config::AllocationConfigReader;
use crate::domain::course::{CatalogRow, CourseDemand, CourseKey, DemandModel, WeightRow};
use crate::domain::types::Cycle;
use crate::engine::error::EngineResult;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub struct DemandBuilder<C>
where
    C: AllocationConfigReader,
{
    config: Arc<C>,
}

/// 需求换算参数（一次运行内不变）
#[derive(Debug, Clone)]
struct NeedParams {
    contract_hours: f64,
    weeks_per_term: f64,
    semester_factor: f64,
    trimester_factor: f64,
    semester_marker: String,
}

impl<C> DemandBuilder<C>
where
    C: AllocationConfigReader,
{
    pub fn new(config: Arc<C>) -> Self {
        Self { config }
    }

    /// 构建需求模型
    ///
    /// # 规则
    /// - 同一 CourseKey 的目录行聚合: 班级数求和，学生名额求和
    /// - 学制取该课程首行
    /// - 配置了学期时，仅保留该学期的开课周期
    #[instrument(skip_all, fields(catalog_rows = catalog.len(), weight_rows = weights.len()))]
    pub fn build(&self, catalog: &[CatalogRow], weights: &[WeightRow]) -> EngineResult<DemandModel> {
        let params = self.params()?;
        let semester = self.config.get_semester()?;

        // 1. 按课程聚合
        let mut aggregated: BTreeMap<CourseKey, CourseDemand> = BTreeMap::new();
        for row in catalog {
            if let Some(semester) = semester {
                if !semester.terms().contains(&row.term.as_str()) {
                    continue;
                }
            }

            let entry = aggregated.entry(row.key()).or_insert_with(|| CourseDemand {
                key: row.key(),
                cycle: row.cycle,
                term: row.term.clone(),
                class_count: 0,
                student_count: 0,
                initial_need: None,
                remaining_need: None,
            });
            if entry.cycle != row.cycle {
                warn!(course = %entry.key, first = %entry.cycle, other = %row.cycle, "同一课程学制不一致，取首行");
            }
            entry.class_count = entry.class_count.saturating_add(row.classes);
            entry.student_count = entry.student_count.saturating_add(row.slots);
        }

        // 2. 权重表（同一课程后行覆盖前行）
        let weight_by_course: BTreeMap<&CourseKey, Option<f64>> =
            weights.iter().map(|w| (&w.course, w.weight)).collect();

        // 3. 计算需求
        let mut model = DemandModel::new();
        for (key, mut demand) in aggregated {
            let weight = weight_by_course.get(&key).copied().flatten();
            let need = self.compute_need(&params, &demand, weight);
            if need.is_none() && demand.cycle == Cycle::Bsc {
                warn!(course = %key, "本科课程缺少人工权重，需求未定义");
            }
            demand.initial_need = need;
            demand.remaining_need = need;
            model.insert(demand);
        }

        debug!(courses = model.len(), "需求模型构建完成");
        Ok(model)
    }

    /// 硕士课程需求（占满额合同的比例）
    pub fn mst_need(&self, student_count: u32, term: &str) -> EngineResult<f64> {
        let params = self.params()?;
        Ok(mst_need(&params, student_count, term))
    }

    fn compute_need(&self, params: &NeedParams, demand: &CourseDemand, weight: Option<f64>) -> Option<f64> {
        match demand.cycle {
            Cycle::Mst => Some(mst_need(params, demand.student_count, &demand.term)),
            Cycle::Bsc => match weight {
                Some(w) if w.is_finite() && w >= 0.0 => Some(f64::from(demand.class_count) * w),
                Some(w) => {
                    warn!(course = %demand.key, weight = w, "本科权重非法，视为缺失");
                    None
                }
                None => None,
            },
            Cycle::Me => None,
        }
    }

    fn params(&self) -> EngineResult<NeedParams> {
        Ok(NeedParams {
            contract_hours: self.config.get_contract_hours()?,
            weeks_per_term: self.config.get_weeks_per_term()?,
            semester_factor: self.config.get_mst_semester_factor()?,
            trimester_factor: self.config.get_mst_trimester_factor()?,
            semester_marker: self.config.get_semester_term_marker()?,
        })
    }
}

fn mst_need(params: &NeedParams, student_count: u32, term: &str) -> f64 {
    let factor = if term.trim().starts_with(params.semester_marker.as_str()) {
        params.semester_factor
    } else {
        params.trimester_factor
    };
    f64::from(student_count) * factor / params.weeks_per_term / params.contract_hours
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{config_keys, ConfigManager};

    fn row(code: &str, term: &str, cycle: Cycle, slots: u32) -> CatalogRow {
        CatalogRow {
            code: code.to_string(),
            name: format!("Course {}", code),
            term: term.to_string(),
            language: "EN".to_string(),
            cycle,
            classes: 1,
            slots,
            faculty_empty: false,
            row_number: 2,
        }
    }

    fn builder() -> DemandBuilder<ConfigManager> {
        DemandBuilder::new(Arc::new(ConfigManager::new()))
    }

    #[test]
    fn test_mst_semester_and_trimester() {
        let b = builder();
        let semester = b.mst_need(100, "S1").unwrap();
        let trimester = b.mst_need(100, "T1").unwrap();
        assert!((semester - 100.0 * 2.33 / 16.0 / 36.0).abs() < 1e-12);
        assert!((trimester - 100.0 * 1.25 / 16.0 / 36.0).abs() < 1e-12);
    }

    #[test]
    fn test_bsc_aggregates_classes_and_applies_weight() {
        let catalog = vec![
            row("1101", "S1", Cycle::Bsc, 40),
            row("1101", "S1", Cycle::Bsc, 35),
            row("1101", "S1", Cycle::Bsc, 30),
        ];
        let weights = vec![WeightRow {
            course: catalog[0].key(),
            weight: Some(0.25),
            row_number: 2,
        }];

        let model = builder().build(&catalog, &weights).unwrap();
        let demand = model.get(&catalog[0].key()).unwrap();

        assert_eq!(demand.class_count, 3);
        assert_eq!(demand.student_count, 105);
        assert!((demand.initial_need.unwrap() - 0.75).abs() < 1e-12);
        assert_eq!(demand.initial_need, demand.remaining_need);
    }

    #[test]
    fn test_undefined_needs() {
        let catalog = vec![row("1102", "S1", Cycle::Bsc, 40), row("3001", "T2", Cycle::Me, 20)];
        let model = builder().build(&catalog, &[]).unwrap();

        for demand in model.iter() {
            assert_eq!(demand.initial_need, None);
            assert!(!demand.is_allocatable());
        }
    }

    #[test]
    fn test_semester_filter() {
        let mut config = ConfigManager::new();
        config.set(config_keys::SEMESTER, "S2");
        let b = DemandBuilder::new(Arc::new(config));

        let catalog = vec![
            row("2001", "S1", Cycle::Mst, 10),
            row("2002", "T3", Cycle::Mst, 10),
            row("2003", "S2", Cycle::Mst, 10),
        ];
        let model = b.build(&catalog, &[]).unwrap();

        assert_eq!(model.len(), 2);
        assert!(!model.contains(&catalog[0].key()));
    }
}
