// ==========================================
// 助教工作量分配系统 - 引擎编排器
// ==========================================
// 用途: 协调一次分配运行的各步骤
// 流程: 需求模型 → 花名册 → 身份解析 → 偏好记录 → 准入 → 排序 → 贪心分配 → 对账
// 红线: 单线程、同步；账本只有一个写者
// ==========================================

use crate::config::AllocationConfigReader;
use crate::domain::allocation::{Allocation, SkippedPreference};
use crate::domain::course::{CourseKey, DemandModel};
use crate::domain::preference::PreferenceRecord;
use crate::domain::quality::{DqSummary, DqViolation};
use crate::domain::report::{
    AllocationReportRow, NeedsReportRow, PreferenceReportRow, ReconciliationReport, RosterReport,
};
use crate::domain::ta::SurveyResponse;
use crate::domain::types::Cycle;
use crate::engine::assignment::AssignmentEngine;
use crate::engine::capacity_ledger::{CapacityLedger, TaBalance};
use crate::engine::demand_builder::DemandBuilder;
use crate::engine::eligibility::EligibilityFilter;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::identity_resolver::IdentityResolver;
use crate::engine::preference_builder::{build_preferences, orphaned_tas};
use crate::engine::priority::PrioritySorter;
use crate::engine::reconciliation::{allocation_rows, preference_rows, ReconciliationReporter};
use crate::engine::roster::RosterBuilder;
use crate::importer::{InputPaths, InputTables, TableLoader};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

// ==========================================
// AllocationRunResult - 一次运行的结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct AllocationRunResult {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub config_snapshot: serde_json::Value,

    // 分配输出
    pub allocations: Vec<Allocation>,
    pub skipped: Vec<SkippedPreference>,
    pub preferences: Vec<PreferenceRecord>,

    // 账本终态
    pub demand: DemandModel,
    pub ta_balances: Vec<TaBalance>,

    // 报告
    pub reconciliation: ReconciliationReport,
    pub roster: RosterReport,
    pub dq_violations: Vec<DqViolation>,
    pub dq_summary: DqSummary,
}

impl AllocationRunResult {
    /// 课程需求报表
    pub fn needs_rows(&self) -> &[NeedsReportRow] {
        &self.reconciliation.needs
    }

    /// 清洗后的偏好表
    pub fn preference_rows(&self) -> Vec<PreferenceReportRow> {
        preference_rows(&self.preferences, &self.demand)
    }

    /// 分配结果表
    pub fn allocation_rows(&self) -> Vec<AllocationReportRow> {
        allocation_rows(&self.allocations)
    }

    /// 某门课程获得的分配总量
    pub fn allocated_to(&self, course: &CourseKey) -> f64 {
        self.allocations
            .iter()
            .filter(|a| &a.course == course)
            .map(|a| a.amount)
            .sum()
    }

    pub fn ta_balance(&self, ta: &str) -> Option<&TaBalance> {
        self.ta_balances.iter().find(|b| b.ta == ta)
    }
}

// ==========================================
// AllocationOrchestrator - 引擎编排器
// ==========================================
pub struct AllocationOrchestrator<C>
where
    C: AllocationConfigReader,
{
    config: Arc<C>,
    demand_builder: DemandBuilder<C>,
    roster_builder: RosterBuilder<C>,
    resolver: IdentityResolver,
    sorter: PrioritySorter,
    engine: AssignmentEngine,
}

impl<C> AllocationOrchestrator<C>
where
    C: AllocationConfigReader,
{
    pub fn new(config: Arc<C>) -> Self {
        Self {
            demand_builder: DemandBuilder::new(config.clone()),
            roster_builder: RosterBuilder::new(config.clone()),
            resolver: IdentityResolver::new(),
            sorter: PrioritySorter::new(),
            engine: AssignmentEngine::new(),
            config,
        }
    }

    /// 从 CSV 文件执行一次完整运行
    pub fn run_files(&self, paths: &InputPaths) -> EngineResult<AllocationRunResult> {
        let tables = TableLoader::new(self.config.clone()).load_files(paths)?;
        self.run(tables)
    }

    /// 执行一次完整分配运行
    #[instrument(skip_all, fields(
        catalog = tables.catalog.len(),
        contracts = tables.contracts.len(),
        responses = tables.survey.len()
    ))]
    pub fn run(&self, tables: InputTables) -> EngineResult<AllocationRunResult> {
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let config_snapshot: serde_json::Value =
            serde_json::from_str(&self.config.get_config_snapshot()?)
                .map_err(|e| EngineError::InvalidInput(format!("配置快照格式错误: {}", e)))?;

        info!(run_id = %run_id, "开始执行分配运行");

        let InputTables {
            catalog,
            weights,
            contracts,
            survey,
            survey_courses,
            violations,
        } = tables;

        // ==========================================
        // 步骤1: 需求模型
        // ==========================================
        debug!("步骤1: 构建需求模型");
        let demand = self.demand_builder.build(&catalog, &weights)?;

        // ==========================================
        // 步骤2: 花名册
        // ==========================================
        debug!("步骤2: 准备助教花名册");
        let roster = self.roster_builder.build(&contracts, survey)?;

        // ==========================================
        // 步骤3: 课程身份解析
        // ==========================================
        debug!("步骤3: 解析问卷课程身份");
        let course_order = referenced_courses(&survey_courses, &roster.responses);
        let resolution = self.resolver.resolve(&course_order, &demand);

        info!(
            survey_courses = course_order.len(),
            resolved = resolution.resolved_count(),
            ambiguous = resolution.ambiguous.len(),
            unmatched = resolution.unmatched.len(),
            "课程身份解析完成"
        );

        // ==========================================
        // 步骤4: 偏好记录
        // ==========================================
        debug!("步骤4: 生成偏好记录");
        let preferences = build_preferences(&course_order, &roster.responses, &resolution);
        let orphaned = orphaned_tas(&roster.responses, &preferences);

        // ==========================================
        // 步骤5: 建账 + 准入
        // ==========================================
        debug!("步骤5: 建账并判定准入");
        let mut ledger = CapacityLedger::new(
            roster.tas.values().filter(|ta| !ta.left_program),
            demand,
        );
        let filter = EligibilityFilter::new(self.config.get_auto_allocate_rank()?);
        let eligibility = filter.partition(&preferences, &ledger, &roster.tas);

        // ==========================================
        // 步骤6: 排序 + 贪心分配（BSC 先于 MST）
        // ==========================================
        debug!("步骤6: 排序并执行贪心分配");
        let bsc_queue = self.sorter.sort(Cycle::Bsc, eligibility.bsc);
        let mst_queue = self.sorter.sort(Cycle::Mst, eligibility.mst);
        let assignment = self.engine.assign(&bsc_queue, &mst_queue, &mut ledger)?;

        // ==========================================
        // 步骤7: 对账
        // ==========================================
        debug!("步骤7: 生成对账报告");
        let (demand, ta_balances) = ledger.into_parts();
        let reporter = ReconciliationReporter::new(self.config.get_contract_hours()?);
        let reconciliation = reporter.reconcile(&demand, &resolution, orphaned);

        let mut skipped = eligibility.skipped;
        skipped.extend(assignment.skipped);

        let dq_summary = DqSummary::from_violations(&violations);

        info!(
            run_id = %run_id,
            allocations = assignment.allocations.len(),
            skipped = skipped.len(),
            "分配运行完成"
        );

        Ok(AllocationRunResult {
            run_id,
            started_at,
            config_snapshot,
            allocations: assignment.allocations,
            skipped,
            preferences,
            demand,
            ta_balances,
            reconciliation,
            roster: roster.report,
            dq_violations: violations,
            dq_summary,
        })
    }
}

/// 被至少一份有效答卷排名的问卷课程（问卷列顺序；缺列顺序时按首次出现）
fn referenced_courses(column_order: &[CourseKey], responses: &[SurveyResponse]) -> Vec<CourseKey> {
    let mut order: Vec<CourseKey> = column_order.to_vec();
    for response in responses {
        for ranking in &response.rankings {
            if !order.contains(&ranking.course) {
                order.push(ranking.course.clone());
            }
        }
    }

    order
        .into_iter()
        .filter(|course| {
            responses
                .iter()
                .any(|r| r.rankings.iter().any(|ranking| &ranking.course == course))
        })
        .collect()
}
