// ==========================================
// 助教工作量分配系统 - 引擎层
// ==========================================
// 职责: 需求建模、身份解析、准入、排序、贪心分配、对账
// 红线: 引擎不做 I/O；所有未分配记录必须输出原因
// ==========================================

pub mod assignment;
pub mod capacity_ledger;
pub mod demand_builder;
pub mod eligibility;
pub mod error;
pub mod identity_resolver;
pub mod orchestrator;
pub mod preference_builder;
pub mod priority;
pub mod reconciliation;
pub mod roster;

// 重导出核心引擎
pub use assignment::{AssignmentEngine, AssignmentOutcome};
pub use capacity_ledger::{CapacityLedger, LedgerError, LedgerResult, TaBalance};
pub use demand_builder::DemandBuilder;
pub use eligibility::{EligibilityFilter, EligibilityOutcome};
pub use error::{EngineError, EngineResult};
pub use identity_resolver::{IdentityResolver, ResolutionOutcome};
pub use orchestrator::{AllocationOrchestrator, AllocationRunResult};
pub use preference_builder::{build_preferences, orphaned_tas};
pub use priority::PrioritySorter;
pub use reconciliation::ReconciliationReporter;
pub use roster::{RosterBuilder, RosterOutcome};
