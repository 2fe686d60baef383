// ==========================================
// 助教工作量分配系统 - 核心库
// ==========================================
// 系统定位: 课程身份对齐 + 容量约束下的偏好贪心分配
// 运行模型: 单线程、同步、一次处理一个学期
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 导出层 - 报表写出
pub mod export;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ContractChange, Cycle, CyclePreference, MatchStatus, ResolutionStep, Semester};

// 领域实体
pub use domain::{
    Allocation, CourseDemand, CourseKey, DemandModel, PreferenceRecord, ReconciliationReport,
    SkipReason, SkippedPreference, TeachingAssistant,
};

// 引擎
pub use engine::{
    AllocationOrchestrator, AllocationRunResult, AssignmentEngine, CapacityLedger, DemandBuilder,
    EligibilityFilter, EngineError, IdentityResolver, PrioritySorter, ReconciliationReporter,
    RosterBuilder,
};

// 配置 / 导入 / 导出
pub use config::{AllocationConfigReader, ConfigManager};
pub use export::ReportWriter;
pub use importer::{InputPaths, InputTables, TableLoader};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "助教工作量分配系统";
