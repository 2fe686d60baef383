// ==========================================
// 助教工作量分配系统 - 分配配置读取 Trait
// ==========================================
// 职责: 定义引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::error::ConfigResult;
use crate::domain::types::Semester;

// ==========================================
// AllocationConfigReader Trait
// ==========================================
// 实现者: ConfigManager
pub trait AllocationConfigReader: Send + Sync {
    // ===== 需求换算 =====

    /// 满额合同的周工时
    ///
    /// # 默认值
    /// - 36
    fn get_contract_hours(&self) -> ConfigResult<f64>;

    /// 周数归一化因子
    ///
    /// # 默认值
    /// - 16
    fn get_weeks_per_term(&self) -> ConfigResult<f64>;

    /// MST 学期课每名学生工时
    ///
    /// # 默认值
    /// - 2.33
    fn get_mst_semester_factor(&self) -> ConfigResult<f64>;

    /// MST 季度课每名学生工时
    ///
    /// # 默认值
    /// - 1.25
    fn get_mst_trimester_factor(&self) -> ConfigResult<f64>;

    /// 学期课的开课周期前缀
    ///
    /// # 默认值
    /// - "S"
    fn get_semester_term_marker(&self) -> ConfigResult<String>;

    /// 本科人工权重缩放系数（导入时应用）
    ///
    /// # 默认值
    /// - 0.125
    fn get_bsc_weight_scale(&self) -> ConfigResult<f64>;

    // ===== 偏好 =====

    /// 有效排名上限（超出的排名在导入时丢弃）
    ///
    /// # 默认值
    /// - 5
    fn get_max_rank(&self) -> ConfigResult<u8>;

    /// 参与自动分配的排名
    ///
    /// # 默认值
    /// - 1
    fn get_auto_allocate_rank(&self) -> ConfigResult<u8>;

    // ===== 合同变更 =====

    /// 未指定目标比例时的默认降幅
    ///
    /// # 默认值
    /// - 0.125
    fn get_contract_reduction_step(&self) -> ConfigResult<f64>;

    /// 申请工作量下限
    ///
    /// # 默认值
    /// - 0.1
    fn get_min_requested_load(&self) -> ConfigResult<f64>;

    // ===== 学期过滤 =====

    /// 当前学期（None 表示不过滤）
    fn get_semester(&self) -> ConfigResult<Option<Semester>>;

    // ===== 快照 =====

    /// 有效配置快照（含默认值，JSON 格式，键有序）
    ///
    /// # 用途
    /// - 记录在每次分配运行结果中，保证结果可追溯
    fn get_config_snapshot(&self) -> ConfigResult<String>;
}
