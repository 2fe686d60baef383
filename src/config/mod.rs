// ==========================================
// 助教工作量分配系统 - 配置层
// ==========================================
// 职责: 系统配置管理（默认值 + JSON 文件覆写）
// ==========================================

pub mod allocation_config_trait;
pub mod config_manager;
pub mod error;

// 重导出核心配置管理器
pub use allocation_config_trait::AllocationConfigReader;
pub use config_manager::{config_keys, ConfigManager, CONFIG_PATH_ENV};
pub use error::{ConfigError, ConfigResult};
