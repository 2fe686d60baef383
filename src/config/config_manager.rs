// ==========================================
// 助教工作量分配系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、快照
// 存储: 内存 key-value（可由 JSON 文件加载）
// ==========================================

use crate::config::allocation_config_trait::AllocationConfigReader;
use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::types::Semester;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "TA_ALLOCATION_CONFIG";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: BTreeMap<String, String>,
}

impl ConfigManager {
    /// 创建空配置（全部使用默认值）
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 对象字符串加载
    ///
    /// 值可以是字符串、数字或布尔；null 视为未设置
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let parsed: Value = serde_json::from_str(raw)?;
        let object = parsed
            .as_object()
            .ok_or_else(|| ConfigError::ParseError("配置文件顶层必须是 JSON 对象".to_string()))?;

        let mut values = BTreeMap::new();
        for (key, value) in object {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => continue,
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: key.clone(),
                        value: other.to_string(),
                        message: "仅支持字符串/数字/布尔".to_string(),
                    })
                }
            };
            values.insert(key.clone(), text);
        }

        Ok(Self { values })
    }

    /// 从 JSON 文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&raw)
    }

    /// 默认配置文件路径
    ///
    /// 优先 `TA_ALLOCATION_CONFIG`，否则 `<config_dir>/ta-allocation/config.json`
    pub fn default_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        dirs::config_dir().map(|dir| dir.join("ta-allocation").join("config.json"))
    }

    /// 加载默认位置的配置文件；文件不存在时使用默认值
    pub fn load_default() -> ConfigResult<Self> {
        match Self::default_config_path() {
            Some(path) if path.exists() => {
                tracing::info!(path = %path.display(), "加载配置文件");
                Self::from_file(path)
            }
            _ => {
                tracing::info!("未找到配置文件，使用默认配置");
                Ok(Self::new())
            }
        }
    }

    /// 覆写单个配置项
    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.trim().to_string());
    }

    /// 读取配置值
    fn get_config_value(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.as_str())
            .filter(|v| !v.trim().is_empty())
    }

    /// 读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> String {
        self.get_config_value(key).unwrap_or(default).trim().to_string()
    }

    /// 读取正数配置（不可解析或非正数视为配置错误）
    fn get_positive_f64(&self, key: &str, default: &str) -> ConfigResult<f64> {
        let value = self.get_config_or_default(key, default);
        let parsed = value.parse::<f64>().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.clone(),
            message: "无法解析为浮点数".to_string(),
        })?;
        if !parsed.is_finite() || parsed <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value,
                message: "必须为正数".to_string(),
            });
        }
        Ok(parsed)
    }

    /// 读取排名类配置（1..=255）
    fn get_rank(&self, key: &str, default: &str) -> ConfigResult<u8> {
        let value = self.get_config_or_default(key, default);
        match value.parse::<u8>() {
            Ok(rank) if rank >= 1 => Ok(rank),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value,
                message: "排名必须为 1~255 的整数".to_string(),
            }),
        }
    }
}

// ==========================================
// AllocationConfigReader Trait 实现
// ==========================================
impl AllocationConfigReader for ConfigManager {
    fn get_contract_hours(&self) -> ConfigResult<f64> {
        self.get_positive_f64(config_keys::CONTRACT_HOURS, "36")
    }

    fn get_weeks_per_term(&self) -> ConfigResult<f64> {
        self.get_positive_f64(config_keys::WEEKS_PER_TERM, "16")
    }

    fn get_mst_semester_factor(&self) -> ConfigResult<f64> {
        self.get_positive_f64(config_keys::MST_SEMESTER_FACTOR, "2.33")
    }

    fn get_mst_trimester_factor(&self) -> ConfigResult<f64> {
        self.get_positive_f64(config_keys::MST_TRIMESTER_FACTOR, "1.25")
    }

    fn get_semester_term_marker(&self) -> ConfigResult<String> {
        Ok(self.get_config_or_default(config_keys::SEMESTER_TERM_MARKER, "S"))
    }

    fn get_bsc_weight_scale(&self) -> ConfigResult<f64> {
        self.get_positive_f64(config_keys::BSC_WEIGHT_SCALE, "0.125")
    }

    fn get_max_rank(&self) -> ConfigResult<u8> {
        self.get_rank(config_keys::MAX_RANK, "5")
    }

    fn get_auto_allocate_rank(&self) -> ConfigResult<u8> {
        self.get_rank(config_keys::AUTO_ALLOCATE_RANK, "1")
    }

    fn get_contract_reduction_step(&self) -> ConfigResult<f64> {
        self.get_positive_f64(config_keys::CONTRACT_REDUCTION_STEP, "0.125")
    }

    fn get_min_requested_load(&self) -> ConfigResult<f64> {
        self.get_positive_f64(config_keys::MIN_REQUESTED_LOAD, "0.1")
    }

    fn get_config_snapshot(&self) -> ConfigResult<String> {
        let mut snapshot: BTreeMap<String, String> = config_keys::DEFAULTS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        for (key, value) in &self.values {
            snapshot.insert(key.clone(), value.clone());
        }
        Ok(serde_json::to_string(&snapshot)?)
    }

    fn get_semester(&self) -> ConfigResult<Option<Semester>> {
        match self.get_config_value(config_keys::SEMESTER) {
            None => Ok(None),
            Some(value) => Semester::parse(value).map(Some).ok_or_else(|| {
                ConfigError::InvalidValue {
                    key: config_keys::SEMESTER.to_string(),
                    value: value.to_string(),
                    message: "仅支持 S1 / S2".to_string(),
                }
            }),
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 需求换算
    pub const CONTRACT_HOURS: &str = "contract_hours";
    pub const WEEKS_PER_TERM: &str = "weeks_per_term";
    pub const MST_SEMESTER_FACTOR: &str = "mst_semester_factor";
    pub const MST_TRIMESTER_FACTOR: &str = "mst_trimester_factor";
    pub const SEMESTER_TERM_MARKER: &str = "semester_term_marker";
    pub const BSC_WEIGHT_SCALE: &str = "bsc_weight_scale";

    // 偏好
    pub const MAX_RANK: &str = "max_rank";
    pub const AUTO_ALLOCATE_RANK: &str = "auto_allocate_rank";

    // 合同变更
    pub const CONTRACT_REDUCTION_STEP: &str = "contract_reduction_step";
    pub const MIN_REQUESTED_LOAD: &str = "min_requested_load";

    // 学期过滤
    pub const SEMESTER: &str = "semester";

    /// 默认值（快照用；semester 默认不设置）
    pub const DEFAULTS: &[(&str, &str)] = &[
        (CONTRACT_HOURS, "36"),
        (WEEKS_PER_TERM, "16"),
        (MST_SEMESTER_FACTOR, "2.33"),
        (MST_TRIMESTER_FACTOR, "1.25"),
        (SEMESTER_TERM_MARKER, "S"),
        (BSC_WEIGHT_SCALE, "0.125"),
        (MAX_RANK, "5"),
        (AUTO_ALLOCATE_RANK, "1"),
        (CONTRACT_REDUCTION_STEP, "0.125"),
        (MIN_REQUESTED_LOAD, "0.1"),
    ];
}
