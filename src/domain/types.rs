// ==========================================
// 助教工作量分配系统 - 领域类型定义
// ==========================================
// 职责: 学制、学制偏好、匹配状态、身份解析步骤等枚举
// 红线: 学制偏好的编码在 BSC / MST 两个队列中方向相反
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 学制 (Cycle)
// ==========================================
// BSC: 本科 / MST: 硕士 / ME: 不支持(高管教育等)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cycle {
    Bsc,
    Mst,
    Me,
}

impl Cycle {
    /// 解析学制文本（空值返回 None，由调用方决定是否按课程代码推断）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "BSC" | "BS" | "BACHELOR" => Some(Cycle::Bsc),
            "MST" | "MS" | "MASTER" => Some(Cycle::Mst),
            "ME" | "EXECUTIVE" => Some(Cycle::Me),
            _ => None,
        }
    }

    /// 按课程代码推断学制
    ///
    /// # 规则
    /// - 代码以 '1' 开头 → BSC
    /// - 否则 → MST
    ///
    /// ME 无法推断，必须在目录中显式给出
    pub fn infer_from_code(code: &str) -> Self {
        if code.trim_start().starts_with('1') {
            Cycle::Bsc
        } else {
            Cycle::Mst
        }
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cycle::Bsc => write!(f, "BSC"),
            Cycle::Mst => write!(f, "MST"),
            Cycle::Me => write!(f, "ME"),
        }
    }
}

// ==========================================
// 学制偏好 (Cycle Preference)
// ==========================================
// 编码: BSC=0 / INDIFFERENT=1 / MST=2
// BSC 队列按编码升序（精确匹配优先），MST 队列按编码降序（精确匹配优先）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CyclePreference {
    Bsc,
    Indifferent,
    Mst,
}

impl CyclePreference {
    /// 排序编码
    pub fn code(self) -> u8 {
        match self {
            CyclePreference::Bsc => 0,
            CyclePreference::Indifferent => 1,
            CyclePreference::Mst => 2,
        }
    }

    /// 是否接受指定学制的课程
    pub fn accepts(self, cycle: Cycle) -> bool {
        match cycle {
            Cycle::Bsc => matches!(self, CyclePreference::Bsc | CyclePreference::Indifferent),
            Cycle::Mst => matches!(self, CyclePreference::Mst | CyclePreference::Indifferent),
            Cycle::Me => false,
        }
    }
}

impl fmt::Display for CyclePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CyclePreference::Bsc => write!(f, "BSC"),
            CyclePreference::Indifferent => write!(f, "INDIFFERENT"),
            CyclePreference::Mst => write!(f, "MST"),
        }
    }
}

// ==========================================
// 匹配状态 (Match Status)
// ==========================================
// 对账口径: 分配结束后剩余需求相对初始需求的满足程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Unsupported,      // ME 学制，不建模
    UndefinedNeed,    // BSC 缺少人工权重
    NoChange,         // 未分配任何工作量
    FullyMatched,     // 需求已全部满足
    PartiallyMatched, // 部分满足
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Unsupported => write!(f, "UNSUPPORTED"),
            MatchStatus::UndefinedNeed => write!(f, "UNDEFINED_NEED"),
            MatchStatus::NoChange => write!(f, "NO_CHANGE"),
            MatchStatus::FullyMatched => write!(f, "FULLY_MATCHED"),
            MatchStatus::PartiallyMatched => write!(f, "PARTIALLY_MATCHED"),
        }
    }
}

// ==========================================
// 身份解析步骤 (Resolution Step)
// ==========================================
// 顺序即级联顺序，逐步放宽连接键
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionStep {
    Exact,              // 四元组完全一致
    CodePeriodLanguage, // 忽略课程名
    NamePeriodLanguage, // 忽略课程代码
    CodePeriod,         // 忽略语言
}

impl fmt::Display for ResolutionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionStep::Exact => write!(f, "EXACT"),
            ResolutionStep::CodePeriodLanguage => write!(f, "CODE_PERIOD_LANGUAGE"),
            ResolutionStep::NamePeriodLanguage => write!(f, "NAME_PERIOD_LANGUAGE"),
            ResolutionStep::CodePeriod => write!(f, "CODE_PERIOD"),
        }
    }
}

// ==========================================
// 学期 (Semester)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Semester {
    S1,
    S2,
}

impl Semester {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "S1" => Some(Semester::S1),
            "S2" => Some(Semester::S2),
            _ => None,
        }
    }

    /// 学期内包含的开课周期代码
    pub fn terms(self) -> &'static [&'static str] {
        match self {
            Semester::S1 => &["S1", "T1", "T2"],
            Semester::S2 => &["S2", "T3", "T4"],
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Semester::S1 => write!(f, "S1"),
            Semester::S2 => write!(f, "S2"),
        }
    }
}

// ==========================================
// 合同变更意向 (Contract Change)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractChange {
    Increase,
    Keep,
    Reduce,
}

impl fmt::Display for ContractChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractChange::Increase => write!(f, "INCREASE"),
            ContractChange::Keep => write!(f, "KEEP"),
            ContractChange::Reduce => write!(f, "REDUCE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_inferred_from_code() {
        assert_eq!(Cycle::infer_from_code("1101"), Cycle::Bsc);
        assert_eq!(Cycle::infer_from_code("2304"), Cycle::Mst);
        assert_eq!(Cycle::infer_from_code(" 1999"), Cycle::Bsc);
    }

    #[test]
    fn test_cycle_parse() {
        assert_eq!(Cycle::parse("bsc"), Some(Cycle::Bsc));
        assert_eq!(Cycle::parse(" MST "), Some(Cycle::Mst));
        assert_eq!(Cycle::parse("ME"), Some(Cycle::Me));
        assert_eq!(Cycle::parse(""), None);
    }

    #[test]
    fn test_cycle_preference_accepts() {
        assert!(CyclePreference::Bsc.accepts(Cycle::Bsc));
        assert!(CyclePreference::Indifferent.accepts(Cycle::Bsc));
        assert!(!CyclePreference::Mst.accepts(Cycle::Bsc));

        assert!(CyclePreference::Mst.accepts(Cycle::Mst));
        assert!(CyclePreference::Indifferent.accepts(Cycle::Mst));
        assert!(!CyclePreference::Bsc.accepts(Cycle::Mst));

        assert!(!CyclePreference::Indifferent.accepts(Cycle::Me));
    }

    #[test]
    fn test_semester_terms() {
        assert_eq!(Semester::S1.terms(), &["S1", "T1", "T2"]);
        assert_eq!(Semester::S2.terms(), &["S2", "T3", "T4"]);
        assert_eq!(Semester::parse("s2"), Some(Semester::S2));
    }
}
