// ==========================================
// 助教工作量分配系统 - 数据清洗器实现
// ==========================================
// 职责: TRIM / 小写 / NULL 标准化 / 问卷答案翻译 / 百分比清洗
// ==========================================

use crate::domain::types::{ContractChange, CyclePreference};
use chrono::{NaiveDate, NaiveDateTime};

pub struct DataCleaner;

impl DataCleaner {
    /// 邮箱标准化（TRIM + 小写）
    pub fn clean_email(&self, value: &str) -> String {
        self.clean_text(value, false).to_lowercase()
    }

    pub fn clean_text(&self, value: &str, uppercase: bool) -> String {
        let trimmed = value.trim();
        if uppercase {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    }

    pub fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// 布尔标记（1/Y/YES/TRUE/是 → true）
    pub fn parse_flag(&self, value: Option<&str>) -> bool {
        match value {
            None => false,
            Some(v) => matches!(
                v.trim().to_uppercase().as_str(),
                "1" | "Y" | "YES" | "TRUE" | "是"
            ),
        }
    }

    /// 百分比清洗 → 合同比例（0~1）
    ///
    /// # 规则
    /// - 纯字母文本 → None
    /// - 只保留数字: "100" → 1.0；两位以上时前两位为整数部分、其余为小数部分
    ///   （"37,5%" → 37.5% → 0.375，"0.5" → 05% → 0.05）；一位数字 → None
    /// - 带不带 % 结果一致
    pub fn clean_percentage(&self, value: Option<&str>) -> Option<f64> {
        let text = self.normalize_null(value)?;

        if text.chars().all(|c| c.is_alphabetic() || c.is_whitespace()) {
            return None;
        }

        let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return None;
        }
        if digits == "100" {
            return Some(1.0);
        }
        if digits.len() >= 2 {
            let (integer_part, decimal_part) = digits.split_at(2);
            let percent = format!("{}.{}", integer_part, decimal_part)
                .trim_end_matches('.')
                .parse::<f64>()
                .ok()?;
            return Some(percent / 100.0);
        }
        None
    }

    // ==========================================
    // 问卷答案翻译
    // ==========================================

    /// 学制偏好（空值视为无所谓）
    pub fn translate_cycle_preference(&self, value: Option<&str>) -> CyclePreference {
        let text = match self.normalize_null(value) {
            Some(v) => v.to_lowercase(),
            None => return CyclePreference::Indifferent,
        };
        if text.contains("master") || text == "mst" || text == "ms" {
            CyclePreference::Mst
        } else if text.contains("bachelor") || text == "bsc" || text == "bs" {
            CyclePreference::Bsc
        } else {
            CyclePreference::Indifferent
        }
    }

    /// 下学期是否仍修读硕士课程（利益冲突判定依据）
    pub fn translate_master_student(&self, value: Option<&str>) -> bool {
        match self.normalize_null(value) {
            None => false,
            Some(v) => {
                v.to_lowercase().contains("at least one more course") || self.parse_flag(Some(&v))
            }
        }
    }

    /// 是否存在工作量限制（"Yes, ..." 均视为存在）
    pub fn translate_restriction(&self, value: Option<&str>) -> bool {
        match self.normalize_null(value) {
            None => false,
            Some(v) => v.to_lowercase().starts_with("yes") || self.parse_flag(Some(&v)),
        }
    }

    pub fn translate_contract_change(&self, value: Option<&str>) -> ContractChange {
        match self.normalize_null(value) {
            None => ContractChange::Keep,
            Some(v) => {
                let text = v.to_lowercase();
                if text.contains("increase") {
                    ContractChange::Increase
                } else if text.contains("reduce") || text.contains("decrease") {
                    ContractChange::Reduce
                } else {
                    ContractChange::Keep
                }
            }
        }
    }

    /// 是否继续担任助教（仅 "No" 表示离任）
    pub fn translate_continue(&self, value: Option<&str>) -> bool {
        !matches!(
            self.normalize_null(value).map(|v| v.to_lowercase()).as_deref(),
            Some("no")
        )
    }

    /// 问卷完成时间
    pub fn parse_datetime(&self, value: &str) -> Option<NaiveDateTime> {
        let text = value.trim();
        const FORMATS: &[&str] = &[
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M",
            "%d/%m/%Y %H:%M:%S",
            "%d/%m/%Y %H:%M",
        ];
        for format in FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
                return Some(dt);
            }
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_email() {
        assert_eq!(DataCleaner.clean_email("  Ana.Silva@Uni.PT "), "ana.silva@uni.pt");
    }

    #[test]
    fn test_clean_percentage() {
        let c = DataCleaner;
        assert_eq!(c.clean_percentage(Some("25")), Some(0.25));
        assert_eq!(c.clean_percentage(Some("100%")), Some(1.0));
        assert_eq!(c.clean_percentage(Some("37,5%")), Some(0.375));
        assert_eq!(c.clean_percentage(Some("30 %")), Some(0.3));
        assert_eq!(c.clean_percentage(Some("about half")), None);
        assert_eq!(c.clean_percentage(Some("5%")), None);
        assert_eq!(c.clean_percentage(Some("")), None);
        assert_eq!(c.clean_percentage(None), None);
    }

    #[test]
    fn test_clean_percentage_ignores_percent_sign() {
        let c = DataCleaner;
        for (plain, with_sign) in [("1", "1%"), ("5", "5%"), ("25", "25%"), ("100", "100%")] {
            assert_eq!(c.clean_percentage(Some(plain)), c.clean_percentage(Some(with_sign)));
        }
        assert_eq!(c.clean_percentage(Some("1")), None);
        assert_eq!(c.clean_percentage(Some("5")), None);
        assert_eq!(c.clean_percentage(Some("100")), Some(1.0));
        // 小数点不参与解析
        assert_eq!(c.clean_percentage(Some("0.5")), Some(0.05));
        assert_eq!(c.clean_percentage(Some("37.5")), Some(0.375));
    }

    #[test]
    fn test_translate_cycle_preference() {
        let c = DataCleaner;
        assert_eq!(c.translate_cycle_preference(Some("Masters' Courses")), CyclePreference::Mst);
        assert_eq!(c.translate_cycle_preference(Some("Bachelors' Courses")), CyclePreference::Bsc);
        assert_eq!(c.translate_cycle_preference(Some("Indifferent")), CyclePreference::Indifferent);
        assert_eq!(c.translate_cycle_preference(None), CyclePreference::Indifferent);
    }

    #[test]
    fn test_translate_master_student() {
        let c = DataCleaner;
        assert!(c.translate_master_student(Some(
            "Yes, I will be a Masters student and I will be doing at least one more course"
        )));
        assert!(!c.translate_master_student(Some(
            "Yes, I will be a Masters student but not doing any courses, only the Work Project"
        )));
        assert!(!c.translate_master_student(Some("Yes, I am a PhD student")));
        assert!(!c.translate_master_student(None));
    }

    #[test]
    fn test_translate_contract_change() {
        let c = DataCleaner;
        assert_eq!(
            c.translate_contract_change(Some("I want to increase the contract percentage/workload")),
            ContractChange::Increase
        );
        assert_eq!(
            c.translate_contract_change(Some("I want to reduce the contract percentage/workload")),
            ContractChange::Reduce
        );
        assert_eq!(
            c.translate_contract_change(Some("I want to keep the same contract percentage/workload")),
            ContractChange::Keep
        );
        assert_eq!(c.translate_contract_change(None), ContractChange::Keep);
    }

    #[test]
    fn test_translate_continue_and_restriction() {
        let c = DataCleaner;
        assert!(!c.translate_continue(Some("No")));
        assert!(c.translate_continue(Some("Yes")));
        assert!(c.translate_continue(None));
        assert!(c.translate_restriction(Some("Yes, I have a FCT scholarship")));
        assert!(!c.translate_restriction(Some("No")));
    }

    #[test]
    fn test_parse_datetime() {
        let c = DataCleaner;
        assert!(c.parse_datetime("2024-01-15 10:30:00").is_some());
        assert!(c.parse_datetime("2024-01-15").is_some());
        assert!(c.parse_datetime("15/01/2024 10:30").is_some());
        assert!(c.parse_datetime("yesterday").is_none());
    }
}
