// ==========================================
// 助教工作量分配系统 - 数据质量校验器实现
// ==========================================
// 职责: 跨行 / 跨表的 DQ 校验（行内错误由字段映射器产生）
// ==========================================

use crate::domain::course::{CatalogRow, WeightRow};
use crate::domain::quality::{DqLevel, DqViolation};
use crate::domain::ta::ContractRow;
use std::collections::{BTreeSet, HashSet};

pub struct DqValidator;

impl DqValidator {
    /// 目录: 授课教师为空的行（仍计入需求，INFO）
    pub fn validate_catalog(&self, rows: &[CatalogRow]) -> Vec<DqViolation> {
        rows.iter()
            .filter(|row| row.faculty_empty)
            .map(|row| DqViolation {
                table: "catalog".to_string(),
                row_number: row.row_number,
                key: Some(row.key().label()),
                level: DqLevel::Info,
                field: "faculty_empty".to_string(),
                message: "授课教师为空，仍计入需求".to_string(),
            })
            .collect()
    }

    /// 合同: 助教重复（保留首行，CONFLICT）/ 比例超出 [0, 1]（WARNING）
    ///
    /// # 返回
    /// (去重后的合同行, 违规列表)
    pub fn validate_contracts(&self, rows: Vec<ContractRow>) -> (Vec<ContractRow>, Vec<DqViolation>) {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(rows.len());
        let mut violations = Vec::new();

        for row in rows {
            if !seen.insert(row.ta.clone()) {
                violations.push(DqViolation {
                    table: "contracts".to_string(),
                    row_number: row.row_number,
                    key: Some(row.ta.clone()),
                    level: DqLevel::Conflict,
                    field: "ta".to_string(),
                    message: "助教重复，保留首行".to_string(),
                });
                continue;
            }

            if !(0.0..=1.0).contains(&row.contract) {
                violations.push(DqViolation {
                    table: "contracts".to_string(),
                    row_number: row.row_number,
                    key: Some(row.ta.clone()),
                    level: DqLevel::Warning,
                    field: "contract".to_string(),
                    message: format!("合同比例超出 [0, 1]: {:.3}", row.contract),
                });
            }

            kept.push(row);
        }

        (kept, violations)
    }

    /// 权重: 课程不在目录中（INFO）/ 权重为负（WARNING）
    pub fn validate_weights(&self, weights: &[WeightRow], catalog: &[CatalogRow]) -> Vec<DqViolation> {
        let catalog_keys: BTreeSet<_> = catalog.iter().map(|row| row.key()).collect();
        let mut violations = Vec::new();

        for row in weights {
            if !catalog_keys.contains(&row.course) {
                violations.push(DqViolation {
                    table: "weights".to_string(),
                    row_number: row.row_number,
                    key: Some(row.course.label()),
                    level: DqLevel::Info,
                    field: "course".to_string(),
                    message: "权重课程不在目录中，忽略".to_string(),
                });
            }
            if let Some(weight) = row.weight {
                if weight < 0.0 {
                    violations.push(DqViolation {
                        table: "weights".to_string(),
                        row_number: row.row_number,
                        key: Some(row.course.label()),
                        level: DqLevel::Warning,
                        field: "weight".to_string(),
                        message: format!("权重为负: {:.3}", weight),
                    });
                }
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::course::CourseKey;
    use crate::domain::types::Cycle;

    fn catalog_row(code: &str, faculty_empty: bool) -> CatalogRow {
        CatalogRow {
            code: code.to_string(),
            name: "Course".to_string(),
            term: "S1".to_string(),
            language: "EN".to_string(),
            cycle: Cycle::Bsc,
            classes: 1,
            slots: 30,
            faculty_empty,
            row_number: 2,
        }
    }

    fn contract(ta: &str, value: f64, row_number: usize) -> ContractRow {
        ContractRow {
            ta: ta.to_string(),
            contract: value,
            row_number,
        }
    }

    #[test]
    fn test_faculty_empty_is_info() {
        let violations =
            DqValidator.validate_catalog(&[catalog_row("1101", true), catalog_row("1102", false)]);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].level, DqLevel::Info);
    }

    #[test]
    fn test_duplicate_contract_keeps_first() {
        let (kept, violations) = DqValidator.validate_contracts(vec![
            contract("a@uni.pt", 0.5, 2),
            contract("a@uni.pt", 0.2, 3),
            contract("b@uni.pt", 1.5, 4),
        ]);

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].contract, 0.5);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].level, DqLevel::Conflict);
        assert_eq!(violations[1].level, DqLevel::Warning);
    }

    #[test]
    fn test_weight_for_unknown_course() {
        let weights = vec![WeightRow {
            course: CourseKey::new("9999", "Ghost", "S1", "EN"),
            weight: Some(0.25),
            row_number: 2,
        }];
        let violations = DqValidator.validate_weights(&weights, &[catalog_row("1101", false)]);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "course");
    }
}
