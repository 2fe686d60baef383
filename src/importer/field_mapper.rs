// ==========================================
// 助教工作量分配系统 - 字段映射器实现
// ==========================================
// 职责: 原始行 → 类型化记录（目录/权重/合同/问卷）
// 红线: 只按已解析的列名取值；行级错误返回 Err，由调用方记入 DQ
// ==========================================

use crate::domain::course::{CatalogRow, CourseKey, WeightRow};
use crate::domain::quality::{DqLevel, DqViolation};
use crate::domain::ta::{ContractRow, SurveyRanking, SurveyResponse};
use crate::domain::types::Cycle;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;
use crate::importer::schema::{fields, ResolvedColumns, SurveySchema};

pub struct FieldMapper;

impl FieldMapper {
    // ==========================================
    // 课程目录
    // ==========================================

    pub fn map_catalog_row(&self, cols: &ResolvedColumns, row: &RawRow) -> ImportResult<CatalogRow> {
        let code = self.required_text(cols, row, fields::COURSE_CODE)?;
        let term = self.required_text(cols, row, fields::TERM)?;
        let name = cols.value(row, fields::COURSE_NAME).unwrap_or("").to_string();
        let language = cols.value(row, fields::LANGUAGE).unwrap_or("").to_string();

        let cycle = match cols.value(row, fields::CYCLE) {
            None => Cycle::infer_from_code(&code),
            Some(raw) => Cycle::parse(raw).ok_or_else(|| ImportError::TypeConversionError {
                row: row.row_number,
                field: fields::CYCLE.to_string(),
                message: format!("未知学制: {}", raw),
            })?,
        };

        let classes = match cols.value(row, fields::CLASSES) {
            None => 1,
            Some(_) => self.parse_count(cols, row, fields::CLASSES)?,
        };
        let slots = match cols.value(row, fields::SLOTS) {
            None => 0,
            Some(_) => self.parse_count(cols, row, fields::SLOTS)?,
        };

        Ok(CatalogRow {
            code,
            name,
            term,
            language,
            cycle,
            classes,
            slots,
            faculty_empty: DataCleaner.parse_flag(cols.value(row, fields::FACULTY_EMPTY)),
            row_number: row.row_number,
        })
    }

    // ==========================================
    // 本科权重
    // ==========================================

    /// 权重乘以 `weight_scale`；空权重 → None
    pub fn map_weight_row(
        &self,
        cols: &ResolvedColumns,
        row: &RawRow,
        weight_scale: f64,
    ) -> ImportResult<WeightRow> {
        let label = self.required_text(cols, row, fields::COURSE)?;
        let course = CourseKey::parse_label(&label).ok_or_else(|| ImportError::TypeConversionError {
            row: row.row_number,
            field: fields::COURSE.to_string(),
            message: format!("课程标签格式错误: {}", label),
        })?;

        let weight = self
            .parse_f64(cols, row, fields::WEIGHT)?
            .map(|w| w * weight_scale);

        Ok(WeightRow {
            course,
            weight,
            row_number: row.row_number,
        })
    }

    // ==========================================
    // 合同
    // ==========================================

    pub fn map_contract_row(&self, cols: &ResolvedColumns, row: &RawRow) -> ImportResult<ContractRow> {
        let ta = DataCleaner.clean_email(&self.required_text(cols, row, fields::TA)?);
        let contract = self
            .parse_f64(cols, row, fields::CONTRACT)?
            .ok_or_else(|| ImportError::EmptyRequiredValue {
                row: row.row_number,
                field: fields::CONTRACT.to_string(),
            })?;

        Ok(ContractRow {
            ta,
            contract,
            row_number: row.row_number,
        })
    }

    // ==========================================
    // 问卷
    // ==========================================

    /// 映射一份答卷
    ///
    /// # 规则
    /// - 同一课程多列：取最右侧非空值
    /// - 排名非整数 → WARNING 并丢弃；排名不在 1..=max_rank → 丢弃
    /// - 完成时间无法解析 → WARNING，视为缺失
    ///
    /// # 返回
    /// (答卷, 行内 DQ 违规)
    pub fn map_survey_response(
        &self,
        schema: &SurveySchema,
        row: &RawRow,
        max_rank: u8,
    ) -> ImportResult<(SurveyResponse, Vec<DqViolation>)> {
        let cleaner = DataCleaner;
        let cols = &schema.columns;
        let ta = cleaner.clean_email(&self.required_text(cols, row, fields::TA)?);
        let mut violations = Vec::new();

        let end_date = match cols.value(row, fields::END_DATE) {
            None => None,
            Some(raw) => {
                let parsed = cleaner.parse_datetime(raw);
                if parsed.is_none() {
                    violations.push(survey_violation(
                        row,
                        &ta,
                        DqLevel::Warning,
                        fields::END_DATE,
                        format!("完成时间无法解析: {}", raw),
                    ));
                }
                parsed
            }
        };

        // 合并同一课程的多个列
        let mut merged: Vec<(CourseKey, Option<&str>)> = Vec::new();
        for column in &schema.course_columns {
            let value = row.get(column.index);
            match merged.iter_mut().find(|(course, _)| *course == column.course) {
                Some(entry) => {
                    if value.is_some() {
                        entry.1 = value;
                    }
                }
                None => merged.push((column.course.clone(), value)),
            }
        }

        let mut rankings = Vec::new();
        for (course, raw) in merged {
            let Some(raw) = raw else { continue };
            match parse_rank(raw) {
                Some(rank) if rank >= 1 && rank <= i64::from(max_rank) => {
                    rankings.push(SurveyRanking {
                        course,
                        rank: rank as u8,
                    });
                }
                Some(_) => {}
                None => violations.push(survey_violation(
                    row,
                    &ta,
                    DqLevel::Warning,
                    &course.label(),
                    format!("排名不是整数: {}", raw),
                )),
            }
        }

        let response = SurveyResponse {
            full_name: cleaner.normalize_null(cols.value(row, fields::FULL_NAME)),
            end_date,
            continues: cleaner.translate_continue(cols.value(row, fields::CONTINUE)),
            master_student_with_courses: cleaner
                .translate_master_student(cols.value(row, fields::MASTER_STUDENT)),
            has_restriction: cleaner.translate_restriction(cols.value(row, fields::RESTRICTION)),
            cycle_preference: cleaner
                .translate_cycle_preference(cols.value(row, fields::CYCLE_PREFERENCE)),
            contract_change: cleaner
                .translate_contract_change(cols.value(row, fields::CONTRACT_CHANGE)),
            decreased_load: cleaner.clean_percentage(cols.value(row, fields::DECREASED_LOAD)),
            increased_load: cleaner.clean_percentage(cols.value(row, fields::INCREASED_LOAD)),
            rankings,
            row_number: row.row_number,
            ta,
        };

        Ok((response, violations))
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn required_text(&self, cols: &ResolvedColumns, row: &RawRow, field: &str) -> ImportResult<String> {
        cols.value(row, field)
            .map(|v| v.trim().to_string())
            .ok_or_else(|| ImportError::EmptyRequiredValue {
                row: row.row_number,
                field: field.to_string(),
            })
    }

    fn parse_f64(&self, cols: &ResolvedColumns, row: &RawRow, field: &str) -> ImportResult<Option<f64>> {
        match cols.value(row, field) {
            None => Ok(None),
            Some(value) => value
                .replace(',', ".")
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ImportError::TypeConversionError {
                    row: row.row_number,
                    field: field.to_string(),
                    message: format!("无法解析为浮点数: {}", value),
                }),
        }
    }

    /// 非负整数（兼容 "12.0"）
    fn parse_count(&self, cols: &ResolvedColumns, row: &RawRow, field: &str) -> ImportResult<u32> {
        let value = self.parse_f64(cols, row, field)?.unwrap_or(0.0);
        if value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
            return Err(ImportError::TypeConversionError {
                row: row.row_number,
                field: field.to_string(),
                message: format!("必须为非负整数: {}", value),
            });
        }
        Ok(value as u32)
    }
}

/// 排名解析（兼容 "1.0"）
fn parse_rank(raw: &str) -> Option<i64> {
    let text = raw.trim();
    if let Ok(rank) = text.parse::<i64>() {
        return Some(rank);
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => Some(value as i64),
        _ => None,
    }
}

fn survey_violation(
    row: &RawRow,
    ta: &str,
    level: DqLevel,
    field: &str,
    message: String,
) -> DqViolation {
    DqViolation {
        table: "survey".to_string(),
        row_number: row.row_number,
        key: Some(ta.to_string()),
        level,
        field: field.to_string(),
        message,
    }
}
