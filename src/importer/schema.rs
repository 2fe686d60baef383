// ==========================================
// 助教工作量分配系统 - 表结构声明与列解析
// ==========================================
// 职责: 按列名（含别名）定位字段，导入前一次性校验
// 红线: 必需列缺失 → 致命错误；禁止按列位置取值
// ==========================================

use crate::domain::course::CourseKey;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;
use std::collections::HashMap;

/// 问卷课程列的可选前缀分隔符（`题组 :: CODE || NAME || PERIOD || LANGUAGE`）
pub const COURSE_COLUMN_LABEL_SEPARATOR: &str = " :: ";

// ==========================================
// ColumnSpec - 列声明
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub field: &'static str,
    pub aliases: &'static [&'static str],
    pub required: bool,
}

const fn required(field: &'static str, aliases: &'static [&'static str]) -> ColumnSpec {
    ColumnSpec {
        field,
        aliases,
        required: true,
    }
}

const fn optional(field: &'static str, aliases: &'static [&'static str]) -> ColumnSpec {
    ColumnSpec {
        field,
        aliases,
        required: false,
    }
}

// ==========================================
// 各表字段
// ==========================================
pub mod fields {
    // 课程目录
    pub const COURSE_CODE: &str = "course_code";
    pub const COURSE_NAME: &str = "course_name";
    pub const TERM: &str = "term";
    pub const LANGUAGE: &str = "language";
    pub const CYCLE: &str = "cycle";
    pub const CLASSES: &str = "classes";
    pub const SLOTS: &str = "slots";
    pub const FACULTY_EMPTY: &str = "faculty_empty";

    // 本科权重
    pub const COURSE: &str = "course";
    pub const WEIGHT: &str = "weight";

    // 合同
    pub const TA: &str = "ta";
    pub const CONTRACT: &str = "contract";

    // 问卷
    pub const FULL_NAME: &str = "full_name";
    pub const END_DATE: &str = "end_date";
    pub const CONTINUE: &str = "continue";
    pub const MASTER_STUDENT: &str = "master_student";
    pub const RESTRICTION: &str = "restriction";
    pub const CYCLE_PREFERENCE: &str = "cycle_preference";
    pub const CONTRACT_CHANGE: &str = "contract_change";
    pub const DECREASED_LOAD: &str = "decreased_load";
    pub const INCREASED_LOAD: &str = "increased_load";
}

pub const CATALOG_COLUMNS: &[ColumnSpec] = &[
    required(fields::COURSE_CODE, &["COURSE CODE", "code"]),
    required(fields::COURSE_NAME, &["COURSE NAME", "name"]),
    required(fields::TERM, &["TERM", "period"]),
    required(fields::LANGUAGE, &["LANGUAGE"]),
    optional(fields::CYCLE, &["CYCLE"]),
    optional(fields::CLASSES, &["CLASSES", "CLASS COUNT"]),
    required(fields::SLOTS, &["SLOTS", "STUDENTS"]),
    optional(fields::FACULTY_EMPTY, &["FACULTY EMPTY", "FACULTY_EMPTY"]),
];

pub const WEIGHT_COLUMNS: &[ColumnSpec] = &[
    required(fields::COURSE, &["course"]),
    required(fields::WEIGHT, &["weight"]),
];

pub const CONTRACT_COLUMNS: &[ColumnSpec] = &[
    required(fields::TA, &["TA", "email"]),
    required(fields::CONTRACT, &["contract", "capacity"]),
];

pub const SURVEY_COLUMNS: &[ColumnSpec] = &[
    required(fields::TA, &["TA", "email", "Please write your E-mail"]),
    optional(fields::FULL_NAME, &["Full Name", "name"]),
    optional(fields::END_DATE, &["End Date"]),
    required(fields::CONTINUE, &["Continue", "Continue next semester"]),
    optional(fields::MASTER_STUDENT, &["Master Student", "Student status"]),
    optional(fields::RESTRICTION, &["Restriction", "Workload restriction"]),
    required(fields::CYCLE_PREFERENCE, &["Cycle Preference", "Program preference"]),
    optional(fields::CONTRACT_CHANGE, &["Contract Change"]),
    optional(fields::DECREASED_LOAD, &["Decreased Load"]),
    optional(fields::INCREASED_LOAD, &["Increased Load"]),
];

// ==========================================
// ResolvedColumns - 已解析的字段 → 列位置映射
// ==========================================
#[derive(Debug, Clone)]
pub struct ResolvedColumns {
    table: String,
    columns: HashMap<&'static str, usize>,
}

impl ResolvedColumns {
    /// 解析表头
    ///
    /// 别名比较忽略大小写与首尾空白；同一字段多列命中时取首列
    pub fn resolve(table: &str, headers: &[String], specs: &[ColumnSpec]) -> ImportResult<Self> {
        let mut columns = HashMap::new();

        for spec in specs {
            let found = headers.iter().position(|header| {
                let normalized = header.trim().to_lowercase();
                spec.aliases
                    .iter()
                    .any(|alias| alias.to_lowercase() == normalized)
            });

            match found {
                Some(index) => {
                    columns.insert(spec.field, index);
                }
                None if spec.required => {
                    return Err(ImportError::MissingRequiredColumn {
                        table: table.to_string(),
                        column: spec.aliases.first().copied().unwrap_or(spec.field).to_string(),
                    });
                }
                None => {}
            }
        }

        Ok(Self {
            table: table.to_string(),
            columns,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn has(&self, field: &str) -> bool {
        self.columns.contains_key(field)
    }

    /// 读取字段值（列不存在或单元格为空 → None）
    pub fn value<'a>(&self, row: &'a RawRow, field: &str) -> Option<&'a str> {
        self.columns.get(field).and_then(|&index| row.get(index))
    }
}

// ==========================================
// SurveySchema - 问卷结构
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct CourseColumn {
    pub index: usize, // 列位置（同名表头各自独立）
    pub header: String,
    pub course: CourseKey,
}

#[derive(Debug, Clone)]
pub struct SurveySchema {
    pub columns: ResolvedColumns,
    pub course_columns: Vec<CourseColumn>, // 按表头顺序
}

impl SurveySchema {
    pub fn resolve(headers: &[String]) -> ImportResult<Self> {
        let columns = ResolvedColumns::resolve("survey", headers, SURVEY_COLUMNS)?;

        let course_columns: Vec<CourseColumn> = headers
            .iter()
            .enumerate()
            .filter_map(|(index, header)| {
                parse_course_column(header).map(|course| CourseColumn {
                    index,
                    header: header.clone(),
                    course,
                })
            })
            .collect();

        if course_columns.is_empty() {
            return Err(ImportError::MissingRequiredColumn {
                table: "survey".to_string(),
                column: "CODE || NAME || PERIOD || LANGUAGE".to_string(),
            });
        }

        Ok(Self {
            columns,
            course_columns,
        })
    }
}

/// 解析课程列表头（可带 `题组 :: ` 前缀）
pub fn parse_course_column(header: &str) -> Option<CourseKey> {
    let label = header
        .rsplit(COURSE_COLUMN_LABEL_SEPARATOR)
        .next()
        .unwrap_or(header);
    CourseKey::parse_label(label)
}
