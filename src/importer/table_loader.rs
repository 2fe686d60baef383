// ==========================================
// 助教工作量分配系统 - 输入表加载器
// ==========================================
// 流程: 解析 → 列解析 → 字段映射 → DQ 校验
// 红线: 文件级错误与必需列缺失中止加载；行级错误记为 ERROR 并跳过该行
// ==========================================

use crate::config::AllocationConfigReader;
use crate::domain::course::{CatalogRow, CourseKey, WeightRow};
use crate::domain::quality::{DqLevel, DqSummary, DqViolation};
use crate::domain::ta::{ContractRow, SurveyResponse};
use crate::importer::dq_validator::DqValidator;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{CsvParser, RawRow, RawTable};
use crate::importer::importer_trait::FileParser;
use crate::importer::schema::{
    ResolvedColumns, SurveySchema, CATALOG_COLUMNS, CONTRACT_COLUMNS, WEIGHT_COLUMNS,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

// ==========================================
// InputPaths - 四张输入表的文件路径
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputPaths {
    pub catalog: PathBuf,
    pub weights: PathBuf,
    pub contracts: PathBuf,
    pub survey: PathBuf,
}

impl InputPaths {
    /// 目录下的默认文件名
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            catalog: dir.join("catalog.csv"),
            weights: dir.join("weights.csv"),
            contracts: dir.join("contracts.csv"),
            survey: dir.join("survey.csv"),
        }
    }
}

// ==========================================
// InputTables - 已类型化的输入
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct InputTables {
    pub catalog: Vec<CatalogRow>,
    pub weights: Vec<WeightRow>,
    pub contracts: Vec<ContractRow>,
    pub survey: Vec<SurveyResponse>,
    pub survey_courses: Vec<CourseKey>, // 问卷课程列顺序（已去重）
    pub violations: Vec<DqViolation>,
}

impl InputTables {
    pub fn dq_summary(&self) -> DqSummary {
        DqSummary::from_violations(&self.violations)
    }
}

// ==========================================
// TableLoader
// ==========================================
pub struct TableLoader<C>
where
    C: AllocationConfigReader,
{
    config: Arc<C>,
    file_parser: Box<dyn FileParser>,
    field_mapper: FieldMapper,
    dq_validator: DqValidator,
}

impl<C> TableLoader<C>
where
    C: AllocationConfigReader,
{
    pub fn new(config: Arc<C>) -> Self {
        Self::with_parser(config, Box::new(CsvParser))
    }

    pub fn with_parser(config: Arc<C>, file_parser: Box<dyn FileParser>) -> Self {
        Self {
            config,
            file_parser,
            field_mapper: FieldMapper,
            dq_validator: DqValidator,
        }
    }

    /// 从文件加载四张表
    #[instrument(skip(self))]
    pub fn load_files(&self, paths: &InputPaths) -> ImportResult<InputTables> {
        let catalog = self.file_parser.parse_to_raw_table(&paths.catalog)?;
        let weights = self.file_parser.parse_to_raw_table(&paths.weights)?;
        let contracts = self.file_parser.parse_to_raw_table(&paths.contracts)?;
        let survey = self.file_parser.parse_to_raw_table(&paths.survey)?;
        self.load_tables(catalog, weights, contracts, survey)
    }

    /// 从已解析的原始表加载
    pub fn load_tables(
        &self,
        catalog: RawTable,
        weights: RawTable,
        contracts: RawTable,
        survey: RawTable,
    ) -> ImportResult<InputTables> {
        let mut violations = Vec::new();

        // ===== 课程目录 =====
        let cols = ResolvedColumns::resolve("catalog", &catalog.headers, CATALOG_COLUMNS)?;
        let catalog_rows = collect_rows(&catalog.rows, "catalog", &mut violations, |row| {
            self.field_mapper.map_catalog_row(&cols, row)
        })?;
        violations.extend(self.dq_validator.validate_catalog(&catalog_rows));

        // ===== 本科权重 =====
        let scale = self.config.get_bsc_weight_scale()?;
        let cols = ResolvedColumns::resolve("weights", &weights.headers, WEIGHT_COLUMNS)?;
        let weight_rows = collect_rows(&weights.rows, "weights", &mut violations, |row| {
            self.field_mapper.map_weight_row(&cols, row, scale)
        })?;
        violations.extend(self.dq_validator.validate_weights(&weight_rows, &catalog_rows));

        // ===== 合同 =====
        let cols = ResolvedColumns::resolve("contracts", &contracts.headers, CONTRACT_COLUMNS)?;
        let contract_rows = collect_rows(&contracts.rows, "contracts", &mut violations, |row| {
            self.field_mapper.map_contract_row(&cols, row)
        })?;
        let (contract_rows, contract_violations) =
            self.dq_validator.validate_contracts(contract_rows);
        violations.extend(contract_violations);

        // ===== 问卷 =====
        let max_rank = self.config.get_max_rank()?;
        let schema = SurveySchema::resolve(&survey.headers)?;
        let mut row_violations = Vec::new();
        let responses = collect_rows(&survey.rows, "survey", &mut violations, |row| {
            let (response, mut found) = self.field_mapper.map_survey_response(&schema, row, max_rank)?;
            row_violations.append(&mut found);
            Ok(response)
        })?;
        violations.extend(row_violations);

        let mut survey_courses: Vec<CourseKey> = Vec::new();
        for column in &schema.course_columns {
            if !survey_courses.contains(&column.course) {
                survey_courses.push(column.course.clone());
            }
        }

        let tables = InputTables {
            catalog: catalog_rows,
            weights: weight_rows,
            contracts: contract_rows,
            survey: responses,
            survey_courses,
            violations,
        };

        let summary = tables.dq_summary();
        info!(
            catalog = tables.catalog.len(),
            weights = tables.weights.len(),
            contracts = tables.contracts.len(),
            survey = tables.survey.len(),
            dq_error = summary.error,
            dq_warning = summary.warning,
            "输入表加载完成"
        );

        Ok(tables)
    }
}

/// 逐行映射；非致命错误记为 ERROR 违规并跳过该行
fn collect_rows<T, F>(
    rows: &[RawRow],
    table: &str,
    violations: &mut Vec<DqViolation>,
    mut map: F,
) -> ImportResult<Vec<T>>
where
    F: FnMut(&RawRow) -> ImportResult<T>,
{
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        match map(row) {
            Ok(record) => records.push(record),
            Err(err) if !err.is_fatal() => {
                warn!(table, row = row.row_number, error = %err, "行映射失败，跳过");
                violations.push(DqViolation {
                    table: table.to_string(),
                    row_number: row.row_number,
                    key: None,
                    level: DqLevel::Error,
                    field: error_field(&err),
                    message: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }
    Ok(records)
}

fn error_field(err: &ImportError) -> String {
    match err {
        ImportError::TypeConversionError { field, .. }
        | ImportError::EmptyRequiredValue { field, .. } => field.clone(),
        _ => String::new(),
    }
}
