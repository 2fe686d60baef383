// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试配置、输入记录构造、CSV 输入目录生成等功能
// ==========================================

#![allow(dead_code)]

use std::error::Error;
use std::fs;
use std::path::Path;
use ta_allocation::config::{config_keys, ConfigManager};
use ta_allocation::domain::course::{CatalogRow, CourseKey, WeightRow};
use ta_allocation::domain::ta::{ContractRow, SurveyRanking, SurveyResponse};
use ta_allocation::domain::types::{ContractChange, Cycle, CyclePreference};
use ta_allocation::importer::{InputPaths, InputTables};
use tempfile::TempDir;

pub const EPS: f64 = 1e-9;

/// 数值断言（浮点容差）
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPS,
        "expected {}, got {}",
        expected,
        actual
    );
}

/// 换算系数全部为 1 的测试配置
///
/// MST 需求 = 学生数 × 0.1；BSC 需求 = 班级数 × 权重（不缩放）
pub fn unit_config() -> ConfigManager {
    let mut config = ConfigManager::new();
    config.set(config_keys::CONTRACT_HOURS, "1");
    config.set(config_keys::WEEKS_PER_TERM, "1");
    config.set(config_keys::MST_SEMESTER_FACTOR, "0.1");
    config.set(config_keys::MST_TRIMESTER_FACTOR, "0.1");
    config.set(config_keys::BSC_WEIGHT_SCALE, "1");
    config
}

// ==========================================
// 记录构造
// ==========================================

pub fn key(code: &str, name: &str, period: &str, language: &str) -> CourseKey {
    CourseKey::new(code, name, period, language)
}

/// 目录行（班级粒度，classes = 1）
pub fn catalog_row(course: &CourseKey, cycle: Cycle, slots: u32) -> CatalogRow {
    CatalogRow {
        code: course.code.clone(),
        name: course.name.clone(),
        term: course.period.clone(),
        language: course.language.clone(),
        cycle,
        classes: 1,
        slots,
        faculty_empty: false,
        row_number: 2,
    }
}

pub fn weight_row(course: &CourseKey, weight: f64) -> WeightRow {
    WeightRow {
        course: course.clone(),
        weight: Some(weight),
        row_number: 2,
    }
}

pub fn contract_row(ta: &str, contract: f64) -> ContractRow {
    ContractRow {
        ta: ta.to_string(),
        contract,
        row_number: 2,
    }
}

/// 答卷（继续任职、无合同变更）
pub fn response(ta: &str, preference: CyclePreference, rankings: &[(&CourseKey, u8)]) -> SurveyResponse {
    SurveyResponse {
        ta: ta.to_string(),
        full_name: None,
        end_date: None,
        continues: true,
        master_student_with_courses: false,
        has_restriction: false,
        cycle_preference: preference,
        contract_change: ContractChange::Keep,
        decreased_load: None,
        increased_load: None,
        rankings: rankings
            .iter()
            .map(|(course, rank)| SurveyRanking {
                course: (*course).clone(),
                rank: *rank,
            })
            .collect(),
        row_number: 2,
    }
}

/// 组装输入表（问卷课程列顺序取答卷中首次出现的顺序）
pub fn tables(
    catalog: Vec<CatalogRow>,
    weights: Vec<WeightRow>,
    contracts: Vec<ContractRow>,
    survey: Vec<SurveyResponse>,
) -> InputTables {
    let mut survey_courses: Vec<CourseKey> = Vec::new();
    for r in &survey {
        for ranking in &r.rankings {
            if !survey_courses.contains(&ranking.course) {
                survey_courses.push(ranking.course.clone());
            }
        }
    }

    InputTables {
        catalog,
        weights,
        contracts,
        survey,
        survey_courses,
        violations: Vec::new(),
    }
}

// ==========================================
// CSV 输入目录
// ==========================================

pub const CATALOG_CSV: &str = "\
COURSE CODE,COURSE NAME,TERM,LANGUAGE,CYCLE,SLOTS
1101,Calculus,S1,EN,BSC,40
1101,Calculus,S1,EN,BSC,35
2201,Finance,T1,EN,MST,5
2301,Audit,T2,EN,MST,0
3001,Leadership,T1,EN,ME,20
";

pub const WEIGHTS_CSV: &str = "\
course,weight
1101 || Calculus || S1 || EN,0.15
";

pub const CONTRACTS_CSV: &str = "\
TA,contract
ana@uni.pt,0.5
rui@uni.pt,0.25
zero@uni.pt,0
";

pub const SURVEY_CSV: &str = "\
TA,Full Name,End Date,Continue,Master Student,Cycle Preference,1101 || Calc I || S1 || EN,2201 || Finance || T1 || EN,9999 || Unknown || T4 || EN
Ana@Uni.pt,Ana,2024-01-10 09:00:00,Yes,No,Indifferent,1,1,
rui@uni.pt,Rui,2024-01-11 09:00:00,Yes,No,Master's Courses,2,1,1
ghost@uni.pt,Ghost,2024-01-12 09:00:00,Yes,No,Indifferent,,,1
";

/// 在临时目录中写出四张输入表
pub fn write_input_dir(
    catalog: &str,
    weights: &str,
    contracts: &str,
    survey: &str,
) -> Result<(TempDir, InputPaths), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let paths = InputPaths::in_dir(dir.path());
    fs::write(&paths.catalog, catalog)?;
    fs::write(&paths.weights, weights)?;
    fs::write(&paths.contracts, contracts)?;
    fs::write(&paths.survey, survey)?;
    Ok((dir, paths))
}

/// 默认样例输入
pub fn write_sample_input_dir() -> Result<(TempDir, InputPaths), Box<dyn Error>> {
    write_input_dir(CATALOG_CSV, WEIGHTS_CSV, CONTRACTS_CSV, SURVEY_CSV)
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(|l| l.to_string())
        .collect()
}
