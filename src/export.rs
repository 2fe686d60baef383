// ==========================================
// 助教工作量分配系统 - 结果导出
// ==========================================
// 职责: 运行结果 → CSV 报表 + JSON 运行记录
// 输出目录下的文件:
//   needs.csv / preferences.csv / allocations.csv   三张主报表
//   skipped.csv / resolutions.csv / ambiguous.csv / unmatched_courses.csv / orphaned_tas.csv
//   leaving_tas.csv / unknown_tas.csv / contract_changes.csv / tas_to_contact.csv
//   ta_balances.csv / dq_violations.csv / run.json
// ==========================================

use crate::engine::AllocationRunResult;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("目录创建失败 ({path}): {message}")]
    CreateDir { path: String, message: String },

    #[error("CSV 写入失败 ({path}): {message}")]
    Csv { path: String, message: String },

    #[error("JSON 写入失败 ({path}): {message}")]
    Json { path: String, message: String },
}

pub type ExportResult<T> = Result<T, ExportError>;

// ===== 扁平化的审计行（CSV 不支持嵌套结构）=====

#[derive(Debug, Serialize)]
struct SkippedRow<'a> {
    ta: &'a str,
    course: String,
    rank: u8,
    reason: String,
}

#[derive(Debug, Serialize)]
struct ResolutionRow {
    survey_course: String,
    catalog_course: String,
    step: String,
}

#[derive(Debug, Serialize)]
struct AmbiguousRow {
    survey_course: String,
    step: String,
    chosen: String,
    candidates: String,
}

#[derive(Debug, Serialize)]
struct CourseRow {
    course: String,
}

#[derive(Debug, Serialize)]
struct TaRow<'a> {
    ta: &'a str,
}

// ==========================================
// ReportWriter
// ==========================================
pub struct ReportWriter {
    out_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// 写出全部报表
    ///
    /// # 返回
    /// 已写出的文件路径（按写出顺序）
    pub fn write_all(&self, result: &AllocationRunResult) -> ExportResult<Vec<PathBuf>> {
        fs::create_dir_all(&self.out_dir).map_err(|e| ExportError::CreateDir {
            path: self.out_dir.display().to_string(),
            message: e.to_string(),
        })?;

        let mut written = Vec::new();

        // 主报表
        written.push(self.write_rows("needs.csv", result.needs_rows())?);
        written.push(self.write_rows("preferences.csv", &result.preference_rows())?);
        written.push(self.write_rows("allocations.csv", &result.allocation_rows())?);

        // 审计报表
        let skipped: Vec<SkippedRow> = result
            .skipped
            .iter()
            .map(|s| SkippedRow {
                ta: &s.ta,
                course: s.course.label(),
                rank: s.rank,
                reason: s.reason.to_string(),
            })
            .collect();
        written.push(self.write_rows("skipped.csv", &skipped)?);

        let resolutions: Vec<ResolutionRow> = result
            .reconciliation
            .resolutions
            .iter()
            .map(|r| ResolutionRow {
                survey_course: r.survey_course.label(),
                catalog_course: r.catalog_course.label(),
                step: r.step.to_string(),
            })
            .collect();
        written.push(self.write_rows("resolutions.csv", &resolutions)?);

        let ambiguous: Vec<AmbiguousRow> = result
            .reconciliation
            .ambiguous_matches
            .iter()
            .map(|a| AmbiguousRow {
                survey_course: a.survey_course.label(),
                step: a.step.to_string(),
                chosen: a.chosen.label(),
                candidates: a
                    .candidates
                    .iter()
                    .map(|c| c.label())
                    .collect::<Vec<_>>()
                    .join(" ; "),
            })
            .collect();
        written.push(self.write_rows("ambiguous.csv", &ambiguous)?);

        let unmatched: Vec<CourseRow> = result
            .reconciliation
            .unmatched_courses
            .iter()
            .map(|c| CourseRow { course: c.label() })
            .collect();
        written.push(self.write_rows("unmatched_courses.csv", &unmatched)?);

        let orphaned: Vec<TaRow> = result
            .reconciliation
            .orphaned_tas
            .iter()
            .map(|ta| TaRow { ta })
            .collect();
        written.push(self.write_rows("orphaned_tas.csv", &orphaned)?);

        // 花名册报表
        let roster = &result.roster;
        written.push(self.write_rows("leaving_tas.csv", &roster.leaving_tas)?);
        written.push(self.write_rows("unknown_tas.csv", &roster.unknown_tas)?);
        written.push(self.write_rows("contract_changes.csv", &roster.contract_changes)?);
        written.push(self.write_rows("tas_to_contact.csv", &roster.tas_to_contact)?);

        written.push(self.write_rows("ta_balances.csv", &result.ta_balances)?);
        written.push(self.write_rows("dq_violations.csv", &result.dq_violations)?);

        written.push(self.write_json("run.json", result)?);

        info!(files = written.len(), out_dir = %self.out_dir.display(), "报表导出完成");
        Ok(written)
    }

    /// 写出单张 CSV（空表无法推断表头，生成空文件）
    pub fn write_rows<T: Serialize>(&self, file_name: &str, rows: &[T]) -> ExportResult<PathBuf> {
        let path = self.out_dir.join(file_name);
        let csv_error = |e: csv::Error| ExportError::Csv {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(true)
            .from_path(&path)
            .map_err(csv_error)?;
        for row in rows {
            writer.serialize(row).map_err(csv_error)?;
        }
        writer.flush().map_err(|e| ExportError::Csv {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        debug!(file = %path.display(), rows = rows.len(), "CSV 已写出");
        Ok(path)
    }

    pub fn write_json<T: Serialize>(&self, file_name: &str, value: &T) -> ExportResult<PathBuf> {
        let path = self.out_dir.join(file_name);
        let json_error = |message: String| ExportError::Json {
            path: path.display().to_string(),
            message,
        };

        let content = serde_json::to_string_pretty(value).map_err(|e| json_error(e.to_string()))?;
        fs::write(&path, content).map_err(|e| json_error(e.to_string()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::AllocationReportRow;
    use crate::domain::types::Cycle;

    #[test]
    fn test_write_rows_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path());
        let path = writer
            .write_rows(
                "allocations.csv",
                &[AllocationReportRow {
                    cycle: Cycle::Bsc,
                    course: "1101 || Calculus || S1 || EN".to_string(),
                    ta: "a@uni.pt".to_string(),
                    amount: 0.25,
                }],
            )
            .unwrap();

        let content = fs::read_to_string(path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("cycle,course,ta,amount"));
        assert_eq!(lines.next(), Some("BSC,1101 || Calculus || S1 || EN,a@uni.pt,0.25"));
    }
}
