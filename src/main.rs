// ==========================================
// 助教工作量分配系统 - 命令行入口
// ==========================================
// 用法:
//   ta-allocation <catalog.csv> <weights.csv> <contracts.csv> <survey.csv> [out_dir]
//   ta-allocation --dir <input_dir> [out_dir]
// 选项:
//   --config <path>  指定配置文件（默认见 ConfigManager::default_config_path）
// ==========================================

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use ta_allocation::domain::MatchStatus;
use ta_allocation::{logging, AllocationOrchestrator, ConfigManager, InputPaths, ReportWriter};

const USAGE: &str = "用法: ta-allocation <catalog.csv> <weights.csv> <contracts.csv> <survey.csv> [out_dir]\n      ta-allocation --dir <input_dir> [out_dir]\n选项: --config <path>";

struct CliArgs {
    inputs: InputPaths,
    out_dir: PathBuf,
    config: Option<PathBuf>,
}

fn parse_args(args: Vec<String>) -> Result<CliArgs> {
    let mut config = None;
    let mut input_dir = None;
    let mut positional = Vec::new();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                config = Some(PathBuf::from(iter.next().context("--config 缺少路径")?));
            }
            "--dir" => {
                input_dir = Some(PathBuf::from(iter.next().context("--dir 缺少路径")?));
            }
            "-h" | "--help" => bail!("{}", USAGE),
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let (inputs, rest) = match input_dir {
        Some(dir) => (InputPaths::in_dir(dir), positional),
        None => {
            if positional.len() < 4 {
                bail!("{}", USAGE);
            }
            let rest = positional.split_off(4);
            let mut files = positional.into_iter();
            let mut next = || files.next().unwrap_or_default();
            (
                InputPaths {
                    catalog: next(),
                    weights: next(),
                    contracts: next(),
                    survey: next(),
                },
                rest,
            )
        }
    };

    if rest.len() > 1 {
        bail!("{}", USAGE);
    }
    let out_dir = rest.into_iter().next().unwrap_or_else(|| PathBuf::from("output"));

    Ok(CliArgs {
        inputs,
        out_dir,
        config,
    })
}

fn main() -> Result<()> {
    logging::init();

    let args = parse_args(std::env::args().skip(1).collect())?;

    tracing::info!("==================================================");
    tracing::info!("{} v{}", ta_allocation::APP_NAME, ta_allocation::VERSION);
    tracing::info!("==================================================");

    let config = match &args.config {
        Some(path) => ConfigManager::from_file(path)
            .with_context(|| format!("无法加载配置文件: {}", path.display()))?,
        None => ConfigManager::load_default().context("无法加载默认配置")?,
    };

    let orchestrator = AllocationOrchestrator::new(Arc::new(config));
    let result = orchestrator
        .run_files(&args.inputs)
        .context("分配运行失败")?;

    let written = ReportWriter::new(&args.out_dir)
        .write_all(&result)
        .context("报表导出失败")?;

    let report = &result.reconciliation;
    println!("运行编号: {}", result.run_id);
    println!("分配记录: {}", result.allocations.len());
    println!("未分配偏好: {}", result.skipped.len());
    println!(
        "课程: 完全满足 {} / 部分满足 {} / 无变化 {} / 需求未定义 {} / 不支持 {}",
        report.count_by_status(MatchStatus::FullyMatched),
        report.count_by_status(MatchStatus::PartiallyMatched),
        report.count_by_status(MatchStatus::NoChange),
        report.count_by_status(MatchStatus::UndefinedNeed),
        report.count_by_status(MatchStatus::Unsupported),
    );
    println!(
        "未匹配课程: {}，孤立助教: {}",
        report.unmatched_courses.len(),
        report.orphaned_tas.len()
    );
    println!("已写出 {} 个文件到 {}", written.len(), args.out_dir.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_positional_arguments() {
        let parsed = parse_args(args(&["c.csv", "w.csv", "k.csv", "s.csv", "out"])).unwrap();
        assert_eq!(parsed.inputs.survey, PathBuf::from("s.csv"));
        assert_eq!(parsed.out_dir, PathBuf::from("out"));
        assert!(parsed.config.is_none());
    }

    #[test]
    fn test_dir_and_config() {
        let parsed = parse_args(args(&["--dir", "data", "--config", "cfg.json"])).unwrap();
        assert_eq!(parsed.inputs.catalog, PathBuf::from("data").join("catalog.csv"));
        assert_eq!(parsed.out_dir, PathBuf::from("output"));
        assert_eq!(parsed.config, Some(PathBuf::from("cfg.json")));
    }

    #[test]
    fn test_too_few_arguments() {
        assert!(parse_args(args(&["c.csv", "w.csv"])).is_err());
    }
}
