use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use mpr2dxf_config::{AppConfig, ConfigError};
use mpr2dxf_core::diagnostics::Diagnostics;
use mpr2dxf_core::document::ConversionResult;
use mpr2dxf_engine::{ConvertedDocument, Converter, ScanLimits};
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

mod output;

use output::{OutputTarget, resolve_target, write_dxf};

/// 将 MPR 文件中的直线与圆转换为 DXF。
#[derive(Debug, Parser)]
#[command(name = "mpr2dxf", version, about)]
struct Cli {
    /// 待转换的 MPR 文件
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// 输出文件（单个输入）或目录
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// 将 DXF 写到标准输出
    #[arg(long, conflicts_with_all = ["output", "summary"])]
    stdout: bool,
    /// 以 JSON 打印提取结果与警告
    #[arg(long)]
    summary: bool,
    /// 显式指定配置文件
    #[arg(long)]
    config: Option<PathBuf>,
    /// 覆盖配置中的日志等级
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Serialize)]
struct Summary<'a> {
    input: &'a Path,
    output: Option<&'a Path>,
    result: &'a ConversionResult,
    diagnostics: &'a Diagnostics,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let (config, config_error) = load_configuration(cli.config.as_deref());
    init_logging(cli.log_level.as_deref().unwrap_or(&config.logging.level));
    if let Some(err) = config_error {
        warn!(error = %err, "加载配置失败，使用内建默认值");
    }

    let converter = Converter::new(ScanLimits {
        line_window: config.parser.line_window,
        circle_window: config.parser.circle_window,
    });

    let single_input = cli.inputs.len() == 1;
    let mut failures = 0usize;
    for input in &cli.inputs {
        if let Err(err) = convert_file(&converter, &cli, &config, input, single_input) {
            error!(input = %input.display(), error = %format!("{err:#}"), "转换失败");
            failures += 1;
        }
    }

    if failures > 0 {
        error!(failures, total = cli.inputs.len(), "部分文件未能转换");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn convert_file(
    converter: &Converter,
    cli: &Cli,
    config: &AppConfig,
    input: &Path,
    single_input: bool,
) -> Result<()> {
    let bytes = fs::read(input).with_context(|| format!("读取 {} 失败", input.display()))?;
    let source_name = input.file_name().and_then(|name| name.to_str());
    let converted = converter.convert_bytes(Some(&bytes), source_name)?;

    let target = resolve_target(
        input,
        &converted.file_name,
        cli.output.as_deref(),
        single_input,
        cli.stdout,
        &config.output,
    );
    let written = match &target {
        OutputTarget::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(converted.dxf.as_bytes())
                .context("写入标准输出失败")?;
            None
        }
        OutputTarget::File(path) => {
            write_dxf(path, &converted.dxf, config.output.overwrite)?;
            info!(
                input = %input.display(),
                output = %path.display(),
                circles = converted.result.circles.len(),
                "已写出 DXF"
            );
            Some(path.as_path())
        }
    };

    if cli.summary {
        print_summary(input, written, &converted)?;
    }
    Ok(())
}

fn print_summary(
    input: &Path,
    output: Option<&Path>,
    converted: &ConvertedDocument,
) -> Result<()> {
    let summary = Summary {
        input,
        output,
        result: &converted.result,
        diagnostics: &converted.diagnostics,
    };
    let json = serde_json::to_string_pretty(&summary).context("序列化摘要失败")?;
    println!("{json}");
    Ok(())
}

/// 日志尚未初始化，错误交由调用方在初始化后记录。
fn load_configuration(override_path: Option<&Path>) -> (AppConfig, Option<ConfigError>) {
    let loaded = match override_path {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::discover(),
    };
    match loaded {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}
