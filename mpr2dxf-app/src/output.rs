use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use mpr2dxf_config::OutputConfig;

/// DXF 的写出目标。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

/// 根据命令行与配置决定单个输入的输出位置。
///
/// 优先级：`--stdout` > `--output` > 配置中的 `output.directory` > 输入文件所在目录。
/// `--output` 在多个输入或指向已有目录时按目录处理。
pub fn resolve_target(
    input: &Path,
    file_name: &str,
    explicit: Option<&Path>,
    single_input: bool,
    to_stdout: bool,
    config: &OutputConfig,
) -> OutputTarget {
    if to_stdout {
        return OutputTarget::Stdout;
    }
    if let Some(path) = explicit {
        if single_input && !path.is_dir() {
            return OutputTarget::File(path.to_path_buf());
        }
        return OutputTarget::File(path.join(file_name));
    }
    if let Some(dir) = config.directory.as_ref() {
        return OutputTarget::File(dir.join(file_name));
    }
    OutputTarget::File(input.with_file_name(file_name))
}

pub fn write_dxf(path: &Path, dxf: &str, overwrite: bool) -> Result<()> {
    if !overwrite && path.exists() {
        bail!("输出文件 {} 已存在，且配置禁止覆盖", path.display());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("创建输出目录 {} 失败", parent.display()))?;
    }
    fs::write(path, dxf).with_context(|| format!("写入 {} 失败", path.display()))
}
