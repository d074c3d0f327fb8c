use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 自动发现配置文件：优先读取环境变量 `MPR2DXF_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os("MPR2DXF_CONFIG") {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.parser.line_window == 0 {
            return Err(ConfigError::Invalid("parser.line_window 必须大于 0".to_string()));
        }
        if self.parser.circle_window == 0 {
            return Err(ConfigError::Invalid(
                "parser.circle_window 必须大于 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// `$E` 与 `<102` 段的前瞻窗口行数。
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ParserConfig {
    #[serde(default = "ParserConfig::default_line_window")]
    pub line_window: usize,
    #[serde(default = "ParserConfig::default_circle_window")]
    pub circle_window: usize,
}

impl ParserConfig {
    fn default_line_window() -> usize {
        10
    }

    fn default_circle_window() -> usize {
        15
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            line_window: Self::default_line_window(),
            circle_window: Self::default_circle_window(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// 输出目录；缺省时写到输入文件旁边。
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "OutputConfig::default_overwrite")]
    pub overwrite: bool,
}

impl OutputConfig {
    fn default_overwrite() -> bool {
        true
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            overwrite: Self::default_overwrite(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
    #[error("配置无效: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_returned_when_file_missing() {
        let cfg = AppConfig::discover().expect("discover should succeed");
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.parser.line_window, 10);
        assert_eq!(cfg.parser.circle_window, 15);
        assert!(cfg.output.directory.is_none());
        assert!(cfg.output.overwrite);
    }

    #[test]
    fn load_from_temp_file() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(
            file,
            r#"
            [logging]
            level = "debug"

            [parser]
            line_window = 12

            [output]
            directory = "../out"
            overwrite = false
            "#
        )
        .unwrap();

        let cfg = AppConfig::from_file(file.path()).expect("load config");
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.parser.line_window, 12);
        assert_eq!(cfg.parser.circle_window, 15);
        assert_eq!(
            cfg.output
                .directory
                .as_deref()
                .map(|p| p.to_string_lossy().to_string()),
            Some("../out".to_string())
        );
        assert!(!cfg.output.overwrite);
    }

    #[test]
    fn zero_window_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "[parser]\ncircle_window = 0").unwrap();
        let err = AppConfig::from_file(file.path()).expect_err("zero window must fail");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_reports_path() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "[parser\nline_window = ").unwrap();
        let err = AppConfig::from_file(file.path()).expect_err("parse must fail");
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
