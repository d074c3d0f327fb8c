use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use mpr2dxf_core::diagnostics::Diagnostics;
use mpr2dxf_core::document::ConversionResult;
use thiserror::Error;
use tracing::info;

pub mod cursor;
pub mod dxf;
pub mod mpr;

pub use dxf::{DxfWriter, MIME_TYPE, render, render_result};
pub use mpr::{LineExtractionError, MprParser, ScanLimits, VariableTable};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    LineExtraction(#[from] LineExtractionError),
}

/// 解析结果连同过程中收集的警告。
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    pub result: ConversionResult,
    pub diagnostics: Diagnostics,
}

pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<LoadedDocument, IoError>;
}

pub trait DocumentSaver {
    fn save(&self, result: &ConversionResult, path: &Path) -> Result<(), IoError>;
}

/// 将字节解码为文本：去掉 UTF-8 BOM，非法序列以替换字符代替。
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8_lossy(bytes)
}

/// 从文本解析出直线与圆。
pub fn parse_mpr(source: &str, limits: ScanLimits) -> Result<LoadedDocument, LineExtractionError> {
    let mut diagnostics = Diagnostics::new();
    let result = MprParser::new(source, &mut diagnostics)
        .with_limits(limits)
        .parse(&mut diagnostics)?;
    Ok(LoadedDocument {
        result,
        diagnostics,
    })
}

#[derive(Debug, Clone, Default)]
pub struct MprFacade {
    limits: ScanLimits,
}

impl MprFacade {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: ScanLimits) -> Self {
        Self { limits }
    }
}

impl DocumentLoader for MprFacade {
    fn load(&self, path: &Path) -> Result<LoadedDocument, IoError> {
        let data = fs::read(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let loaded = parse_mpr(&decode_text(&data), self.limits)?;
        info!(
            path = %path.display(),
            circles = loaded.result.circles.len(),
            warnings = loaded.diagnostics.len(),
            "MPR 解析完成"
        );
        Ok(loaded)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DxfFacade;

impl DxfFacade {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentSaver for DxfFacade {
    fn save(&self, result: &ConversionResult, path: &Path) -> Result<(), IoError> {
        fs::write(path, render_result(result)).map_err(|source| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        })
    }
}
