pub mod errors {
    use mpr2dxf_io::LineExtractionError;
    use thiserror::Error;

    /// 面向调用方的错误类别，HTTP 适配层据此选择状态码。
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ErrorCategory {
        BadRequest,
        ConversionFailed,
    }

    impl ErrorCategory {
        pub fn http_status(self) -> u16 {
            match self {
                ErrorCategory::BadRequest => 400,
                ErrorCategory::ConversionFailed => 500,
            }
        }
    }

    #[derive(Debug, Error)]
    pub enum ConvertError {
        #[error("no MPR document supplied")]
        MissingInput,
        #[error(transparent)]
        LineExtractionFailed(#[from] LineExtractionError),
    }

    impl ConvertError {
        pub fn category(&self) -> ErrorCategory {
            match self {
                ConvertError::MissingInput => ErrorCategory::BadRequest,
                ConvertError::LineExtractionFailed(_) => ErrorCategory::ConversionFailed,
            }
        }
    }
}

pub mod convert {
    use std::path::Path;

    use mpr2dxf_core::diagnostics::Diagnostics;
    use mpr2dxf_core::document::ConversionResult;
    use mpr2dxf_io::{MIME_TYPE, ScanLimits, decode_text, parse_mpr, render_result};
    use tracing::info;

    use crate::errors::ConvertError;

    const FALLBACK_FILE_NAME: &str = "output.dxf";

    /// 一次转换的完整产物。
    #[derive(Debug, Clone, PartialEq)]
    pub struct ConvertedDocument {
        pub dxf: String,
        pub file_name: String,
        pub mime_type: &'static str,
        pub result: ConversionResult,
        pub diagnostics: Diagnostics,
    }

    /// 无状态的转换器：只持有只读的扫描参数，可在多个请求间共享。
    #[derive(Debug, Clone, Copy, Default)]
    pub struct Converter {
        limits: ScanLimits,
    }

    impl Converter {
        pub fn new(limits: ScanLimits) -> Self {
            Self { limits }
        }

        pub fn limits(&self) -> ScanLimits {
            self.limits
        }

        /// `bytes` 为 `None` 或空时视为调用方未提供文件。
        pub fn convert_bytes(
            &self,
            bytes: Option<&[u8]>,
            source_name: Option<&str>,
        ) -> Result<ConvertedDocument, ConvertError> {
            let bytes = bytes
                .filter(|bytes| !bytes.is_empty())
                .ok_or(ConvertError::MissingInput)?;
            self.convert_str(&decode_text(bytes), source_name)
        }

        pub fn convert_str(
            &self,
            source: &str,
            source_name: Option<&str>,
        ) -> Result<ConvertedDocument, ConvertError> {
            let loaded = parse_mpr(source, self.limits)?;
            let dxf = render_result(&loaded.result);
            let file_name = suggested_file_name(source_name);
            info!(
                file_name = %file_name,
                circles = loaded.result.circles.len(),
                warnings = loaded.diagnostics.len(),
                "转换完成"
            );
            Ok(ConvertedDocument {
                dxf,
                file_name,
                mime_type: MIME_TYPE,
                result: loaded.result,
                diagnostics: loaded.diagnostics,
            })
        }
    }

    /// 以源文件名主干加 `.dxf` 作为建议的下载文件名。
    pub fn suggested_file_name(source_name: Option<&str>) -> String {
        source_name
            .and_then(|name| Path::new(name).file_stem())
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .map(|stem| format!("{stem}.dxf"))
            .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
    }
}

pub use convert::{ConvertedDocument, Converter, suggested_file_name};
pub use errors::{ConvertError, ErrorCategory};
pub use mpr2dxf_io::ScanLimits;
