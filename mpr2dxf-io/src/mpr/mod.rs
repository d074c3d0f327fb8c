//! MPR 文本解析：`[001` 变量段、`$E` 直线段、`<102` 圆段。

pub mod value;
pub mod variables;

use mpr2dxf_core::diagnostics::{DiagnosticKind, Diagnostics, Section};
use mpr2dxf_core::document::{CircleDescriptor, ConversionResult, LineDescriptor};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::cursor::{Boundary, LineCursor};
use value::{parse_number, quoted, split_pair, strip_quotes};
pub use variables::VariableTable;

pub const LINE_MARKER: &str = "$E";
pub const CIRCLE_MARKER: &str = "<102";

const LINE_KEYS: [&str; 3] = ["x", "y", "z"];
const CIRCLE_KEYS: [&str; 3] = ["xa", "ya", "du"];

/// 各段前瞻窗口的最大行数。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanLimits {
    pub line_window: usize,
    pub circle_window: usize,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            line_window: 10,
            circle_window: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineExtractionError {
    #[error("required line parameters missing: no $E section found")]
    SectionNotFound,
    #[error("required line parameters missing: {}", .missing.join(", "))]
    MissingParameters {
        /// `$E` 标记所在行号。
        line: usize,
        missing: Vec<&'static str>,
    },
}

/// 值是否必须带双引号：`$E` 段可选，`<102` 段必需。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteRule {
    Optional,
    Required,
}

/// 一组按名称（大小写不敏感）寻址的数值字段。
struct Fields<const N: usize> {
    names: [&'static str; N],
    values: [Option<f64>; N],
}

impl<const N: usize> Fields<N> {
    fn new(names: [&'static str; N]) -> Self {
        Self {
            names,
            values: [None; N],
        }
    }

    fn slot(&mut self, key: &str) -> Option<(&'static str, &mut Option<f64>)> {
        let index = self
            .names
            .iter()
            .position(|name| name.eq_ignore_ascii_case(key))?;
        Some((self.names[index], &mut self.values[index]))
    }

    fn missing(&self) -> Vec<&'static str> {
        self.names
            .iter()
            .zip(self.values.iter())
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| *name)
            .collect()
    }

    fn complete(&self) -> Option<[f64; N]> {
        let mut out = [0.0; N];
        for (slot, value) in out.iter_mut().zip(self.values.iter()) {
            *slot = (*value)?;
        }
        Some(out)
    }
}

pub struct MprParser<'a> {
    source: &'a str,
    variables: VariableTable,
    limits: ScanLimits,
}

impl<'a> MprParser<'a> {
    /// 构建一次变量表，供直线与圆的提取共用。
    pub fn new(source: &'a str, diagnostics: &mut Diagnostics) -> Self {
        Self {
            source,
            variables: VariableTable::build(source, diagnostics),
            limits: ScanLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ScanLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    pub fn parse(
        &self,
        diagnostics: &mut Diagnostics,
    ) -> Result<ConversionResult, LineExtractionError> {
        let line = self.extract_line(diagnostics)?;
        let circles = self.extract_circles(diagnostics);
        Ok(ConversionResult::new(line, circles))
    }

    /// 仅使用第一个 `$E` 段；之后的 `$E` 段记录警告后忽略。
    pub fn extract_line(
        &self,
        diagnostics: &mut Diagnostics,
    ) -> Result<LineDescriptor, LineExtractionError> {
        let mut cursor = LineCursor::new(self.source);
        let marker = cursor
            .seek_marker(LINE_MARKER)
            .ok_or(LineExtractionError::SectionNotFound)?;

        let mut fields = Fields::new(LINE_KEYS);
        for (number, text) in cursor.window(self.limits.line_window, Boundary::LINE) {
            self.assign_field(
                &mut fields,
                number,
                text,
                QuoteRule::Optional,
                Section::Line,
                diagnostics,
            );
        }

        while let Some(extra) = cursor.seek_marker(LINE_MARKER) {
            diagnostics.push(extra, Section::Line, DiagnosticKind::IgnoredLineSection);
        }

        let [x, y, z] = fields
            .complete()
            .ok_or_else(|| LineExtractionError::MissingParameters {
                line: marker,
                missing: fields.missing(),
            })?;
        debug!(marker, x, y, z, "直线提取完成");
        Ok(LineDescriptor::new(x, y, z))
    }

    /// 处理每一个 `<102` 段，字段不全的圆被丢弃。
    pub fn extract_circles(&self, diagnostics: &mut Diagnostics) -> Vec<CircleDescriptor> {
        let mut cursor = LineCursor::new(self.source);
        let mut circles = Vec::new();
        while let Some(marker) = cursor.seek_marker(CIRCLE_MARKER) {
            let mut fields = Fields::new(CIRCLE_KEYS);
            for (number, text) in cursor.window(self.limits.circle_window, Boundary::CIRCLE) {
                self.assign_field(
                    &mut fields,
                    number,
                    text,
                    QuoteRule::Required,
                    Section::Circle,
                    diagnostics,
                );
            }
            match fields.complete() {
                Some([xa, ya, du]) => {
                    debug!(marker, xa, ya, du, "圆提取完成");
                    circles.push(CircleDescriptor::new(xa, ya, du));
                }
                None => diagnostics.push(
                    marker,
                    Section::Circle,
                    DiagnosticKind::IncompleteCircle {
                        missing: fields.missing().into_iter().map(str::to_string).collect(),
                    },
                ),
            }
        }
        circles
    }

    fn assign_field<const N: usize>(
        &self,
        fields: &mut Fields<N>,
        number: usize,
        text: &str,
        rule: QuoteRule,
        section: Section,
        diagnostics: &mut Diagnostics,
    ) {
        let Some((key, raw)) = split_pair(text) else {
            return;
        };
        let Some((name, slot)) = fields.slot(key) else {
            return;
        };
        let token = match rule {
            QuoteRule::Optional => strip_quotes(raw),
            QuoteRule::Required => match quoted(raw) {
                Some(inner) => inner,
                None => {
                    debug!(line = number, key, "值缺少双引号，跳过");
                    return;
                }
            },
        };
        let resolved = self.variables.resolve(token);
        match parse_number(resolved) {
            Ok(value) => *slot = Some(value),
            Err(err) => {
                debug!(line = number, key = name, error = %err, "字段值无效");
                diagnostics.push(
                    number,
                    section,
                    DiagnosticKind::MalformedField {
                        key: name.to_string(),
                        raw: token.to_string(),
                        resolved: resolved.to_string(),
                    },
                );
            }
        }
    }
}

/// 独立提取直线：自行构建变量表。
pub fn extract_line(
    source: &str,
    diagnostics: &mut Diagnostics,
) -> Result<LineDescriptor, LineExtractionError> {
    MprParser::new(source, diagnostics).extract_line(diagnostics)
}

/// 独立提取全部圆：自行构建变量表。
pub fn extract_circles(source: &str, diagnostics: &mut Diagnostics) -> Vec<CircleDescriptor> {
    MprParser::new(source, diagnostics).extract_circles(diagnostics)
}
