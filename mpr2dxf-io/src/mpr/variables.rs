use std::collections::HashMap;

use mpr2dxf_core::diagnostics::{DiagnosticKind, Diagnostics, Section};
use tracing::debug;

use crate::cursor::{Boundary, LineCursor};
use crate::mpr::value::{quoted, split_pair, strip_quotes};

/// 变量段头部（按前缀匹配）。
pub const VARIABLES_MARKER: &str = "[001";

/// `[001` 段定义的变量表，构建后不可变。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableTable {
    values: HashMap<String, String>,
}

impl VariableTable {
    /// 从文档中第一个 `[001` 段构建变量表。段不存在时返回空表。
    pub fn build(source: &str, diagnostics: &mut Diagnostics) -> Self {
        let mut cursor = LineCursor::new(source);
        let mut values = HashMap::new();
        let Some(header) = cursor.seek_marker(VARIABLES_MARKER) else {
            debug!("未找到变量段");
            return Self { values };
        };

        // 变量段没有固定长度，直到下一个段标记或空行为止。
        for (number, text) in cursor.window(usize::MAX, Boundary::VARIABLES) {
            match parse_assignment(text) {
                Some((name, value)) => {
                    values.insert(name.to_string(), value.to_string());
                }
                None => diagnostics.push(
                    number,
                    Section::Variables,
                    DiagnosticKind::MalformedAssignment {
                        text: text.trim().to_string(),
                    },
                ),
            }
        }
        debug!(header, count = values.len(), "变量表构建完成");
        Self { values }
    }

    /// 去引号后若恰好是已定义的变量名则返回其值，否则原样返回。
    pub fn resolve<'t>(&'t self, raw: &'t str) -> &'t str {
        let token = strip_quotes(raw);
        self.values.get(token).map(String::as_str).unwrap_or(token)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for VariableTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// `NAME = "VALUE"`，名称只允许字母、数字与下划线。
fn parse_assignment(line: &str) -> Option<(&str, &str)> {
    let (name, value) = split_pair(line)?;
    if !name.chars().all(|ch| ch.is_alphanumeric() || ch == '_') {
        return None;
    }
    Some((name, quoted(value)?))
}
