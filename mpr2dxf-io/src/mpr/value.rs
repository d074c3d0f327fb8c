use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberError {
    #[error("empty value")]
    Empty,
    #[error("\"{0}\" is not a number")]
    NotANumber(String),
    #[error("\"{0}\" is not a finite number")]
    NotFinite(String),
}

/// 去除首尾空白后再去掉一对包围的双引号。
pub fn strip_quotes(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(trimmed)
}

/// 仅当值被双引号完整包围时返回引号内的内容。
pub fn quoted(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.len() < 2 {
        return None;
    }
    trimmed.strip_prefix('"')?.strip_suffix('"')
}

/// 标准浮点解析，拒绝 `inf`/`NaN`。
pub fn parse_number(text: &str) -> Result<f64, NumberError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(NumberError::Empty);
    }
    let value = text
        .parse::<f64>()
        .map_err(|_| NumberError::NotANumber(text.to_string()))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NumberError::NotFinite(text.to_string()))
    }
}

/// 将 `KEY=VALUE` 拆分为去空白的键与原始值。
pub fn split_pair(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}
