//! 按行游标。三类段扫描（变量、直线、圆）共用同一套前瞻窗口与段边界判定。

/// 关闭前瞻窗口的段标记集合。空白行总是边界。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    markers: &'static [&'static str],
}

impl Boundary {
    /// `[001` 变量段：遇到 `[`、`<`、`$` 结束。
    pub const VARIABLES: Boundary = Boundary {
        markers: &["[", "<", "$"],
    };
    /// `$E` 直线段：遇到 `$E`、`[`、`<` 结束。
    pub const LINE: Boundary = Boundary {
        markers: &["$E", "[", "<"],
    };
    /// `<102` 圆段：遇到 `<`、`[`、`$` 结束。
    pub const CIRCLE: Boundary = Boundary {
        markers: &["<", "[", "$"],
    };

    pub fn closes(&self, line: &str) -> bool {
        let trimmed = line.trim();
        trimmed.is_empty() || self.markers.iter().any(|marker| trimmed.starts_with(marker))
    }
}

pub struct LineCursor<'a> {
    lines: Vec<&'a str>,
    position: usize,
}

impl<'a> LineCursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().collect(),
            position: 0,
        }
    }

    /// 下一行的下标（从 0 开始）。
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.position).copied()
    }

    /// 消费一行，返回其行号（从 1 开始）与内容。
    pub fn advance(&mut self) -> Option<(usize, &'a str)> {
        let line = self.peek()?;
        self.position += 1;
        Some((self.position, line))
    }

    /// 文档结束或下一行是边界时为真。
    pub fn at_boundary(&self, boundary: Boundary) -> bool {
        self.peek().is_none_or(|line| boundary.closes(line))
    }

    /// 跳到下一个去除空白后以 `marker` 开头的行并消费它，返回该行行号。
    pub fn seek_marker(&mut self, marker: &str) -> Option<usize> {
        while let Some((number, line)) = self.advance() {
            if line.trim().starts_with(marker) {
                return Some(number);
            }
        }
        None
    }

    /// 最多 `limit` 行的前瞻窗口，在边界行之前停止且不消费边界行。
    pub fn window<'c>(&'c mut self, limit: usize, boundary: Boundary) -> Window<'c, 'a> {
        Window {
            cursor: self,
            remaining: limit,
            boundary,
        }
    }
}

pub struct Window<'c, 'a> {
    cursor: &'c mut LineCursor<'a>,
    remaining: usize,
    boundary: Boundary,
}

impl<'a> Iterator for Window<'_, 'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 || self.cursor.at_boundary(self.boundary) {
            return None;
        }
        self.remaining -= 1;
        self.cursor.advance()
    }
}
