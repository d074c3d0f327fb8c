pub mod geometry {
    use glam::DVec3;
    use serde::{Deserialize, Serialize};

    /// 三维点，内部以 `glam::DVec3` 表示。DXF 输出的所有坐标都经由该类型。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point3(pub DVec3);

    impl Point3 {
        #[inline]
        pub fn new(x: f64, y: f64, z: f64) -> Self {
            Self(DVec3::new(x, y, z))
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn z(self) -> f64 {
            self.0.z
        }

        #[inline]
        pub fn as_vec3(self) -> DVec3 {
            self.0
        }
    }

    impl From<DVec3> for Point3 {
        fn from(value: DVec3) -> Self {
            Self(value)
        }
    }
}

pub mod document {
    use serde::{Deserialize, Serialize};

    use crate::geometry::Point3;

    /// MPR `$E` 段提取出的直线。起点固定在 XY 原点，与终点共用 Z。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct LineDescriptor {
        pub x: f64,
        pub y: f64,
        pub z: f64,
    }

    impl LineDescriptor {
        pub fn new(x: f64, y: f64, z: f64) -> Self {
            Self { x, y, z }
        }

        #[inline]
        pub fn start(&self) -> Point3 {
            Point3::new(0.0, 0.0, self.z)
        }

        #[inline]
        pub fn end(&self) -> Point3 {
            Point3::new(self.x, self.y, self.z)
        }
    }

    /// MPR `<102` 段提取出的圆，`du` 为直径。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct CircleDescriptor {
        pub xa: f64,
        pub ya: f64,
        pub du: f64,
    }

    impl CircleDescriptor {
        pub fn new(xa: f64, ya: f64, du: f64) -> Self {
            Self { xa, ya, du }
        }

        /// 圆心始终位于 Z = 0 平面。
        #[inline]
        pub fn center(&self) -> Point3 {
            Point3::new(self.xa, self.ya, 0.0)
        }

        #[inline]
        pub fn radius(&self) -> f64 {
            self.du / 2.0
        }
    }

    /// 解析器交给 DXF 写出器的唯一数据：一条直线与按文档顺序排列的圆。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ConversionResult {
        pub line: LineDescriptor,
        #[serde(default)]
        pub circles: Vec<CircleDescriptor>,
    }

    impl ConversionResult {
        pub fn new(line: LineDescriptor, circles: Vec<CircleDescriptor>) -> Self {
            Self { line, circles }
        }
    }
}

pub mod diagnostics {
    use std::fmt;

    use serde::{Deserialize, Serialize};
    use tracing::warn;

    /// 诊断记录所属的 MPR 段。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Section {
        Variables,
        Line,
        Circle,
    }

    impl fmt::Display for Section {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let name = match self {
                Section::Variables => "[001",
                Section::Line => "$E",
                Section::Circle => "<102",
            };
            f.write_str(name)
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "kind", rename_all = "snake_case")]
    pub enum DiagnosticKind {
        /// 已识别的键，但值无法解析为有限数值；该字段保持未设置。
        MalformedField {
            key: String,
            raw: String,
            resolved: String,
        },
        /// 变量段内不符合 `NAME = "VALUE"` 的行。
        MalformedAssignment { text: String },
        /// `<102` 段关闭时字段不全，整个圆被丢弃。
        IncompleteCircle { missing: Vec<String> },
        /// 第二个及之后的 `$E` 段不参与解析。
        IgnoredLineSection,
    }

    impl fmt::Display for DiagnosticKind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                DiagnosticKind::MalformedField { key, raw, resolved } => {
                    if raw == resolved {
                        write!(f, "{key} 的值 \"{raw}\" 不是有效数值")
                    } else {
                        write!(f, "{key} 的值 \"{raw}\"（解析为 \"{resolved}\"）不是有效数值")
                    }
                }
                DiagnosticKind::MalformedAssignment { text } => {
                    write!(f, "无法识别的变量定义 \"{text}\"")
                }
                DiagnosticKind::IncompleteCircle { missing } => {
                    write!(f, "圆缺少参数 {}，已丢弃", missing.join(", "))
                }
                DiagnosticKind::IgnoredLineSection => f.write_str("忽略多余的 $E 段"),
            }
        }
    }

    /// 单条警告，`line` 为源文件中的行号（从 1 开始）。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Diagnostic {
        pub line: usize,
        pub section: Section,
        #[serde(flatten)]
        pub kind: DiagnosticKind,
    }

    impl fmt::Display for Diagnostic {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "第 {} 行 [{}]: {}", self.line, self.section, self.kind)
        }
    }

    /// 按产生顺序收集警告。由调用方创建并以 `&mut` 传入解析器，
    /// 每条记录同时以 `warn` 级别写入 tracing。
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Diagnostics {
        records: Vec<Diagnostic>,
    }

    impl Diagnostics {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push(&mut self, line: usize, section: Section, kind: DiagnosticKind) {
            let record = Diagnostic {
                line,
                section,
                kind,
            };
            warn!(line, section = %section, "{}", record.kind);
            self.records.push(record);
        }

        pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
            self.records.iter()
        }

        pub fn len(&self) -> usize {
            self.records.len()
        }

        pub fn is_empty(&self) -> bool {
            self.records.is_empty()
        }

        pub fn extend(&mut self, other: Diagnostics) {
            self.records.extend(other.records);
        }

        pub fn into_vec(self) -> Vec<Diagnostic> {
            self.records
        }
    }
}
