//! 最小 DXF 文本写出器。
//!
//! 输出结构：
//! ```text
//!   0
//! SECTION
//!   2
//! HEADER          ← 空的头部段
//!   0
//! ENDSEC
//!   0
//! SECTION
//!   2
//! ENTITIES        ← 一条 LINE 与任意个 CIRCLE
//! ...
//!   0
//! ENDSEC
//!   0
//! EOF
//! ```
//!
//! 每个数据项两行：组码（右对齐三位）与值。

use std::fmt::Display;

use mpr2dxf_core::document::{CircleDescriptor, ConversionResult, LineDescriptor};
use mpr2dxf_core::geometry::Point3;

pub mod codes {
    pub const ENTITY: i32 = 0;
    pub const NAME: i32 = 2;
    pub const LAYER: i32 = 8;
    /// 主坐标 X；Y、Z 分别为 +10、+20。
    pub const PRIMARY_X: i32 = 10;
    /// 第二点 X；Y、Z 分别为 +10、+20。
    pub const SECONDARY_X: i32 = 11;
    pub const RADIUS: i32 = 40;
}

pub const DEFAULT_LAYER: &str = "0";
pub const MIME_TYPE: &str = "application/dxf";

#[derive(Debug, Default)]
pub struct DxfWriter {
    output: Vec<String>,
}

impl DxfWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入组码-值对
    pub fn write_pair(&mut self, code: i32, value: impl Display) {
        self.output.push(format!("{code:>3}"));
        self.output.push(value.to_string());
    }

    /// 写入点坐标（base、base+10、base+20）
    pub fn write_point(&mut self, base_code: i32, point: Point3) {
        self.write_pair(base_code, point.x());
        self.write_pair(base_code + 10, point.y());
        self.write_pair(base_code + 20, point.z());
    }

    pub fn begin_section(&mut self, name: &str) {
        self.write_pair(codes::ENTITY, "SECTION");
        self.write_pair(codes::NAME, name);
    }

    pub fn end_section(&mut self) {
        self.write_pair(codes::ENTITY, "ENDSEC");
    }

    pub fn write_line(&mut self, line: &LineDescriptor) {
        self.write_pair(codes::ENTITY, "LINE");
        self.write_pair(codes::LAYER, DEFAULT_LAYER);
        self.write_point(codes::PRIMARY_X, line.start());
        self.write_point(codes::SECONDARY_X, line.end());
    }

    pub fn write_circle(&mut self, circle: &CircleDescriptor) {
        self.write_pair(codes::ENTITY, "CIRCLE");
        self.write_pair(codes::LAYER, DEFAULT_LAYER);
        self.write_point(codes::PRIMARY_X, circle.center());
        self.write_pair(codes::RADIUS, circle.radius());
    }

    /// 追加 EOF 并返回完整文本（以换行结尾）。
    pub fn finish(mut self) -> String {
        self.write_pair(codes::ENTITY, "EOF");
        let mut text = self.output.join("\n");
        text.push('\n');
        text
    }
}

pub fn render(line: &LineDescriptor, circles: &[CircleDescriptor]) -> String {
    let mut writer = DxfWriter::new();
    writer.begin_section("HEADER");
    writer.end_section();

    writer.begin_section("ENTITIES");
    writer.write_line(line);
    for circle in circles {
        writer.write_circle(circle);
    }
    writer.end_section();
    writer.finish()
}

pub fn render_result(result: &ConversionResult) -> String {
    render(&result.line, &result.circles)
}
