mod golden;

use golden::{assert_golden_dxf, assert_golden_extraction, fixture};
use mpr2dxf_core::diagnostics::{DiagnosticKind, Diagnostics};
use mpr2dxf_core::document::{CircleDescriptor, LineDescriptor};
use mpr2dxf_io::mpr::{extract_circles, extract_line};
use mpr2dxf_io::{
    DocumentLoader, DocumentSaver, DxfFacade, IoError, LineExtractionError, MprFacade,
    ScanLimits, parse_mpr, render, render_result,
};

/// 按组码-值对读取 DXF 文本，用于检查输出结构。
fn read_pairs(text: &str) -> Vec<(i32, String)> {
    let mut lines = text.lines();
    let mut pairs = Vec::new();
    while let Some(code_line) = lines.next() {
        let value_line = lines.next().expect("组码缺少对应的值行");
        let code = code_line
            .trim()
            .parse::<i32>()
            .unwrap_or_else(|_| panic!("组码 \"{}\" 无法解析为整数", code_line.trim()));
        pairs.push((code, value_line.to_string()));
    }
    pairs
}

fn entity_kinds(text: &str) -> Vec<String> {
    read_pairs(text)
        .into_iter()
        .filter(|(code, _)| *code == 0)
        .map(|(_, value)| value)
        .collect()
}

#[test]
fn load_panel_matches_expected_extraction() {
    let loader = MprFacade::new();
    let loaded = loader.load(&fixture("panel.mpr")).expect("读取 MPR 失败");
    assert_golden_extraction("panel", &loaded);
    assert_golden_dxf("panel", &render_result(&loaded.result));
}

#[test]
fn scaled_circle_resolves_diameter_variable() {
    let loader = MprFacade::new();
    let loaded = loader
        .load(&fixture("scaled_circle.mpr"))
        .expect("读取 MPR 失败");
    assert_golden_extraction("scaled_circle", &loaded);

    let rendered = render_result(&loaded.result);
    assert_golden_dxf("scaled_circle", &rendered);
    let pairs = read_pairs(&rendered);
    let radius = pairs
        .iter()
        .find(|(code, _)| *code == 40)
        .map(|(_, value)| value.parse::<f64>().expect("半径应为数值"))
        .expect("未找到半径组码");
    assert!((radius - 1.0).abs() < 1e-12);
}

#[test]
fn missing_z_fails_without_output() {
    let loader = MprFacade::new();
    let err = loader
        .load(&fixture("missing_z.mpr"))
        .expect_err("缺少 Z 时应失败");
    match err {
        IoError::LineExtraction(LineExtractionError::MissingParameters { line, missing }) => {
            assert_eq!(line, 7);
            assert_eq!(missing, vec!["z"]);
        }
        other => panic!("意外的错误类型：{other}"),
    }
}

#[test]
fn missing_file_reports_read_error() {
    let loader = MprFacade::new();
    let err = loader
        .load(&fixture("does_not_exist.mpr"))
        .expect_err("文件不存在时应失败");
    assert!(matches!(err, IoError::ReadError { .. }));
}

#[test]
fn conversion_is_deterministic() {
    let source = std::fs::read_to_string(fixture("panel.mpr")).expect("读取夹具失败");
    let first = parse_mpr(&source, ScanLimits::default()).expect("第一次解析失败");
    let second = parse_mpr(&source, ScanLimits::default()).expect("第二次解析失败");
    assert_eq!(first, second);
    assert_eq!(render_result(&first.result), render_result(&second.result));
}

#[test]
fn three_circles_render_in_source_order() {
    let source = "$E\nX=1\nY=2\nZ=3\n\
        <102\nXA=\"10\"\nYA=\"11\"\nDU=\"2\"\n\
        <102\nXA=\"20\"\nYA=\"21\"\nDU=\"4\"\n\
        <102\nXA=\"30\"\nYA=\"31\"\nDU=\"6\"\n";
    let mut diagnostics = Diagnostics::new();
    let line = extract_line(source, &mut diagnostics).expect("提取直线失败");
    let circles = extract_circles(source, &mut diagnostics);
    assert_eq!(
        circles,
        vec![
            CircleDescriptor::new(10.0, 11.0, 2.0),
            CircleDescriptor::new(20.0, 21.0, 4.0),
            CircleDescriptor::new(30.0, 31.0, 6.0),
        ]
    );
    assert!(diagnostics.is_empty());

    let rendered = render(&line, &circles);
    assert_eq!(
        entity_kinds(&rendered),
        vec![
            "SECTION", "ENDSEC", "SECTION", "LINE", "CIRCLE", "CIRCLE", "CIRCLE", "ENDSEC", "EOF"
        ]
    );
    let centers: Vec<String> = read_pairs(&rendered)
        .into_iter()
        .filter(|(code, _)| *code == 10)
        .map(|(_, value)| value)
        .collect();
    // 第一个 10 组码属于 LINE 起点。
    assert_eq!(centers, vec!["0", "10", "20", "30"]);
}

#[test]
fn pair_after_window_is_ignored() {
    let mut source = String::from("$E\nX=1\nY=2\n");
    for index in 0..9 {
        source.push_str(&format!("KO={index}\n"));
    }
    source.push_str("Z=3\n");
    let mut diagnostics = Diagnostics::new();
    let err = extract_line(&source, &mut diagnostics).expect_err("窗口外的 Z 不应生效");
    assert_eq!(err.to_string(), "required line parameters missing: z");
}

#[test]
fn malformed_variable_value_is_reported() {
    let source = "[001\nW=\"wide\"\n\n$E\nX=W\nY=2\nZ=3\nX=4\n";
    let mut diagnostics = Diagnostics::new();
    let line = extract_line(source, &mut diagnostics).expect("提取直线失败");
    assert_eq!(line, LineDescriptor::new(4.0, 2.0, 3.0));
    let record = diagnostics.iter().next().expect("应记录无效字段");
    assert_eq!(record.line, 5);
    assert_eq!(
        record.kind,
        DiagnosticKind::MalformedField {
            key: "x".to_string(),
            raw: "W".to_string(),
            resolved: "wide".to_string(),
        }
    );
}

#[test]
fn save_writes_rendered_dxf() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let target = dir.path().join("panel.dxf");
    let loaded = MprFacade::new()
        .load(&fixture("panel.mpr"))
        .expect("读取 MPR 失败");
    DxfFacade::new()
        .save(&loaded.result, &target)
        .expect("写入 DXF 失败");
    let written = std::fs::read_to_string(&target).expect("读取输出失败");
    assert_eq!(written, render_result(&loaded.result));
}

#[test]
fn save_into_missing_directory_fails() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let target = dir.path().join("nested").join("out.dxf");
    let loaded = parse_mpr("$E\nX=1\nY=1\nZ=1\n", ScanLimits::default()).expect("解析失败");
    let err = DxfFacade::new()
        .save(&loaded.result, &target)
        .expect_err("目录不存在时应失败");
    assert!(matches!(err, IoError::WriteError { .. }));
}
