use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use mpr2dxf_core::diagnostics::Diagnostics;
use mpr2dxf_core::document::ConversionResult;
use mpr2dxf_io::LoadedDocument;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GoldenExtraction {
    result: ConversionResult,
    #[serde(default)]
    diagnostics: Diagnostics,
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn golden_dir() -> PathBuf {
    let base_dir = fixture("golden");
    if let Err(err) = fs::create_dir_all(&base_dir) {
        panic!("无法创建黄金数据目录 {}: {err}", base_dir.display());
    }
    base_dir
}

/// 比较解析结果与 `tests/data/golden/{name}.json`。
pub fn assert_golden_extraction(name: &str, loaded: &LoadedDocument) {
    let snapshot = GoldenExtraction {
        result: loaded.result.clone(),
        diagnostics: loaded.diagnostics.clone(),
    };
    let base_dir = golden_dir();
    let golden_path = base_dir.join(format!("{name}.json"));
    let serialized = serde_json::to_string_pretty(&snapshot).expect("序列化黄金快照失败");

    if !golden_path.exists() {
        fs::write(&golden_path, &serialized)
            .unwrap_or_else(|err| panic!("写入黄金文件 {} 失败: {err}", golden_path.display()));
        panic!(
            "黄金文件 {} 不存在，已自动生成。请确认内容后重新运行测试。",
            golden_path.display()
        );
    }

    let expected_str = fs::read_to_string(&golden_path)
        .unwrap_or_else(|err| panic!("读取黄金文件 {} 失败: {err}", golden_path.display()));
    let expected: GoldenExtraction = serde_json::from_str(&expected_str)
        .unwrap_or_else(|err| panic!("解析黄金文件 {} 失败: {err}", golden_path.display()));

    if expected != snapshot {
        let diff_path = base_dir.join(format!("{name}.actual.json"));
        fs::write(&diff_path, &serialized).expect("写入差异文件失败");
        panic!(
            "黄金文件 {} 与当前解析结果不一致。已生成对照输出 {}。",
            golden_path.display(),
            diff_path.display()
        );
    }
}

/// DXF 输出必须与 `tests/data/golden/{name}.dxf` 逐字节一致。
pub fn assert_golden_dxf(name: &str, rendered: &str) {
    let base_dir = golden_dir();
    let golden_path = base_dir.join(format!("{name}.dxf"));
    let expected = fs::read_to_string(&golden_path)
        .unwrap_or_else(|err| panic!("读取黄金文件 {} 失败: {err}", golden_path.display()));
    if expected != rendered {
        let diff_path = base_dir.join(format!("{name}.actual.dxf"));
        fs::write(&diff_path, rendered).expect("写入差异文件失败");
        panic!(
            "黄金文件 {} 与当前输出不一致。已生成对照输出 {}。",
            golden_path.display(),
            diff_path.display()
        );
    }
}
