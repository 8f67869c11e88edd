#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// The 12 PLY header lines that follow the `ply` magic.
pub const PLY_HEADER_BODY: &str = "format ascii 1.0
element vertex 0
property float x
property float y
property float z
property float nx
property float ny
property float nz
property uchar diffuse_red
property uchar diffuse_green
property uchar diffuse_blue
end_header
";

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

pub fn write_text(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, contents).expect("write text file");
}

/// Renders one patch block in the layout PMVS writes.
pub fn patch_block(
    position: [f64; 3],
    normal: [f64; 3],
    ncc: f64,
    seen: &[i32],
    not_seen: &[i32],
) -> String {
    let join = |values: &[i32]| {
        values
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    };
    format!(
        "PATCHS\n{} {} {} 1\n{} {} {} 0\n{} 0 0\n{}\n{}\n{}\n{}\n\n",
        position[0],
        position[1],
        position[2],
        normal[0],
        normal[1],
        normal[2],
        ncc,
        seen.len(),
        join(seen),
        not_seen.len(),
        join(not_seen),
    )
}

/// Renders a full patch file from pre-rendered blocks.
pub fn patch_file(blocks: &[String]) -> String {
    let mut out = format!("PATCHES\n{}\n", blocks.len());
    for block in blocks {
        out.push_str(block);
    }
    out
}

/// Renders a PLY file with one vertex line per `(position, normal, color)`.
pub fn ply_file(vertices: &[([f64; 3], [f64; 3], [u8; 3])]) -> String {
    let mut out = format!("ply\n{PLY_HEADER_BODY}");
    for (p, n, c) in vertices {
        out.push_str(&format!(
            "{} {} {} {} {} {} {} {} {}\n",
            p[0], p[1], p[2], n[0], n[1], n[2], c[0], c[1], c[2]
        ));
    }
    out
}
