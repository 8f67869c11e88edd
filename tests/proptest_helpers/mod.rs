#![allow(dead_code)]

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// One generated NVM camera line, kept as structured values.
#[derive(Clone, Debug)]
pub struct GenCamera {
    pub file_path: String,
    pub focal_length: f64,
    pub s1: f32,
    pub s2: f32,
}

/// One generated NVM point line; each measurement is `(camera, x, y)`.
#[derive(Clone, Debug)]
pub struct GenPoint {
    pub position: [f64; 3],
    pub color: [u8; 3],
    pub measurements: Vec<(i32, f64, f64)>,
}

/// One generated dense patch together with its PLY color.
#[derive(Clone, Debug)]
pub struct GenPatch {
    pub position: [f64; 3],
    pub normal: [f64; 3],
    pub color: [u8; 3],
    pub ncc: f32,
    pub seen: Vec<i32>,
    pub not_seen: Vec<i32>,
}

pub fn coord_strategy() -> impl Strategy<Value = f64> {
    (-1_000_000i32..=1_000_000).prop_map(|v| v as f64 / 1000.0)
}

/// Dyadic fractions survive the text round trip exactly in both f32 and f64.
pub fn aux_value_strategy() -> impl Strategy<Value = f32> {
    (-30_000i32..=30_000).prop_map(|v| v as f32 / 64.0)
}

pub fn file_path_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,48}\\.(jpg|png)"
}

pub fn index_list_strategy(max_len: usize) -> impl Strategy<Value = Vec<i32>> {
    proptest::collection::vec(0i32..500, 0..=max_len)
}

pub fn arb_camera() -> BoxedStrategy<GenCamera> {
    (
        file_path_strategy(),
        1u32..20_000,
        aux_value_strategy(),
        aux_value_strategy(),
    )
        .prop_map(|(file_path, focal, s1, s2)| GenCamera {
            file_path,
            focal_length: focal as f64 / 4.0,
            s1,
            s2,
        })
        .boxed()
}

pub fn arb_point(max_cameras: i32, max_measurements: usize) -> BoxedStrategy<GenPoint> {
    (
        [coord_strategy(), coord_strategy(), coord_strategy()],
        any::<[u8; 3]>(),
        proptest::collection::vec(
            (0..max_cameras.max(1), coord_strategy(), coord_strategy()),
            0..=max_measurements,
        ),
    )
        .prop_map(|(position, color, measurements)| GenPoint {
            position,
            color,
            measurements,
        })
        .boxed()
}

pub fn arb_patch() -> BoxedStrategy<GenPatch> {
    (
        [coord_strategy(), coord_strategy(), coord_strategy()],
        [coord_strategy(), coord_strategy(), coord_strategy()],
        any::<[u8; 3]>(),
        0u16..=1024,
        index_list_strategy(6),
        index_list_strategy(6),
    )
        .prop_map(|(position, normal, color, ncc, seen, not_seen)| GenPatch {
            position,
            normal,
            color,
            ncc: ncc as f32 / 1024.0,
            seen,
            not_seen,
        })
        .boxed()
}

pub fn render_nvm(cameras: &[GenCamera], points: &[GenPoint]) -> String {
    let mut out = format!("NVM_V3\n\n{}\n", cameras.len());
    for cam in cameras {
        out.push_str(&format!(
            "{} {} 1 0 0 0 0 0 0 {} {}\n",
            cam.file_path, cam.focal_length, cam.s1, cam.s2
        ));
    }
    out.push_str(&format!("\n{}\n", points.len()));
    for point in points {
        let [x, y, z] = point.position;
        let [r, g, b] = point.color;
        out.push_str(&format!(
            "{x} {y} {z} {r} {g} {b} {}",
            point.measurements.len()
        ));
        for (feature, (cam, mx, my)) in point.measurements.iter().enumerate() {
            out.push_str(&format!(" {cam} {feature} {mx} {my}"));
        }
        out.push('\n');
    }
    out
}

fn join(values: &[i32]) -> String {
    values
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_patch(patches: &[GenPatch]) -> String {
    let mut out = format!("PATCHES\n{}\n", patches.len());
    for patch in patches {
        let [x, y, z] = patch.position;
        let [nx, ny, nz] = patch.normal;
        out.push_str(&format!(
            "PATCHS\n{x} {y} {z} 1\n{nx} {ny} {nz} 0\n{} 0 0\n{}\n{}\n{}\n{}\n\n",
            patch.ncc,
            patch.seen.len(),
            join(&patch.seen),
            patch.not_seen.len(),
            join(&patch.not_seen),
        ));
    }
    out
}

pub fn render_ply(patches: &[GenPatch]) -> String {
    let mut out = format!("ply\n{}", crate::common::PLY_HEADER_BODY);
    for patch in patches {
        let [x, y, z] = patch.position;
        let [nx, ny, nz] = patch.normal;
        let [r, g, b] = patch.color;
        out.push_str(&format!("{x} {y} {z} {nx} {ny} {nz} {r} {g} {b}\n"));
    }
    out
}
