//! NVM_V3 sparse bundle reader.
//!
//! NVM_V3 is the text export of VisualSfM-style bundle adjustment. It lists
//! the calibrated cameras followed by the reconstructed 3D points, each with
//! the 2D observations that produced it.
//!
//! # NVM_V3 Format Reference
//!
//! ```text
//! NVM_V3
//! <ignored line>
//! <ncam>
//! <file_path> <focal_length> <qw> <qx> <qy> <qz> <cx> <cy> <cz> <s1> <s2>   (ncam lines)
//! <ignored line>
//! <npoint>
//! <px> <py> <pz> <r> <g> <b> <n> [<cam> <feature> <x> <y>]*n                (npoint lines)
//! ```
//!
//! - `s1`/`s2` are packed into the camera's [`MetaData`] as two big-endian
//!   `f32` values; their meaning is not interpreted.
//! - The `<feature>` column of each measurement group is required to be
//!   present but is not stored.
//! - Anything after the last declared point is ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, info, warn};

use super::geometry::{Color, Position, Quat};
use super::lines::{Line, LineSource};
use super::metadata::{CameraAuxData, MetaData};
use super::model::{Camera, Measurement, SparsePoint, SparseReconstruction};
use crate::error::BridgeError;

/// First line of every NVM_V3 file.
pub const NVM_MAGIC: &str = "NVM_V3";

const CAMERA_TOKENS: usize = 11;
const POINT_FIXED_TOKENS: usize = 7;
const MEASUREMENT_TOKENS: usize = 4;

/// Reads an NVM_V3 file into cameras and sparse points.
///
/// # Errors
/// Returns [`BridgeError::Format`] if the first line is not `NVM_V3`,
/// [`BridgeError::Parse`] for a malformed or missing line, and
/// [`BridgeError::Io`] if the file cannot be read. No partial result is
/// returned on error.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use reconbridge::ir::io_nvm::read_nvm;
///
/// let recon = read_nvm(Path::new("bundle.nvm"))?;
/// println!("{} cameras", recon.cameras.len());
/// # Ok::<(), reconbridge::BridgeError>(())
/// ```
pub fn read_nvm(path: &Path) -> Result<SparseReconstruction, BridgeError> {
    let file = File::open(path).map_err(BridgeError::Io)?;
    read_nvm_from(BufReader::new(file), path)
}

/// Reads NVM_V3 data from any buffered reader.
///
/// `path` is only used to label errors and log messages.
pub fn read_nvm_from<R: BufRead>(
    reader: R,
    path: &Path,
) -> Result<SparseReconstruction, BridgeError> {
    let mut source = LineSource::new(reader, path);
    let mut recon = SparseReconstruction::new();

    source.expect_magic(NVM_MAGIC)?;
    source.skip(1, "line after NVM_V3 header")?;

    let ncam = source.next_count("camera count")?;
    debug!("{}: {} camera(s) declared", path.display(), ncam);

    for counter in 0..ncam {
        let line = source.next_line("camera line")?;
        let camera = parse_camera_line(&line, counter)?;

        if camera.file_path.len() > recon.length_max_file_path {
            warn!(
                "{}: camera {} path '{}' is longer than the {}-byte path column",
                path.display(),
                counter,
                camera.file_path,
                recon.length_max_file_path
            );
        }
        recon.push_camera(camera);
    }

    source.skip(1, "separator line before point count")?;

    let npoint = source.next_count("point count")?;
    debug!("{}: {} sparse point(s) declared", path.display(), npoint);

    for counter in 0..npoint {
        let line = source.next_line("point line")?;
        recon.push_spoint(parse_point_line(&line, counter)?);
    }

    info!(
        "Read {} camera(s), {} sparse point(s), {} measurement(s) from {}",
        recon.cameras.len(),
        recon.spoints.len(),
        recon.measurement_count(),
        path.display()
    );

    Ok(recon)
}

/// Reads NVM_V3 data from a string.
///
/// Useful for testing without file I/O.
pub fn from_nvm_str(nvm: &str) -> Result<SparseReconstruction, BridgeError> {
    read_nvm_from(nvm.as_bytes(), Path::new("<string>"))
}

/// Reads NVM_V3 data from bytes.
///
/// Useful for fuzzing; invalid UTF-8 surfaces as an I/O error.
pub fn from_nvm_slice(bytes: &[u8]) -> Result<SparseReconstruction, BridgeError> {
    read_nvm_from(bytes, Path::new("<bytes>"))
}

fn parse_camera_line(line: &Line<'_>, counter: usize) -> Result<Camera, BridgeError> {
    let tokens = line.exact_tokens(CAMERA_TOKENS, "camera")?;

    let focal_length = line.parse(tokens[1], "focal_length")?;
    let [qw, qx, qy, qz] = line.parse_f64s(&tokens[2..6], ["qw", "qx", "qy", "qz"])?;
    let [cx, cy, cz] = line.parse_f64s(&tokens[6..9], ["cx", "cy", "cz"])?;
    let [s1, s2] = line.parse_f64s(&tokens[9..11], ["s1", "s2"])?;

    let aux = CameraAuxData::new(s1 as f32, s2 as f32);

    Ok(Camera::new(
        line.record_index(counter)?,
        focal_length,
        Quat::new(qw, qx, qy, qz),
        Position::new(cx, cy, cz),
        MetaData::from(&aux),
        tokens[0],
    ))
}

fn parse_point_line(line: &Line<'_>, counter: usize) -> Result<SparsePoint, BridgeError> {
    let tokens = line.tokens();
    if tokens.len() < POINT_FIXED_TOKENS {
        return Err(line.error(format!(
            "expected at least {POINT_FIXED_TOKENS} tokens for point, found {}",
            tokens.len()
        )));
    }

    let [px, py, pz] = line.parse_f64s(&tokens[0..3], ["x", "y", "z"])?;
    let [r, g, b] = line.parse_f64s(&tokens[3..6], ["r", "g", "b"])?;
    let nmeasurement: usize = line.parse(tokens[6], "measurement count")?;

    let block = &tokens[POINT_FIXED_TOKENS..];
    let expected = nmeasurement.checked_mul(MEASUREMENT_TOKENS);
    if expected != Some(block.len()) {
        return Err(line.error(format!(
            "measurement count {nmeasurement} needs {} tokens, found {}",
            nmeasurement.saturating_mul(MEASUREMENT_TOKENS),
            block.len()
        )));
    }

    let measurements = block
        .chunks_exact(MEASUREMENT_TOKENS)
        .map(|group| parse_measurement(line, group))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SparsePoint::new(
        line.record_index(counter)?,
        Position::new(px, py, pz),
        Color::new(r, g, b),
        MetaData::empty(),
        measurements,
    ))
}

/// Parses one `<cam> <feature> <x> <y>` group.
fn parse_measurement(line: &Line<'_>, group: &[&str]) -> Result<Measurement, BridgeError> {
    let &[camera_index, _feature_index, x, y] = group else {
        return Err(line.error(format!(
            "measurement group must have {MEASUREMENT_TOKENS} tokens, found {}",
            group.len()
        )));
    };

    let camera_index: i32 = line.parse(camera_index, "measurement camera index")?;
    let [x, y] = line.parse_f64s(&[x, y], ["measurement x", "measurement y"])?;

    Ok(Measurement::new(camera_index, x, y))
}

/// Fuzz-only entrypoint for single point-line parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_point_line(input: &str) -> Result<(), BridgeError> {
    let line = Line::new(input, Path::new("<fuzz>"), 1);
    let _ = parse_point_line(&line, 0)?;
    Ok(())
}
