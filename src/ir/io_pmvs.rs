//! PMVS/CMVS dense patch reader.
//!
//! A dense PMVS reconstruction comes as two files describing the same points
//! in the same order: a `.patch` text file with geometry and per-camera
//! visibility, and an ASCII `.ply` file that adds the point colors. Both are
//! consumed in lockstep, one record from each per point.
//!
//! # Patch File Reference
//!
//! ```text
//! PATCHES
//! <npoint>
//! PATCHS                  marker, ignored
//! <x> <y> <z> [w]         position (extra tokens ignored)
//! <nx> <ny> <nz> [w]      normal (extra tokens ignored)
//! <ncc> [...]             photometric consistency score
//! <num_seen>
//! <i> <i> ...             cameras that saw the patch
//! <num_not_seen>
//! <i> <i> ...             cameras that should have seen it
//! <blank>
//! ```
//!
//! # PLY File Reference
//!
//! The first line must be `ply`, followed by exactly 12 header lines that are
//! not inspected. Each vertex line then carries at least nine tokens; tokens
//! 6, 7 and 8 are the color. Position and normal are taken from the patch
//! file instead.
//!
//! The score and visibility lists are packed into the point's
//! [`MetaData`](super::MetaData) as a [`DenseVisibility`].

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, info};

use super::geometry::{Color, Normal, Position};
use super::lines::LineSource;
use super::metadata::{DenseVisibility, MetaData};
use super::model::{DensePoint, DenseReconstruction};
use crate::error::BridgeError;
use crate::progress::{LogProgress, ProgressCadence, ProgressObserver};

/// First line of every patch file.
pub const PATCHES_MAGIC: &str = "PATCHES";

/// First line of the companion PLY file.
pub const PLY_MAGIC: &str = "ply";

/// Header lines after `ply` that precede the vertex list.
pub const PLY_HEADER_LINES: usize = 12;

const PLY_COLOR_OFFSET: usize = 6;

/// Reads a patch/PLY pair, logging progress through [`LogProgress`].
///
/// # Errors
/// Returns [`BridgeError::Format`] if either magic line is wrong,
/// [`BridgeError::Parse`] for a malformed or missing line (including a
/// visibility list whose length differs from its declared count), and
/// [`BridgeError::Io`] if a file cannot be read.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use reconbridge::ir::io_pmvs::read_pmvs;
///
/// let recon = read_pmvs(Path::new("option-0000.patch"), Path::new("option-0000.ply"))?;
/// println!("{} dense points", recon.dpoints.len());
/// # Ok::<(), reconbridge::BridgeError>(())
/// ```
pub fn read_pmvs(patch_path: &Path, ply_path: &Path) -> Result<DenseReconstruction, BridgeError> {
    read_pmvs_with_progress(patch_path, ply_path, &mut LogProgress::default())
}

/// Reads a patch/PLY pair, reporting progress to `observer`.
pub fn read_pmvs_with_progress<O: ProgressObserver + ?Sized>(
    patch_path: &Path,
    ply_path: &Path,
    observer: &mut O,
) -> Result<DenseReconstruction, BridgeError> {
    let patch = BufReader::new(File::open(patch_path).map_err(BridgeError::Io)?);
    let ply = BufReader::new(File::open(ply_path).map_err(BridgeError::Io)?);
    read_pmvs_from(patch, patch_path, ply, ply_path, observer)
}

/// Reads a patch stream and its PLY stream from buffered readers.
///
/// The paths only label errors and log messages.
pub fn read_pmvs_from<P, C, O>(
    patch: P,
    patch_path: &Path,
    ply: C,
    ply_path: &Path,
    observer: &mut O,
) -> Result<DenseReconstruction, BridgeError>
where
    P: BufRead,
    C: BufRead,
    O: ProgressObserver + ?Sized,
{
    let stream = DenseRecordStream::open(
        LineSource::new(patch, patch_path),
        LineSource::new(ply, ply_path),
    )?;
    let cadence = ProgressCadence::new(stream.total());
    debug!("{}: {} patch(es) declared", patch_path.display(), stream.total());

    let mut recon = DenseReconstruction::new();
    for (counter, record) in stream.enumerate() {
        if let Some(percent) = cadence.percent_at(counter) {
            observer.on_progress(percent);
        }
        recon.push_dpoint(record?);
    }

    info!(
        "Read {} dense point(s) from {} + {} (max metadata {} bytes)",
        recon.dpoints.len(),
        patch_path.display(),
        ply_path.display(),
        recon.length_meta_data_dpoints
    );

    Ok(recon)
}

/// Reads a patch/PLY pair from strings without reporting progress.
///
/// Useful for testing without file I/O.
pub fn from_pmvs_str(patch: &str, ply: &str) -> Result<DenseReconstruction, BridgeError> {
    read_pmvs_from(
        patch.as_bytes(),
        Path::new("<patch>"),
        ply.as_bytes(),
        Path::new("<ply>"),
        &mut crate::progress::NoProgress,
    )
}

/// Yields one [`DensePoint`] per declared patch, pulling the patch block and
/// the matching PLY vertex line together.
///
/// After the first error the stream is exhausted, so the two sources can
/// never drift apart.
struct DenseRecordStream<P, C> {
    patches: LineSource<P>,
    colors: LineSource<C>,
    counter: usize,
    total: usize,
}

impl<P: BufRead, C: BufRead> DenseRecordStream<P, C> {
    /// Validates both headers and reads the declared patch count.
    fn open(mut patches: LineSource<P>, mut colors: LineSource<C>) -> Result<Self, BridgeError> {
        patches.expect_magic(PATCHES_MAGIC)?;
        colors.expect_magic(PLY_MAGIC)?;
        colors.skip(PLY_HEADER_LINES, "PLY header line")?;
        let total = patches.next_count("patch count")?;

        Ok(Self {
            patches,
            colors,
            counter: 0,
            total,
        })
    }

    fn total(&self) -> usize {
        self.total
    }

    fn read_record(&mut self) -> Result<DensePoint, BridgeError> {
        let patch = read_patch(&mut self.patches)?;

        let line = self.colors.next_line("PLY vertex line")?;
        let index = line.record_index(self.counter)?;
        let tokens = line.leading_tokens(PLY_COLOR_OFFSET + 3, "PLY vertex")?;
        let [r, g, b] = line.parse_f64s(&tokens[PLY_COLOR_OFFSET..], ["red", "green", "blue"])?;

        Ok(DensePoint::new(
            index,
            patch.position,
            Color::new(r, g, b),
            MetaData::from(&patch.visibility),
            patch.normal,
        ))
    }
}

impl<P: BufRead, C: BufRead> Iterator for DenseRecordStream<P, C> {
    type Item = Result<DensePoint, BridgeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.counter >= self.total {
            return None;
        }

        let record = self.read_record();
        self.counter = if record.is_ok() {
            self.counter + 1
        } else {
            self.total
        };
        Some(record)
    }
}

/// The patch-file half of one dense record.
#[derive(Debug)]
struct PatchRecord {
    position: Position,
    normal: Normal,
    visibility: DenseVisibility,
}

fn read_patch<R: BufRead>(source: &mut LineSource<R>) -> Result<PatchRecord, BridgeError> {
    source.skip(1, "PATCHS marker")?;

    let position = {
        let line = source.next_line("patch position")?;
        let tokens = line.leading_tokens(3, "patch position")?;
        let [x, y, z] = line.parse_f64s(&tokens, ["x", "y", "z"])?;
        Position::new(x, y, z)
    };

    let normal = {
        let line = source.next_line("patch normal")?;
        let tokens = line.leading_tokens(3, "patch normal")?;
        let [x, y, z] = line.parse_f64s(&tokens, ["nx", "ny", "nz"])?;
        Normal::new(x, y, z)
    };

    let ncc = {
        let line = source.next_line("photometric consistency")?;
        let tokens = line.leading_tokens(1, "photometric consistency")?;
        let [ncc] = line.parse_f64s(&tokens, ["ncc"])?;
        ncc as f32
    };

    let seen = read_index_list(source, "num_seen", "seen camera index")?;
    let not_seen = read_index_list(source, "num_not_seen", "not-seen camera index")?;

    source.skip_trailing()?;

    Ok(PatchRecord {
        position,
        normal,
        visibility: DenseVisibility::new(ncc, seen, not_seen),
    })
}

/// Reads a count line followed by a line with exactly that many indices.
fn read_index_list<R: BufRead>(
    source: &mut LineSource<R>,
    count_field: &str,
    index_field: &str,
) -> Result<Vec<i32>, BridgeError> {
    let declared = source.next_count(count_field)?;

    let line = source.next_line(index_field)?;
    let indices = line.parse_all_i32(index_field)?;
    if indices.len() != declared {
        return Err(line.error(format!(
            "{count_field} declares {declared} index(es), found {}",
            indices.len()
        )));
    }
    Ok(indices)
}

/// Fuzz-only entrypoint: the input is split at the first NUL byte into the
/// patch text and the PLY text.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_pmvs(input: &str) -> Result<(), BridgeError> {
    let (patch, ply) = input.split_once('\0').unwrap_or((input, ""));
    let _ = from_pmvs_str(patch, ply)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLY_HEADER: &str = "ply
format ascii 1.0
element vertex 2
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

    const PATCH: &str = "PATCHES
2
PATCHS
1.0 2.0 3.0 1
0.0 0.0 1.0 0
0.875 0.1 0.2
2
3 7
0


PATCHS
-1 -2 -3 1
0 1 0 0
0.5
1
4
2
0 9

";

    fn ply_body() -> String {
        format!(
            "{PLY_HEADER}1.0 2.0 3.0 0 0 1 255 128 0\n-1 -2 -3 0 1 0 10 20 30\n"
        )
    }

    #[test]
    fn reads_points_with_colors_from_ply() {
        let recon = from_pmvs_str(PATCH, &ply_body()).expect("parse pmvs");

        assert_eq!(recon.dpoints.len(), 2);
        let first = &recon.dpoints[0];
        assert_eq!(first.index.as_i32(), 0);
        assert_eq!(first.position, Position::new(1.0, 2.0, 3.0));
        assert_eq!(first.normal, Normal::new(0.0, 0.0, 1.0));
        assert_eq!(first.color, Color::new(255.0, 128.0, 0.0));
        assert_eq!(recon.dpoints[1].index.as_i32(), 1);
        assert_eq!(recon.dpoints[1].color, Color::new(10.0, 20.0, 30.0));
    }

    #[test]
    fn visibility_scenario_with_empty_not_seen_list() {
        let recon = from_pmvs_str(PATCH, &ply_body()).expect("parse pmvs");
        let vis = recon.dpoints[0].visibility().expect("unpack");

        assert_eq!(vis.ncc, 0.875);
        assert_eq!(vis.seen, vec![3, 7]);
        assert!(vis.not_seen.is_empty());
        assert_eq!(recon.dpoints[0].meta_data.len(), 12 + 4 * 2);
    }

    #[test]
    fn tracks_longest_metadata() {
        let recon = from_pmvs_str(PATCH, &ply_body()).expect("parse pmvs");
        let vis = recon.dpoints[1].visibility().expect("unpack");

        assert_eq!(vis.seen, vec![4]);
        assert_eq!(vis.not_seen, vec![0, 9]);
        assert_eq!(recon.length_meta_data_dpoints, 24);
    }

    #[test]
    fn zero_points_is_empty_and_silent() {
        let mut calls = 0;
        let recon = read_pmvs_from(
            "PATCHES\n0\n".as_bytes(),
            Path::new("empty.patch"),
            PLY_HEADER.as_bytes(),
            Path::new("empty.ply"),
            &mut |_p: u32| calls += 1,
        )
        .expect("empty input is valid");

        assert!(recon.dpoints.is_empty());
        assert_eq!(recon.length_meta_data_dpoints, 0);
        assert_eq!(calls, 0);
    }

    #[test]
    fn progress_reports_each_record_for_small_inputs() {
        let mut percents = Vec::new();
        let ply = ply_body();
        read_pmvs_from(
            PATCH.as_bytes(),
            Path::new("a.patch"),
            ply.as_bytes(),
            Path::new("a.ply"),
            &mut |p: u32| percents.push(p),
        )
        .expect("parse pmvs");

        assert_eq!(percents, vec![0, 50]);
    }

    #[test]
    fn wrong_patch_magic_is_format_error() {
        let err = from_pmvs_str("PATCHES_V2\n0\n", PLY_HEADER).unwrap_err();
        match err {
            BridgeError::Format { path, expected, .. } => {
                assert_eq!(path, Path::new("<patch>"));
                assert_eq!(expected, "PATCHES");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn wrong_ply_magic_names_the_ply_stream() {
        let err = from_pmvs_str("PATCHES\n0\n", "PLY\n").unwrap_err();
        match err {
            BridgeError::Format { path, .. } => assert_eq!(path, Path::new("<ply>")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn short_ply_header_is_parse_error() {
        let err = from_pmvs_str("PATCHES\n0\n", "ply\nformat ascii 1.0\n").unwrap_err();
        assert!(matches!(err, BridgeError::Parse { .. }));
    }

    #[test]
    fn seen_count_mismatch_is_parse_error() {
        let patch = PATCH.replacen("2\n3 7\n", "3\n3 7\n", 1);
        match from_pmvs_str(&patch, &ply_body()).unwrap_err() {
            BridgeError::Parse { line, message, .. } => {
                assert_eq!(line, 8);
                assert!(message.contains("num_seen declares 3"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_ply_vertex_is_parse_error() {
        let ply = format!("{PLY_HEADER}1.0 2.0 3.0 0 0 1 255 128 0\n");
        let err = from_pmvs_str(PATCH, &ply).unwrap_err();
        assert!(matches!(err, BridgeError::Parse { line: 15, .. }));
    }

    #[test]
    fn short_ply_vertex_is_parse_error() {
        let ply = format!("{PLY_HEADER}1.0 2.0 3.0 0 0 1 255 128\n-1 -2 -3 0 1 0 10 20 30\n");
        let err = from_pmvs_str(PATCH, &ply).unwrap_err();
        assert!(err.to_string().contains("PLY vertex"));
    }

    #[test]
    fn final_blank_line_may_be_missing() {
        let patch = PATCH.trim_end_matches('\n').to_string() + "\n";
        let recon = from_pmvs_str(&patch, &ply_body()).expect("missing final blank line");
        assert_eq!(recon.dpoints.len(), 2);
    }

    #[test]
    fn stream_is_exhausted_after_error() {
        let ply = ply_body();
        let patch = PATCH.replacen("0.875 0.1 0.2", "bad", 1);
        let mut stream = DenseRecordStream::open(
            LineSource::new(patch.as_bytes(), Path::new("p")),
            LineSource::new(ply.as_bytes(), Path::new("c")),
        )
        .expect("headers are valid");

        assert!(matches!(stream.next(), Some(Err(BridgeError::Parse { .. }))));
        assert!(stream.next().is_none());
    }
}
