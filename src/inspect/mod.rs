//! Reconstruction inspection.
//!
//! Summarizes a parsed reconstruction (record counts, observation totals,
//! metadata buffer sizes and the extent of the point cloud) for the CLI.

mod report;

pub use report::{
    BoundsSection, InspectReport, MetadataSection, ReconstructionKind, SummarySection,
};

use crate::error::BridgeError;
use crate::ir::{DenseReconstruction, Position, SparseReconstruction};

/// Inspect a sparse bundle.
pub fn inspect_sparse(recon: &SparseReconstruction) -> InspectReport {
    InspectReport {
        kind: ReconstructionKind::Sparse,
        summary: SummarySection {
            cameras: recon.cameras.len(),
            points: recon.spoints.len(),
            observations: recon.measurement_count(),
            unseen_points: None,
        },
        metadata: MetadataSection {
            camera_bytes: Some(recon.length_meta_data_camera),
            point_bytes: recon.length_meta_data_spoints,
            path_column: Some(recon.length_max_file_path),
        },
        bounds: compute_bounds(recon.spoints.iter().map(|p| p.position)),
    }
}

/// Inspect a dense reconstruction.
///
/// Visibility lists are decoded from each point's metadata buffer, so a
/// buffer that does not follow the dense layout is reported as an error.
pub fn inspect_dense(recon: &DenseReconstruction) -> Result<InspectReport, BridgeError> {
    let mut observations = 0;
    let mut unseen_points = 0;

    for point in &recon.dpoints {
        let visibility = point.visibility()?;
        observations += visibility.seen.len();
        if visibility.seen.is_empty() {
            unseen_points += 1;
        }
    }

    Ok(InspectReport {
        kind: ReconstructionKind::Dense,
        summary: SummarySection {
            cameras: 0,
            points: recon.dpoints.len(),
            observations,
            unseen_points: Some(unseen_points),
        },
        metadata: MetadataSection {
            camera_bytes: None,
            point_bytes: recon.length_meta_data_dpoints,
            path_column: None,
        },
        bounds: compute_bounds(recon.dpoints.iter().map(|p| p.position)),
    })
}

/// Compute the bounding box over finite positions.
fn compute_bounds(positions: impl Iterator<Item = Position>) -> BoundsSection {
    let mut bounds = BoundsSection::default();

    for p in positions {
        bounds.total += 1;
        if !p.is_finite() {
            continue;
        }
        bounds.finite += 1;

        bounds.min = Some(match bounds.min {
            Some(m) => Position::new(m.x.min(p.x), m.y.min(p.y), m.z.min(p.z)),
            None => p,
        });
        bounds.max = Some(match bounds.max {
            Some(m) => Position::new(m.x.max(p.x), m.y.max(p.y), m.z.max(p.z)),
            None => p,
        });
    }

    bounds
}
