//! Inspect report types and terminal formatting.

use std::fmt;

use serde::Serialize;

use crate::ir::Position;

/// Which reader produced the inspected reconstruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconstructionKind {
    Sparse,
    Dense,
}

/// The result of inspecting a reconstruction.
#[derive(Clone, Debug, Serialize)]
pub struct InspectReport {
    pub kind: ReconstructionKind,
    /// Record counts.
    pub summary: SummarySection,
    /// Metadata buffer sizes.
    pub metadata: MetadataSection,
    /// Extent of the point positions.
    pub bounds: BoundsSection,
}

/// Record counts for the reconstruction.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SummarySection {
    /// Number of cameras (always 0 for dense input).
    pub cameras: usize,
    /// Number of sparse or dense points.
    pub points: usize,
    /// 2D measurements (sparse) or camera sightings (dense).
    pub observations: usize,
    /// Dense points whose visibility list is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unseen_points: Option<usize>,
}

/// Metadata buffer sizes, in bytes.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MetadataSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_bytes: Option<usize>,
    pub point_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_column: Option<usize>,
}

/// Axis-aligned extent of all finite point positions.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BoundsSection {
    pub total: usize,
    pub finite: usize,
    pub min: Option<Position>,
    pub max: Option<Position>,
}

const INNER_WIDTH: usize = 59;

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = match self.kind {
            ReconstructionKind::Sparse => "Sparse Bundle Inspection Report",
            ReconstructionKind::Dense => "Dense Patch Inspection Report",
        };

        writeln!(f)?;
        writeln!(f, "╭{}╮", "─".repeat(INNER_WIDTH))?;
        writeln!(f, "│{:^59}│", title)?;
        writeln!(f, "╰{}╯", "─".repeat(INNER_WIDTH))?;
        writeln!(f)?;

        self.fmt_summary(f)?;
        writeln!(f)?;
        self.fmt_metadata(f)?;
        writeln!(f)?;
        self.fmt_bounds(f)?;

        Ok(())
    }
}

impl InspectReport {
    fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;

        section_open(f, "Summary")?;
        if self.kind == ReconstructionKind::Sparse {
            row(f, "Cameras:", &format_number(s.cameras))?;
        }
        row(f, "Points:", &format_number(s.points))?;
        match self.kind {
            ReconstructionKind::Sparse => {
                row(f, "Measurements:", &format_number(s.observations))?;
                row(f, "Per point:", &fmt_ratio(s.observations, s.points))?;
            }
            ReconstructionKind::Dense => {
                row(f, "Camera sightings:", &format_number(s.observations))?;
                row(f, "Per point:", &fmt_ratio(s.observations, s.points))?;
                if let Some(unseen) = s.unseen_points {
                    row(f, "Unseen points:", &format_number(unseen))?;
                }
            }
        }
        section_close(f)
    }

    fn fmt_metadata(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.metadata;

        section_open(f, "Metadata")?;
        if let Some(bytes) = m.camera_bytes {
            row(f, "Camera buffer:", &format!("{bytes} bytes"))?;
        }
        row(f, "Point buffer (max):", &format!("{} bytes", m.point_bytes))?;
        if let Some(width) = m.path_column {
            row(f, "Path column:", &format!("{width} bytes"))?;
        }
        section_close(f)
    }

    fn fmt_bounds(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.bounds;

        section_open(f, "Bounds")?;
        match (b.min, b.max) {
            (Some(min), Some(max)) => {
                row(f, "Min:", &fmt_position(&min))?;
                row(f, "Max:", &fmt_position(&max))?;
            }
            _ => row(f, "Extent:", "no finite positions")?,
        }
        row(
            f,
            "Finite positions:",
            &format!(
                "{} / {} ({})",
                format_number(b.finite),
                format_number(b.total),
                fmt_percent(b.finite, b.total)
            ),
        )?;
        section_close(f)
    }
}

fn section_open(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    let dashes = (INNER_WIDTH - 3).saturating_sub(title.chars().count());
    writeln!(f, "┌─ {} {}┐", title, "─".repeat(dashes))?;
    writeln!(f, "│{}│", " ".repeat(INNER_WIDTH))
}

fn section_close(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "│{}│", " ".repeat(INNER_WIDTH))?;
    writeln!(f, "└{}┘", "─".repeat(INNER_WIDTH))
}

fn row(f: &mut fmt::Formatter<'_>, label: &str, value: &str) -> fmt::Result {
    writeln!(f, "│   {:<20}{:>33}   │", label, value)
}

/// Format a number with thousands separators.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a percentage, handling zero denominators.
fn fmt_percent(numerator: usize, denominator: usize) -> String {
    if denominator == 0 {
        "n/a".to_string()
    } else {
        format!("{:.1}%", (numerator as f64 / denominator as f64) * 100.0)
    }
}

fn fmt_ratio(numerator: usize, denominator: usize) -> String {
    if denominator == 0 {
        "n/a".to_string()
    } else {
        format!("{:.2}", numerator as f64 / denominator as f64)
    }
}

fn fmt_position(p: &Position) -> String {
    format!("({:.3}, {:.3}, {:.3})", p.x, p.y, p.z)
}
